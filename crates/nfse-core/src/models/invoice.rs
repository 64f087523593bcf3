//! NFSe data models mirroring the ABRASF document fields.

use std::sync::Arc;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{NfseError, Result};

/// Format of the derived `DataEmissao` value.
pub const ISO_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Format of the derived `Competencia` value.
pub const ACCOUNTING_PERIOD_FORMAT: &str = "%Y-%m-%d";

/// Identity and address of the service provider (prestador).
///
/// Built once from configuration and shared read-only, through an `Arc`,
/// by every record produced in a run. A serialized profile must name every
/// field except `complement`; a partial one does not deserialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuerProfile {
    /// CNPJ without punctuation.
    pub cnpj: String,

    /// Municipal registration (inscrição municipal).
    pub municipal_registration: String,

    /// Legal name (razão social).
    pub legal_name: String,

    /// Street (logradouro).
    pub street: String,

    /// Street number.
    pub number: String,

    /// Address complement.
    #[serde(default)]
    pub complement: String,

    /// District (bairro).
    pub district: String,

    /// IBGE municipality code.
    pub municipality_code: String,

    /// Two-letter state code (UF).
    pub state: String,

    /// Postal code (CEP) without punctuation.
    pub postal_code: String,

    /// Service list item used on every invoice from this issuer.
    pub service_item_code: String,
}

impl Default for IssuerProfile {
    fn default() -> Self {
        Self {
            cnpj: "58149782000105".to_string(),
            municipal_registration: "11447".to_string(),
            legal_name: "SERVIMEX LOGISTICA LTDA".to_string(),
            street: "R AUGUSTO SEVERO".to_string(),
            number: "7".to_string(),
            complement: "ANDAR 3 ANDAR 5 ANDAR 6A".to_string(),
            district: "CENTRO".to_string(),
            municipality_code: "3548500".to_string(),
            state: "SP".to_string(),
            postal_code: "11010919".to_string(),
            service_item_code: "0107".to_string(),
        }
    }
}

impl IssuerProfile {
    /// Check that every field the document needs is populated.
    ///
    /// `complement` may legitimately be empty.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("cnpj", &self.cnpj),
            ("municipal_registration", &self.municipal_registration),
            ("legal_name", &self.legal_name),
            ("street", &self.street),
            ("number", &self.number),
            ("district", &self.district),
            ("municipality_code", &self.municipality_code),
            ("state", &self.state),
            ("postal_code", &self.postal_code),
            ("service_item_code", &self.service_item_code),
        ];

        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(NfseError::Config(format!(
                    "issuer profile field `{}` is empty",
                    name
                )));
            }
        }

        Ok(())
    }

    /// Wrap the profile for sharing across a batch.
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

/// Service value and withheld taxes of one invoice.
///
/// A tax that does not appear on the document is zero: absence means
/// "not charged".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonetaryBreakdown {
    /// Gross service value.
    pub service_value: Decimal,
    pub pis: Decimal,
    pub cofins: Decimal,
    pub csll: Decimal,
    /// Withheld income tax.
    pub irrf: Decimal,
    pub inss: Decimal,
    pub iss: Decimal,
}

/// Fixed descriptive fields carried by every record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceDefaults {
    /// Service description (discriminação).
    pub description: String,

    /// Operation nature code.
    pub operation_nature: String,

    /// Simples Nacional opt-in flag (1 = yes, 2 = no).
    pub simples_nacional: String,

    /// Cultural incentive flag (1 = yes, 2 = no).
    pub cultural_incentive: String,

    /// RPS series.
    pub rps_series: String,

    /// RPS type.
    pub rps_type: String,
}

impl Default for ServiceDefaults {
    fn default() -> Self {
        Self {
            description: "Servicos conforme NFSe".to_string(),
            operation_nature: "1".to_string(),
            simples_nacional: "2".to_string(),
            cultural_incentive: "2".to_string(),
            rps_series: "U".to_string(),
            rps_type: "1".to_string(),
        }
    }
}

/// Where a record value came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldSource {
    /// Matched in the document text.
    #[default]
    Document,
    /// Not found; a default was substituted.
    Fallback,
}

/// Metadata about the extraction process.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionMetadata {
    /// ABRASF element names whose value was not found in the text.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_fields: Vec<String>,

    /// Warnings or issues encountered during extraction.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// One service invoice, ready for serialization.
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceRecord {
    /// Invoice number.
    pub number: String,

    /// Verification code printed on the document.
    pub verification_code: String,

    /// Issuance date and time.
    pub issued_at: NaiveDateTime,

    /// Whether `issued_at` was read from the document or substituted.
    pub issued_at_source: FieldSource,

    /// Service value and withheld taxes.
    pub amounts: MonetaryBreakdown,

    /// Shared issuer profile.
    pub issuer: Arc<IssuerProfile>,

    /// Fixed descriptive fields.
    pub service: ServiceDefaults,

    /// Extraction metadata.
    pub metadata: ExtractionMetadata,
}

impl InvoiceRecord {
    /// Accounting period (competência), `YYYY-MM-DD`.
    pub fn accounting_period(&self) -> String {
        self.issued_at.format(ACCOUNTING_PERIOD_FORMAT).to_string()
    }

    /// Issuance timestamp, `YYYY-MM-DDTHH:MM:SS`.
    pub fn issued_at_iso(&self) -> String {
        self.issued_at.format(ISO_TIMESTAMP_FORMAT).to_string()
    }

    /// True when the issuance timestamp was found in the document.
    pub fn has_document_timestamp(&self) -> bool {
        self.issued_at_source == FieldSource::Document
    }
}
