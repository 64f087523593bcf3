//! Combines extracted fields with the issuer profile into an [`InvoiceRecord`].

use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use tracing::warn;

use crate::models::invoice::{
    ExtractionMetadata, FieldSource, InvoiceRecord, IssuerProfile, MonetaryBreakdown,
    ServiceDefaults,
};

use super::parser::ExtractedFields;
use super::rules::{AmountField, TextField};

/// Builds records for one issuer.
///
/// No I/O and no validation: the issuer profile is expected to be complete
/// (see [`IssuerProfile::validate`]).
#[derive(Debug, Clone)]
pub struct Assembler {
    issuer: Arc<IssuerProfile>,
    service: ServiceDefaults,
    fallback_time: Option<NaiveDateTime>,
}

impl Assembler {
    pub fn new(issuer: Arc<IssuerProfile>) -> Self {
        Self {
            issuer,
            service: ServiceDefaults::default(),
            fallback_time: None,
        }
    }

    pub fn with_service_defaults(mut self, service: ServiceDefaults) -> Self {
        self.service = service;
        self
    }

    /// Issuance time used for documents without one. Without it the wall
    /// clock at assembly time is used.
    pub fn with_fallback_time(mut self, fallback: NaiveDateTime) -> Self {
        self.fallback_time = Some(fallback);
        self
    }

    pub fn issuer(&self) -> &Arc<IssuerProfile> {
        &self.issuer
    }

    pub fn assemble(&self, raw: ExtractedFields) -> InvoiceRecord {
        let missing_fields = raw.missing_fields();

        let amounts = MonetaryBreakdown {
            service_value: raw.amount_or_zero(AmountField::ServiceValue),
            pis: raw.amount_or_zero(AmountField::Pis),
            cofins: raw.amount_or_zero(AmountField::Cofins),
            csll: raw.amount_or_zero(AmountField::Csll),
            irrf: raw.amount_or_zero(AmountField::Irrf),
            inss: raw.amount_or_zero(AmountField::Inss),
            iss: raw.amount_or_zero(AmountField::Iss),
        };

        let number = raw.text_or_default(TextField::InvoiceNumber);
        let verification_code = raw.text_or_default(TextField::VerificationCode);

        let mut warnings = raw.warnings;
        let (issued_at, issued_at_source) = match raw.issued_at {
            Some(found) => (found.value, FieldSource::Document),
            None => {
                let fallback = self
                    .fallback_time
                    .unwrap_or_else(|| Local::now().naive_local());
                warn!(
                    "No issuance timestamp found for NFSe {}, using {}",
                    number, fallback
                );
                warnings.push(format!("Issuance timestamp not found, using {}", fallback));
                (fallback, FieldSource::Fallback)
            }
        };

        InvoiceRecord {
            number,
            verification_code,
            issued_at,
            issued_at_source,
            amounts,
            issuer: Arc::clone(&self.issuer),
            service: self.service.clone(),
            metadata: ExtractionMetadata {
                missing_fields,
                warnings,
            },
        }
    }
}

/// Assemble a record with the default descriptive fields.
pub fn assemble(raw: ExtractedFields, issuer: &Arc<IssuerProfile>) -> InvoiceRecord {
    Assembler::new(Arc::clone(issuer)).assemble(raw)
}
