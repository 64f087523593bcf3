//! Rule-driven NFSe parser.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::models::invoice::{InvoiceRecord, IssuerProfile, ServiceDefaults};

use super::assembler::Assembler;
use super::rules::{
    dates::TimestampExtractor, AmountExtractor, AmountField, ExtractionMatch, FieldExtractor,
    TextExtractor, TextField,
};

/// Element name reported when the issuance timestamp is missing.
pub(crate) const ISSUE_TIMESTAMP_FIELD: &str = "DataEmissao";

/// Raw values found in one document, before defaults are applied.
///
/// Lives only between the extractor and the assembler.
#[derive(Debug, Clone, Default)]
pub struct ExtractedFields {
    pub invoice_number: Option<ExtractionMatch<String>>,
    pub verification_code: Option<ExtractionMatch<String>>,
    pub issued_at: Option<ExtractionMatch<NaiveDateTime>>,
    pub amounts: HashMap<AmountField, ExtractionMatch<Decimal>>,
    /// Problems noticed while matching (never fatal).
    pub warnings: Vec<String>,
}

impl ExtractedFields {
    /// The matched value of a text field, if any.
    pub fn text(&self, field: TextField) -> Option<&str> {
        let found = match field {
            TextField::InvoiceNumber => self.invoice_number.as_ref(),
            TextField::VerificationCode => self.verification_code.as_ref(),
        };
        found.map(|m| m.value.as_str())
    }

    /// The text field value, or its default when not found.
    pub fn text_or_default(&self, field: TextField) -> String {
        self.text(field).unwrap_or(field.default_value()).to_string()
    }

    /// The matched amount, if any.
    pub fn amount(&self, field: AmountField) -> Option<Decimal> {
        self.amounts.get(&field).map(|m| m.value)
    }

    /// The amount, or zero when not found.
    pub fn amount_or_zero(&self, field: AmountField) -> Decimal {
        self.amount(field).unwrap_or(Decimal::ZERO)
    }

    /// Fields whose absence suggests the text was not read correctly.
    ///
    /// Withheld taxes are left out: a tax line missing from the document
    /// means the tax was not charged.
    pub fn missing_fields(&self) -> Vec<String> {
        let mut missing = Vec::new();

        for field in TextField::ALL {
            if self.text(field).is_none() {
                missing.push(field.element_name().to_string());
            }
        }
        if self.issued_at.is_none() {
            missing.push(ISSUE_TIMESTAMP_FIELD.to_string());
        }
        if self.amount(AmountField::ServiceValue).is_none() {
            missing.push(AmountField::ServiceValue.element_name().to_string());
        }

        missing
    }
}

/// Run every extraction rule over the text.
pub fn extract_fields(text: &str) -> ExtractedFields {
    let start = Instant::now();
    let mut fields = ExtractedFields::default();

    for field in TextField::ALL {
        let found = TextExtractor::new(field).extract(text);
        if let Some(m) = &found {
            debug!("{} matched {:?}", field.element_name(), m.source);
        }
        match field {
            TextField::InvoiceNumber => fields.invoice_number = found,
            TextField::VerificationCode => fields.verification_code = found,
        }
    }

    fields.issued_at = TimestampExtractor::new().extract(text);

    for field in AmountField::ALL {
        let extractor = AmountExtractor::new(field);
        match extractor.extract(text) {
            Some(m) => {
                debug!("{} matched {:?}", field.element_name(), m.source);
                fields.amounts.insert(field, m);
            }
            None if extractor.is_present(text) => {
                warn!("Unreadable amount for {}, using zero", field.element_name());
                fields
                    .warnings
                    .push(format!("Unreadable amount for {}", field.element_name()));
            }
            None => {}
        }
    }

    debug!(
        "Ran extraction rules over {} characters in {:?}",
        text.len(),
        start.elapsed()
    );

    fields
}

/// Extract and assemble a record in one step.
pub fn extract(text: &str, issuer: &Arc<IssuerProfile>) -> InvoiceRecord {
    Assembler::new(Arc::clone(issuer)).assemble(extract_fields(text))
}

/// Trait for invoice parsing.
pub trait InvoiceParser {
    /// Parse one document's text into a record. Never fails: missing fields
    /// fall back to their defaults and are listed in the record metadata.
    fn parse(&self, text: &str) -> InvoiceRecord;
}

/// Parser bound to one issuer profile, reused across a batch.
#[derive(Debug, Clone)]
pub struct NfseParser {
    assembler: Assembler,
}

impl NfseParser {
    /// Create a parser for invoices issued by `issuer`.
    pub fn new(issuer: Arc<IssuerProfile>) -> Self {
        Self {
            assembler: Assembler::new(issuer),
        }
    }

    /// Override the fixed descriptive fields.
    pub fn with_service_defaults(mut self, service: ServiceDefaults) -> Self {
        self.assembler = self.assembler.with_service_defaults(service);
        self
    }

    /// Use a fixed issuance time when a document carries none.
    pub fn with_fallback_time(mut self, fallback: NaiveDateTime) -> Self {
        self.assembler = self.assembler.with_fallback_time(fallback);
        self
    }

    /// Run the extraction rules without assembling a record.
    pub fn extract_fields(&self, text: &str) -> ExtractedFields {
        extract_fields(text)
    }

    /// The assembler used by this parser.
    pub fn assembler(&self) -> &Assembler {
        &self.assembler
    }
}

impl InvoiceParser for NfseParser {
    fn parse(&self, text: &str) -> InvoiceRecord {
        info!("Parsing NFSe from {} characters of text", text.len());

        let record = self.assembler.assemble(extract_fields(text));

        debug!(
            "Extracted NFSe {} (missing: {:?})",
            record.number, record.metadata.missing_fields
        );

        record
    }
}
