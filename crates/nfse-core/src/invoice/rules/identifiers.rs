//! Invoice number and verification code extraction.
//!
//! Neither value is validated: both are free text printed on the document.

use regex::Regex;

use super::patterns::{INVOICE_NUMBER, VERIFICATION_CODE};
use super::{ExtractionMatch, FieldExtractor};

/// Text fields read from the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextField {
    InvoiceNumber,
    VerificationCode,
}

impl TextField {
    /// Every text field, in document order.
    pub const ALL: [TextField; 2] = [TextField::InvoiceNumber, TextField::VerificationCode];

    /// Name used when reporting the field (ABRASF element name).
    pub fn element_name(&self) -> &'static str {
        match self {
            TextField::InvoiceNumber => "Numero",
            TextField::VerificationCode => "CodigoVerificacao",
        }
    }

    /// Value substituted when the field is not found.
    pub fn default_value(&self) -> &'static str {
        match self {
            TextField::InvoiceNumber => "0",
            TextField::VerificationCode => "XXXXXX",
        }
    }

    /// Pattern locating the field; capture group 1 is the value.
    pub fn pattern(&self) -> &'static Regex {
        match self {
            TextField::InvoiceNumber => &INVOICE_NUMBER,
            TextField::VerificationCode => &VERIFICATION_CODE,
        }
    }
}

/// Extractor for one labeled text field.
pub struct TextExtractor {
    field: TextField,
}

impl TextExtractor {
    pub fn new(field: TextField) -> Self {
        Self { field }
    }
}

impl FieldExtractor for TextExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        let caps = self.field.pattern().captures(text)?;
        let value = caps.get(1)?;
        Some(
            ExtractionMatch::new(value.as_str().to_string(), &caps[0])
                .with_position(value.start(), value.end()),
        )
    }
}

/// Extract one text field from text.
pub fn extract_text_field(field: TextField, text: &str) -> Option<ExtractionMatch<String>> {
    TextExtractor::new(field).extract(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_extract_invoice_number() {
        let text = "PREFEITURA MUNICIPAL DE SANTOS\nNFSe 4521\nEmitida em 12/03/2024";
        let found = extract_text_field(TextField::InvoiceNumber, text).unwrap();
        assert_eq!(found.value, "4521");
        assert_eq!(found.source, "NFSe 4521");
    }

    #[test]
    fn test_first_invoice_number_wins() {
        let text = "NFSe 10\nSubstitui NFSe 9";
        assert_eq!(extract_text_field(TextField::InvoiceNumber, text).unwrap().value, "10");
    }

    #[test]
    fn test_extract_verification_code() {
        let text = "Número da Nota 4521  Código de Verificação AB12XZ";
        let found = extract_text_field(TextField::VerificationCode, text).unwrap();
        assert_eq!(found.value, "AB12XZ");
    }

    #[test]
    fn test_missing_fields() {
        let text = "documento sem identificação";
        assert!(extract_text_field(TextField::InvoiceNumber, text).is_none());
        assert!(extract_text_field(TextField::VerificationCode, text).is_none());
    }

    #[test]
    fn test_defaults() {
        assert_eq!(TextField::InvoiceNumber.default_value(), "0");
        assert_eq!(TextField::VerificationCode.default_value(), "XXXXXX");
    }
}
