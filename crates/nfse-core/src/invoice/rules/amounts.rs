//! Amount extraction for NFSe documents.

use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

use super::patterns::{
    COFINS_VALUE, CSLL_VALUE, INSS_VALUE, IRRF_VALUE, ISS_VALUE, PIS_VALUE, SERVICE_VALUE,
};
use super::{ExtractionMatch, FieldExtractor};

/// Monetary fields read from the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AmountField {
    ServiceValue,
    Pis,
    Cofins,
    Csll,
    Irrf,
    Inss,
    Iss,
}

impl AmountField {
    /// Every amount field, in document order.
    pub const ALL: [AmountField; 7] = [
        AmountField::ServiceValue,
        AmountField::Pis,
        AmountField::Cofins,
        AmountField::Csll,
        AmountField::Irrf,
        AmountField::Inss,
        AmountField::Iss,
    ];

    /// Name used when reporting the field (ABRASF element name).
    pub fn element_name(&self) -> &'static str {
        match self {
            AmountField::ServiceValue => "ValorServicos",
            AmountField::Pis => "ValorPis",
            AmountField::Cofins => "ValorCofins",
            AmountField::Csll => "ValorCsll",
            AmountField::Irrf => "ValorIr",
            AmountField::Inss => "ValorInss",
            AmountField::Iss => "ValorIss",
        }
    }

    /// Pattern locating the field; capture group 1 is the amount token.
    pub fn pattern(&self) -> &'static Regex {
        match self {
            AmountField::ServiceValue => &SERVICE_VALUE,
            AmountField::Pis => &PIS_VALUE,
            AmountField::Cofins => &COFINS_VALUE,
            AmountField::Csll => &CSLL_VALUE,
            AmountField::Irrf => &IRRF_VALUE,
            AmountField::Inss => &INSS_VALUE,
            AmountField::Iss => &ISS_VALUE,
        }
    }
}

/// Extractor for one labeled amount. Absent amounts are zero.
pub struct AmountExtractor {
    field: AmountField,
}

impl AmountExtractor {
    pub fn new(field: AmountField) -> Self {
        Self { field }
    }

    /// True when the label and an amount token were found, parseable or not.
    pub fn is_present(&self, text: &str) -> bool {
        self.field.pattern().is_match(text)
    }
}

impl FieldExtractor for AmountExtractor {
    type Output = ExtractionMatch<Decimal>;

    /// First labeled match only; an unparseable token yields `None`.
    fn extract(&self, text: &str) -> Option<Self::Output> {
        let caps = self.field.pattern().captures(text)?;
        let token = caps.get(1)?;
        let amount = parse_brl_amount(token.as_str())?;
        Some(ExtractionMatch::new(amount, token.as_str()).with_position(token.start(), token.end()))
    }
}

/// Extract one amount field from text.
pub fn extract_amount(field: AmountField, text: &str) -> Option<ExtractionMatch<Decimal>> {
    AmountExtractor::new(field).extract(text)
}

/// Parse a Brazilian-formatted amount (e.g. "1.234,56").
///
/// `.` is the thousands separator and `,` the decimal separator: dots are
/// stripped, then the comma becomes the decimal point. A trailing separator
/// (sentence punctuation picked up by the pattern) is ignored.
pub fn parse_brl_amount(s: &str) -> Option<Decimal> {
    let token = s.trim().trim_end_matches(['.', ',']);
    let normalized = token.replace('.', "").replace(',', ".");
    if normalized.is_empty() {
        return None;
    }
    Decimal::from_str(&normalized).ok()
}

/// Format an amount for the XML output: two decimals, `.` separator, no
/// grouping.
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.2}", rounded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_brl_amount() {
        assert_eq!(parse_brl_amount("1.234,56"), Some(dec("1234.56")));
        assert_eq!(parse_brl_amount("1234,56"), Some(dec("1234.56")));
        assert_eq!(parse_brl_amount("12.345.678,90"), Some(dec("12345678.90")));
        assert_eq!(parse_brl_amount("0,00"), Some(Decimal::ZERO));
        assert_eq!(parse_brl_amount("1.000"), Some(dec("1000")));
        assert_eq!(parse_brl_amount("150,00."), Some(dec("150.00")));
        assert_eq!(parse_brl_amount("1,2,3"), None);
        assert_eq!(parse_brl_amount(","), None);
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(dec("1234.56")), "1234.56");
        assert_eq!(format_amount(dec("1000")), "1000.00");
        assert_eq!(format_amount(dec("0.5")), "0.50");
        assert_eq!(format_amount(dec("2.345")), "2.35");
        assert_eq!(format_amount(Decimal::ZERO), "0.00");
    }

    #[test]
    fn test_format_is_idempotent_under_reparse() {
        for value in ["0.00", "0.01", "0.10", "19.90", "1234.56", "99999.99", "1000000.00"] {
            let formatted = format_amount(dec(value));
            assert_eq!(formatted, value);

            let reparsed: f64 = formatted.parse().unwrap();
            assert_eq!(format!("{:.2}", reparsed), formatted);
            assert_eq!(format_amount(dec(&formatted)), formatted);
        }
    }

    #[test]
    fn test_extract_service_value() {
        let text = "Valor dos Servicos R$: 1.234,56";
        let found = extract_amount(AmountField::ServiceValue, text).unwrap();
        assert_eq!(found.value, dec("1234.56"));
        assert_eq!(found.source, "1.234,56");
    }

    #[test]
    fn test_service_value_label_variants() {
        for text in [
            "Valor de Serviços R$ 10,00",
            "VALOR DOS SERVIÇOS R$\n10,00",
            "valor dos servicos R$: 10,00",
        ] {
            assert_eq!(
                extract_amount(AmountField::ServiceValue, text).map(|m| m.value),
                Some(dec("10.00")),
                "{text}"
            );
        }
    }

    #[test]
    fn test_tax_value_across_reflowed_columns() {
        let text = "PIS\nCOFINS\nCSLL\nR$ 1,10\nR$ 2,20\nR$ 3,30";
        // Each label pairs with the first amount after it.
        assert_eq!(extract_amount(AmountField::Pis, text).unwrap().value, dec("1.10"));
        assert_eq!(extract_amount(AmountField::Csll, text).unwrap().value, dec("1.10"));
    }

    #[test]
    fn test_missing_label_yields_none() {
        let text = "Valor dos Servicos R$ 100,00";
        assert!(extract_amount(AmountField::Irrf, text).is_none());
        assert!(!AmountExtractor::new(AmountField::Irrf).is_present(text));
    }

    #[test]
    fn test_unparseable_token_is_present_but_not_extracted() {
        let text = "PIS R$ 1,2,3";
        let extractor = AmountExtractor::new(AmountField::Pis);
        assert!(extractor.is_present(text));
        assert!(extractor.extract(text).is_none());
    }

    #[test]
    fn test_first_amount_wins() {
        let extractor = AmountExtractor::new(AmountField::Inss);
        let text = "INSS R$ 1,00\nINSS R$ 2,00";
        assert_eq!(extractor.extract(text).unwrap().source, "1,00");
    }

    #[test]
    fn test_element_names_are_unique() {
        let mut names: Vec<_> = AmountField::ALL.iter().map(|f| f.element_name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), AmountField::ALL.len());
    }
}
