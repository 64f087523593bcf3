//! Rule-based field extractors for NFSe text.
//!
//! Each rule is an independent pure function from text to an optional raw
//! value. [`TextField`] and [`AmountField`] pair every field with its pattern
//! and default, so the parser only walks `ALL` for each kind.

pub mod amounts;
pub mod dates;
pub mod identifiers;
pub mod patterns;

pub use amounts::{extract_amount, format_amount, parse_brl_amount, AmountExtractor, AmountField};
pub use dates::{extract_issue_timestamp, parse_timestamp, TimestampExtractor};
pub use identifiers::{extract_text_field, TextExtractor, TextField};
pub use patterns::*;

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the first occurrence of the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;
}

/// A value found in the source text.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Position in source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, source: impl Into<String>) -> Self {
        Self {
            value,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}
