//! Issuance timestamp extraction.

use chrono::NaiveDateTime;
use tracing::debug;

use super::patterns::ISSUE_TIMESTAMP;
use super::{ExtractionMatch, FieldExtractor};

/// Layout of the date-time pair printed on the document.
pub const DOCUMENT_TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Extractor for `DD/MM/YYYY HH:MM:SS` pairs.
pub struct TimestampExtractor;

impl TimestampExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TimestampExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for TimestampExtractor {
    type Output = ExtractionMatch<NaiveDateTime>;

    /// First pair that is a real calendar date and time.
    fn extract(&self, text: &str) -> Option<Self::Output> {
        ISSUE_TIMESTAMP.captures_iter(text).find_map(|caps| {
            let full_match = caps.get(0)?;
            match parse_timestamp(&caps[1], &caps[2]) {
                Some(timestamp) => Some(
                    ExtractionMatch::new(timestamp, full_match.as_str())
                        .with_position(full_match.start(), full_match.end()),
                ),
                None => {
                    debug!("Skipping invalid date-time pair {:?}", full_match.as_str());
                    None
                }
            }
        })
    }
}

/// Combine a `DD/MM/YYYY` date and an `HH:MM:SS` time.
pub fn parse_timestamp(date: &str, time: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(&format!("{} {}", date, time), DOCUMENT_TIMESTAMP_FORMAT).ok()
}

/// Extract the issuance timestamp: the first valid date-time pair.
pub fn extract_issue_timestamp(text: &str) -> Option<ExtractionMatch<NaiveDateTime>> {
    TimestampExtractor::new().extract(text)
}
