//! PDF text extraction.
//!
//! NFSe PDFs are generated by the municipal portal and carry a text layer,
//! so plain text extraction is all the pipeline needs.

mod extractor;

pub use extractor::PdfExtractor;

use tracing::debug;

use crate::error::PdfError;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Trait for PDF processing implementations.
pub trait PdfProcessor {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Extract text from the entire PDF.
    fn extract_text(&self) -> Result<String>;
}

/// Load `data` and return its text, rejecting documents whose text layer
/// is shorter than `min_text_length` characters after trimming.
pub fn read_text(data: &[u8], min_text_length: usize) -> Result<String> {
    let mut extractor = PdfExtractor::new();
    extractor.load(data)?;
    let text = extractor.extract_text()?;
    debug!("Read text layer from {} pages", extractor.page_count());

    let length = text.trim().chars().count();
    if length < min_text_length {
        return Err(PdfError::TextExtraction(format!(
            "only {} characters of text found (minimum {}); the PDF may be scanned",
            length, min_text_length
        )));
    }

    Ok(text)
}
