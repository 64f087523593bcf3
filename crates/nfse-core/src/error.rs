//! Error types for the nfse-core library.

use thiserror::Error;

/// Main error type for the nfse library.
///
/// Field extraction never produces one of these: a missing field resolves to
/// its documented default and is reported through the record's metadata.
#[derive(Error, Debug)]
pub enum NfseError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// XML document error.
    #[error("document error: {0}")]
    Document(#[from] DocumentError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be (de)serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,
}

/// Errors related to the ABRASF document tree.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// An element the document shape guarantees could not be located.
    #[error("invalid XML structure: {0} not found")]
    MissingElement(String),

    /// Rendering the tree to bytes failed.
    #[error("failed to write XML: {0}")]
    Write(String),
}

/// Result type for the nfse library.
pub type Result<T> = std::result::Result<T, NfseError>;
