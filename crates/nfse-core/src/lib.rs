//! Core library for converting NFSe text into ABRASF XML.
//!
//! This crate provides:
//! - NFSe field extraction (number, verification code, issuance timestamp,
//!   service value and withheld taxes)
//! - Record assembly against a shared issuer profile
//! - ABRASF `ListaNfse` document building and UTF-8 rendering
//! - PDF text extraction (feature `pdf`)

pub mod error;
pub mod invoice;
pub mod models;
#[cfg(feature = "pdf")]
pub mod pdf;
pub mod xml;

pub use error::{DocumentError, NfseError, PdfError, Result};
pub use invoice::{extract, extract_fields, Assembler, ExtractedFields, InvoiceParser, NfseParser};
pub use models::config::NfseConfig;
pub use models::invoice::{
    FieldSource, InvoiceRecord, IssuerProfile, MonetaryBreakdown, ServiceDefaults,
};
#[cfg(feature = "pdf")]
pub use pdf::{PdfExtractor, PdfProcessor};
pub use xml::{serialize, serialize_batch, WriteOptions, XmlDocument, XmlElement, XmlWriter};

/// Extract, serialize and render one document's text in a single call.
pub fn convert_text(text: &str, issuer: &std::sync::Arc<IssuerProfile>) -> Result<Vec<u8>> {
    let record = extract(text, issuer);
    Ok(XmlWriter::default().to_bytes(&serialize(&record))?)
}
