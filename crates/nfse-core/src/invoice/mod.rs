//! NFSe field extraction and record assembly.

mod assembler;
mod parser;
pub mod rules;

pub use assembler::{assemble, Assembler};
pub use parser::{extract, extract_fields, ExtractedFields, InvoiceParser, NfseParser};
