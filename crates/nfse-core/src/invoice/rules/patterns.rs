//! Common regex patterns for NFSe text extraction.
//!
//! Labels are matched case-insensitively. Amount patterns allow an unbounded,
//! non-greedy span (newlines included) between the label and the value, so a
//! table reflowed by the text extractor still pairs each label with the first
//! `R$` amount that follows it.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Invoice number after the document type token (NFSe / NFS-e)
    pub static ref INVOICE_NUMBER: Regex = Regex::new(
        r"(?i)NFS-?e\s*(?:N[º°o]\.?\s*)?(\d+)"
    ).unwrap();

    // Verification code, with or without accents
    pub static ref VERIFICATION_CODE: Regex = Regex::new(
        r"(?i)c[oó]digo\s+de\s+verifica[cç][aã]o\s*:?\s*([A-Za-z0-9]+)"
    ).unwrap();

    // Issuance timestamp: DD/MM/YYYY HH:MM:SS
    pub static ref ISSUE_TIMESTAMP: Regex = Regex::new(
        r"(\d{2}/\d{2}/\d{4})\s*(\d{2}:\d{2}:\d{2})"
    ).unwrap();

    // Gross service value ("Valor dos Serviços R$", "Valor de Servicos R$")
    pub static ref SERVICE_VALUE: Regex = Regex::new(
        r"(?is)valor\s*(?:de|dos)\s*servi\S*os\s*R\$[:\s]*.*?([\d.,]+)"
    ).unwrap();

    // Withheld taxes
    pub static ref PIS_VALUE: Regex = Regex::new(
        r"(?is)\bPIS\b.*?R\$[:\s]*([\d.,]+)"
    ).unwrap();

    pub static ref COFINS_VALUE: Regex = Regex::new(
        r"(?is)\bCOFINS\b.*?R\$[:\s]*([\d.,]+)"
    ).unwrap();

    pub static ref CSLL_VALUE: Regex = Regex::new(
        r"(?is)\bCSLL\b.*?R\$[:\s]*([\d.,]+)"
    ).unwrap();

    pub static ref IRRF_VALUE: Regex = Regex::new(
        r"(?is)\bIRRF\b.*?R\$[:\s]*([\d.,]+)"
    ).unwrap();

    pub static ref INSS_VALUE: Regex = Regex::new(
        r"(?is)\bINSS\b.*?R\$[:\s]*([\d.,]+)"
    ).unwrap();

    // Anchored on "Valor ISS" so "ISS Retido" and similar labels are skipped
    pub static ref ISS_VALUE: Regex = Regex::new(
        r"(?is)valor\s+ISS\b.*?R\$[:\s]*([\d.,]+)"
    ).unwrap();
}
