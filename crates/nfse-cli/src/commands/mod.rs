//! Subcommands and the helpers they share.

pub mod batch;
pub mod config;
pub mod process;

use std::fs;
use std::path::{Path, PathBuf};

use console::style;
use tracing::{debug, info};

use nfse_core::invoice::{InvoiceParser, NfseParser};
use nfse_core::models::config::NfseConfig;
use nfse_core::models::invoice::InvoiceRecord;
use nfse_core::pdf;

/// Default configuration file location.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("nfse")
        .join("config.json")
}

/// Load the configuration from `path`, else from the default location if a
/// file exists there, else fall back to built-in defaults.
pub fn load_config(path: Option<&str>) -> anyhow::Result<NfseConfig> {
    if let Some(path) = path {
        return Ok(NfseConfig::from_file(Path::new(path))?);
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Using configuration at {}", default_path.display());
        Ok(NfseConfig::from_file(&default_path)?)
    } else {
        Ok(NfseConfig::default())
    }
}

/// True for the input kinds the converter accepts.
pub fn is_supported_input(path: &Path) -> bool {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    matches!(extension.as_str(), "pdf" | "txt")
}

/// Read the text of one input: the text layer of a PDF, or a `.txt` file
/// holding already-extracted text.
pub fn read_document_text(path: &Path, config: &NfseConfig) -> anyhow::Result<String> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "pdf" => {
            let data = fs::read(path)?;
            Ok(pdf::read_text(&data, config.pdf.min_text_length)?)
        }
        "txt" => Ok(fs::read_to_string(path)?),
        _ => anyhow::bail!("Unsupported file format: {}", extension),
    }
}

/// Read and parse one input into a record.
///
/// A record without an issuance timestamp fails when the configuration
/// requires one. Otherwise the record's warnings are printed to stderr.
pub fn convert_file(
    path: &Path,
    parser: &NfseParser,
    config: &NfseConfig,
) -> anyhow::Result<InvoiceRecord> {
    info!("Converting {}", path.display());

    let text = read_document_text(path, config)?;
    let record = parser.parse(&text);

    if !record.has_document_timestamp() && config.extraction.require_issue_date {
        anyhow::bail!("No issuance timestamp found in {}", path.display());
    }

    for warning in &record.metadata.warnings {
        eprintln!("{} {}: {}", style("⚠").yellow(), path.display(), warning);
    }

    Ok(record)
}
