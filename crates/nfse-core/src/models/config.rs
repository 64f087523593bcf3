//! Configuration structures for the conversion pipeline.

use serde::{Deserialize, Serialize};

use super::invoice::{IssuerProfile, ServiceDefaults};
use crate::error::Result;
use crate::invoice::NfseParser;
use crate::xml::WriteOptions;

/// Main configuration for the nfse pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NfseConfig {
    /// Issuer profile applied to every converted invoice.
    pub issuer: IssuerProfile,

    /// Descriptive fields substituted on every record.
    pub service: ServiceDefaults,

    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// XML output configuration.
    pub output: OutputConfig,

    /// PDF processing configuration.
    pub pdf: PdfConfig,
}

/// Field extraction configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Fail a document whose issuance timestamp cannot be found instead of
    /// substituting the current time.
    pub require_issue_date: bool,
}

/// XML output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Indentation width in spaces (0 = compact, single line).
    pub indent: usize,

    /// Directory created next to the inputs for per-file output.
    pub converted_dir_name: String,

    /// File name used for consolidated output.
    pub consolidated_file_name: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            indent: 2,
            converted_dir_name: "PDF_Convertido".to_string(),
            consolidated_file_name: "nfse_comp_abrasf_CONSOLIDADO_vX.xml".to_string(),
        }
    }
}

/// PDF processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Minimum extracted text length to consider the PDF readable.
    pub min_text_length: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self { min_text_length: 20 }
    }
}

impl NfseConfig {
    /// Load configuration from a JSON file.
    ///
    /// The issuer profile is validated here, so an incomplete profile never
    /// reaches the assembler.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.issuer.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Parser carrying this configuration's issuer and service defaults.
    pub fn parser(&self) -> NfseParser {
        NfseParser::new(self.issuer.clone().shared()).with_service_defaults(self.service.clone())
    }

    pub fn write_options(&self) -> WriteOptions {
        WriteOptions {
            indent: self.output.indent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = NfseConfig::default();
        config.output.indent = 0;
        config.issuer.legal_name = "ACME SERVICOS LTDA".to_string();
        config.save(&path).unwrap();

        let loaded = NfseConfig::from_file(&path).unwrap();
        assert_eq!(loaded.output.indent, 0);
        assert_eq!(loaded.issuer.legal_name, "ACME SERVICOS LTDA");
        assert_eq!(loaded.service, ServiceDefaults::default());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "extraction": { "require_issue_date": true } }"#).unwrap();

        let loaded = NfseConfig::from_file(&path).unwrap();
        assert!(loaded.extraction.require_issue_date);
        assert_eq!(loaded.issuer, IssuerProfile::default());
        assert_eq!(loaded.output.converted_dir_name, "PDF_Convertido");
    }

    #[test]
    fn test_empty_issuer_field_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut config = NfseConfig::default();
        config.issuer.cnpj = String::new();
        config.save(&path).unwrap();

        let err = NfseConfig::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("cnpj"));
    }

    #[test]
    fn test_partial_issuer_section_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "issuer": { "legal_name": "X" } }"#).unwrap();

        assert!(NfseConfig::from_file(&path).is_err());
    }

    #[test]
    fn test_parser_uses_configured_issuer() {
        let mut config = NfseConfig::default();
        config.issuer.legal_name = "ACME SERVICOS LTDA".to_string();

        let parser = config.parser();
        assert_eq!(parser.assembler().issuer().legal_name, "ACME SERVICOS LTDA");
        assert_eq!(config.write_options().indent, 2);
    }
}
