//! Process command - convert a single NFSe file.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use nfse_core::invoice::rules::format_amount;
use nfse_core::models::config::NfseConfig;
use nfse_core::models::invoice::{FieldSource, InvoiceRecord};
use nfse_core::xml::{serialize, WriteOptions, XmlWriter};

use super::{convert_file, load_config};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (PDF or extracted .txt)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "xml")]
    format: OutputFormat,

    /// Write XML on a single line
    #[arg(long)]
    compact: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// ABRASF XML
    Xml,
    /// Extracted record as JSON
    Json,
    /// Plain text summary
    Text,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message("Extracting invoice data...");

    let parser = config.parser();
    let record = convert_file(&args.input, &parser, &config);
    pb.finish_and_clear();
    let record = record?;

    let output = format_record(&record, args.format, write_options(&config, args.compact))?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

pub(crate) fn write_options(config: &NfseConfig, compact: bool) -> WriteOptions {
    if compact {
        WriteOptions::compact()
    } else {
        config.write_options()
    }
}

fn format_record(
    record: &InvoiceRecord,
    format: OutputFormat,
    options: WriteOptions,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Xml => Ok(XmlWriter::new(options).to_string(&serialize(record))?),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(record)?),
        OutputFormat::Text => Ok(format_text(record)),
    }
}

fn format_text(record: &InvoiceRecord) -> String {
    let mut output = String::new();
    let amounts = &record.amounts;

    output.push_str(&format!("NFSe: {}\n", record.number));
    output.push_str(&format!("Verification code: {}\n", record.verification_code));
    output.push_str(&format!("Issued: {}", record.issued_at_iso()));
    if record.issued_at_source == FieldSource::Fallback {
        output.push_str(" (not found in document)");
    }
    output.push_str("\n\n");

    output.push_str("Issuer:\n");
    output.push_str(&format!("  {}\n", record.issuer.legal_name));
    output.push_str(&format!("  CNPJ: {}\n", record.issuer.cnpj));
    output.push('\n');

    output.push_str("Values:\n");
    output.push_str(&format!("  Services: {}\n", format_amount(amounts.service_value)));
    output.push_str(&format!("  PIS:      {}\n", format_amount(amounts.pis)));
    output.push_str(&format!("  COFINS:   {}\n", format_amount(amounts.cofins)));
    output.push_str(&format!("  CSLL:     {}\n", format_amount(amounts.csll)));
    output.push_str(&format!("  IRRF:     {}\n", format_amount(amounts.irrf)));
    output.push_str(&format!("  INSS:     {}\n", format_amount(amounts.inss)));
    output.push_str(&format!("  ISS:      {}\n", format_amount(amounts.iss)));

    if !record.metadata.missing_fields.is_empty() {
        output.push_str(&format!(
            "\nMissing fields: {}\n",
            record.metadata.missing_fields.join(", ")
        ));
    }

    output
}
