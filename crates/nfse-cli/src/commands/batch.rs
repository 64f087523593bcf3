//! Batch processing command for a directory of NFSe files.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::{glob, Pattern};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use nfse_core::invoice::rules::format_amount;
use nfse_core::models::config::NfseConfig;
use nfse_core::models::invoice::{FieldSource, InvoiceRecord};
use nfse_core::xml::{serialize, XmlDocument, XmlWriter};

use super::process::write_options;
use super::{convert_file, is_supported_input, load_config};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input directory or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory (per-file) or file/directory (with --consolidate)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write every invoice into one ListaNfse document
    #[arg(long)]
    consolidate: bool,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,

    /// Write XML on a single line
    #[arg(long)]
    compact: bool,
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    record: Option<InvoiceRecord>,
    output: Option<PathBuf>,
    error: Option<String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let (base_dir, files) = resolve_inputs(&args.input)?;

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    let per_file_dir = if args.consolidate {
        None
    } else {
        check_output_names(&files)?;
        let dir = args
            .output
            .clone()
            .unwrap_or_else(|| base_dir.join(&config.output.converted_dir_name));
        fs::create_dir_all(&dir)?;
        Some(dir)
    };

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let parser = config.parser();
    let writer = XmlWriter::new(write_options(&config, args.compact));
    let mut results = Vec::with_capacity(files.len());
    let mut documents = Vec::new();

    for path in files {
        let file_start = Instant::now();
        let converted = convert_file(&path, &parser, &config).and_then(|record| {
            let document = serialize(&record);
            let output = match &per_file_dir {
                Some(dir) => Some(write_per_file(&writer, &document, &path, dir)?),
                None => None,
            };
            Ok((record, document, output))
        });

        let processing_time_ms = file_start.elapsed().as_millis() as u64;

        match converted {
            Ok((record, document, output)) => {
                if args.consolidate {
                    documents.push(document);
                }
                results.push(ProcessResult {
                    path,
                    record: Some(record),
                    output,
                    error: None,
                    processing_time_ms,
                });
            }
            Err(e) => {
                let error_msg = e.to_string();
                if args.continue_on_error {
                    warn!("Failed to process {}: {}", path.display(), error_msg);
                    results.push(ProcessResult {
                        path,
                        record: None,
                        output: None,
                        error: Some(error_msg),
                        processing_time_ms,
                    });
                } else {
                    overall_pb.abandon();
                    error!("Failed to process {}: {}", path.display(), error_msg);
                    anyhow::bail!("Processing failed for {}: {}", path.display(), error_msg);
                }
            }
        }

        overall_pb.inc(1);
    }

    overall_pb.finish_and_clear();

    let summary_dir = match &per_file_dir {
        Some(dir) => dir.clone(),
        None if documents.is_empty() => {
            anyhow::bail!("No invoices were converted; nothing to consolidate");
        }
        None => {
            let target = resolve_consolidated_path(args.output.as_deref(), &base_dir, &config)?;
            let consolidated = XmlDocument::consolidate(&documents)?;
            writer.write_to(fs::File::create(&target)?, &consolidated)?;
            println!(
                "{} Consolidated {} invoices into {}",
                style("✓").green(),
                documents.len(),
                target.display()
            );
            target
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."))
        }
    };

    if args.summary {
        let summary_path = summary_dir.join("summary.csv");
        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let successful: Vec<_> = results.iter().filter(|r| r.record.is_some()).collect();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(successful.len()).green(),
        style(failed.len()).red()
    );

    for result in &successful {
        if let Some(output) = &result.output {
            debug!("{} -> {}", result.path.display(), output.display());
        }
    }

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

/// Expand the input into a sorted file list and the directory outputs are
/// placed relative to.
fn resolve_inputs(input: &str) -> anyhow::Result<(PathBuf, Vec<PathBuf>)> {
    let input_path = Path::new(input);
    let (base_dir, pattern) = if input_path.is_dir() {
        let escaped = Pattern::escape(&input_path.to_string_lossy());
        (input_path.to_path_buf(), format!("{}/*", escaped))
    } else {
        let base = input_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        (base, input.to_string())
    };

    let mut files: Vec<PathBuf> = glob(&pattern)?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file() && is_supported_input(p))
        .collect();
    files.sort();

    if files.is_empty() {
        anyhow::bail!("No PDF or text files found for: {}", input);
    }

    // A glob's parent may itself contain wildcards; use the first match instead
    let base_dir = if base_dir.exists() {
        base_dir
    } else {
        files[0]
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    };

    Ok((base_dir, files))
}

/// Output file name for one input in per-file mode.
fn output_file_name(input: &Path) -> String {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("nfse");
    format!("{}.xml", stem)
}

/// Fail when two inputs would be written to the same output file, such as
/// `a.pdf` and `a.txt`. Names are compared ignoring case so the check also
/// holds on case-insensitive filesystems.
fn check_output_names(files: &[PathBuf]) -> anyhow::Result<()> {
    let mut by_name: BTreeMap<String, Vec<&Path>> = BTreeMap::new();
    for path in files {
        by_name
            .entry(output_file_name(path).to_lowercase())
            .or_default()
            .push(path);
    }

    let clashes: Vec<String> = by_name
        .values()
        .filter(|paths| paths.len() > 1)
        .map(|paths| {
            paths
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        })
        .collect();

    if !clashes.is_empty() {
        anyhow::bail!(
            "Inputs share an output file name: {}. Rename them or use --consolidate",
            clashes.join("; ")
        );
    }

    Ok(())
}

fn write_per_file(
    writer: &XmlWriter,
    document: &XmlDocument,
    input: &Path,
    dir: &Path,
) -> anyhow::Result<PathBuf> {
    let output_path = dir.join(output_file_name(input));

    writer.write_to(fs::File::create(&output_path)?, document)?;
    debug!("Wrote output to {}", output_path.display());

    Ok(output_path)
}

/// An existing directory receives the configured consolidated file name;
/// anything else is taken as the file path itself.
fn resolve_consolidated_path(
    output: Option<&Path>,
    base_dir: &Path,
    config: &NfseConfig,
) -> anyhow::Result<PathBuf> {
    let file_name = &config.output.consolidated_file_name;
    let target = match output {
        Some(path) if path.is_dir() => path.join(file_name),
        Some(path) => path.to_path_buf(),
        None => base_dir.join(file_name),
    };

    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    Ok(target)
}

fn write_summary(path: &Path, results: &[ProcessResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "number",
        "verification_code",
        "issued_at",
        "issued_at_source",
        "service_value",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");

        if let Some(record) = &result.record {
            let source = match record.issued_at_source {
                FieldSource::Document => "document",
                FieldSource::Fallback => "fallback",
            };
            wtr.write_record([
                filename,
                "success",
                &record.number,
                &record.verification_code,
                &record.issued_at_iso(),
                source,
                &format_amount(record.amounts.service_value),
                &result.processing_time_ms.to_string(),
                "",
            ])?;
        } else {
            wtr.write_record([
                filename,
                "error",
                "",
                "",
                "",
                "",
                "",
                &result.processing_time_ms.to_string(),
                result.error.as_deref().unwrap_or(""),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}
