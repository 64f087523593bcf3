//! Config command - manage configuration.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;

use nfse_core::models::config::NfseConfig;

use super::default_config_path;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Initialize a new configuration file
    Init(InitArgs),

    /// Get a specific configuration value
    Get {
        /// Configuration key (e.g., "issuer.cnpj")
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// New value
        value: String,
    },

    /// Show configuration file path
    Path,
}

#[derive(Args)]
struct InitArgs {
    /// Output path for configuration file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Overwrite existing file
    #[arg(long)]
    force: bool,
}

pub async fn run(args: ConfigArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config_path = config_path
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path);

    match args.command {
        ConfigCommand::Show => show_config(&config_path),
        ConfigCommand::Init(init_args) => init_config(init_args, &config_path),
        ConfigCommand::Get { key } => get_config(&config_path, &key),
        ConfigCommand::Set { key, value } => set_config(&config_path, &key, &value),
        ConfigCommand::Path => show_path(&config_path),
    }
}

fn load_or_default(config_path: &Path) -> anyhow::Result<NfseConfig> {
    if config_path.exists() {
        Ok(NfseConfig::from_file(config_path)?)
    } else {
        Ok(NfseConfig::default())
    }
}

fn show_config(config_path: &Path) -> anyhow::Result<()> {
    let config = if config_path.exists() {
        NfseConfig::from_file(config_path)?
    } else {
        println!(
            "{} No config file found, showing defaults.",
            style("ℹ").blue()
        );
        NfseConfig::default()
    };

    println!("{}", serde_json::to_string_pretty(&config)?);

    Ok(())
}

fn init_config(args: InitArgs, config_path: &Path) -> anyhow::Result<()> {
    let output_path = args.output.unwrap_or_else(|| config_path.to_path_buf());

    if output_path.exists() && !args.force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            output_path.display()
        );
    }

    // Create parent directory if needed
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let config = NfseConfig::default();
    config.save(&output_path)?;

    println!(
        "{} Created configuration file at {}",
        style("✓").green(),
        output_path.display()
    );

    Ok(())
}

/// JSON pointer for a dotted key such as `issuer.cnpj`.
fn pointer(key: &str) -> String {
    format!("/{}", key.replace('.', "/"))
}

fn get_config(config_path: &Path, key: &str) -> anyhow::Result<()> {
    let config = load_or_default(config_path)?;
    let json = serde_json::to_value(&config)?;

    let value = json
        .pointer(&pointer(key))
        .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))?;

    println!("{}", serde_json::to_string_pretty(value)?);

    Ok(())
}

fn set_config(config_path: &Path, key: &str, value: &str) -> anyhow::Result<()> {
    let config = load_or_default(config_path)?;
    let mut json = serde_json::to_value(&config)?;

    let slot = json
        .pointer_mut(&pointer(key))
        .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))?;
    if slot.is_object() {
        anyhow::bail!("{} is a section; set one of its fields instead", key);
    }

    // Issuer fields such as CNPJ and CEP are digit strings
    let parsed_value = if slot.is_string() {
        serde_json::Value::String(value.to_string())
    } else {
        serde_json::from_str(value)
            .map_err(|e| anyhow::anyhow!("Invalid value for {}: {}", key, e))?
    };
    *slot = parsed_value.clone();

    let config: NfseConfig = serde_json::from_value(json)?;
    config.issuer.validate()?;

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)?;
    }
    config.save(config_path)?;

    println!(
        "{} Set {} = {}",
        style("✓").green(),
        key,
        serde_json::to_string(&parsed_value)?
    );

    Ok(())
}

fn show_path(config_path: &Path) -> anyhow::Result<()> {
    println!("Configuration file: {}", config_path.display());

    if config_path.exists() {
        println!("Status: {}", style("exists").green());
    } else {
        println!("Status: {}", style("not created").yellow());
        println!();
        println!("Run 'nfse config init' to create a configuration file.");
    }

    Ok(())
}
