//! aqfetch - Measurand normalization for environmental sensor providers
//!
//! Resolves a source configuration by name and prints its measurand index,
//! normalizes batches of raw provider readings, or converts single values.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;

use aqfetch::normalize::{normalize_readings, RawReading};
use aqfetch::settings::Settings;
use aqfetch::source::{resolve_source_name, SourceConfig, SOURCE_ENV_VAR};
use aqfetch::units::{conversion_table, UnitConversion};

#[derive(Parser)]
#[command(name = "aqfetch")]
#[command(about = "Normalize provider measurands into canonical parameters and units")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Source to process (falls back to the SOURCE env var, then --event)
    #[arg(long)]
    source: Option<String>,

    /// Queue event JSON file whose first record body names the source
    #[arg(long)]
    event: Option<PathBuf>,

    /// Directory containing <source>.json files
    #[arg(long, env = "SOURCES_DIR")]
    sources_dir: Option<PathBuf>,

    /// Settings file (default: platform config dir)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Reject malformed or empty lookup entries
    #[arg(long)]
    strict: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the measurand index of the source as JSON
    Index,
    /// Normalize a JSON array of raw readings using the source's parameters
    Normalize {
        /// File containing [{"parameter": ..., "value": ...}, ...]
        readings: PathBuf,
    },
    /// Convert a single value from a provider unit
    Convert {
        /// Unit the value is reported in (e.g. ppb)
        unit: String,
        /// Value to convert
        #[arg(allow_hyphen_values = true)]
        value: f64,
    },
    /// List the provider units that are converted and their normalized units
    Units,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Commands::Convert { unit, value } => convert(unit, *value),
        Commands::Units => print_json(&conversion_table()),
        Commands::Index => {
            let source = load_source(&cli)?;
            print_json(&source.measurands())
        }
        Commands::Normalize { readings } => {
            let source = load_source(&cli)?;
            let content = std::fs::read_to_string(readings)
                .with_context(|| format!("Failed to read readings file {:?}", readings))?;
            let raw: Vec<RawReading> = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse readings file {:?}", readings))?;
            let batch = normalize_readings(&source.measurands(), &raw);
            print_json(&batch)
        }
    }
}

fn load_source(cli: &Cli) -> Result<SourceConfig> {
    let settings = match &cli.settings {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    }
    .with_overrides(cli.sources_dir.clone(), cli.strict);

    let event = match &cli.event {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read event file {:?}", path))?;
            let value: Value = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse event file {:?}", path))?;
            Some(value)
        }
        None => None,
    };

    let env_source = std::env::var(SOURCE_ENV_VAR).ok();
    let name = resolve_source_name(
        cli.source.as_deref(),
        env_source.as_deref(),
        event.as_ref(),
    )?;
    tracing::debug!("Processing source '{}'", name);

    let source = SourceConfig::load(&settings.sources_dir, &name, settings.validation_mode())?;
    Ok(source)
}

fn convert(unit: &str, value: f64) -> Result<()> {
    let conversion = UnitConversion::for_unit(unit);
    if conversion.is_identity() {
        tracing::debug!("No conversion for unit '{}', passing value through", unit);
    }
    print_json(&serde_json::json!({
        "unit": conversion.normalized_unit(unit),
        "value": conversion.apply(value),
    }))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", out);
    Ok(())
}
