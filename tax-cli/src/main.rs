use std::fs::{self, File};
use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use malta_tax_core::{CalculationInput, RateRegistry, TaxEngine};
use malta_tax_data::RateTableLoader;
use serde_json::Value;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod args;
mod cli;
mod config;

use cli::{Cli, Command};
use config::CliConfig;

// ─── tracing ─────────────────────────────────────────────────────────────────

/// Initialise the tracing subscriber.
///
/// * Honours `RUST_LOG` when set, falling back to `info`.
/// * Writes to stderr so stdout carries only the JSON result.
/// * Strips timestamps and target names.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::from("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .without_time()
        .with_target(false)
        .init();
}

// ─── engine ──────────────────────────────────────────────────────────────────

fn build_engine(config: &CliConfig) -> Result<TaxEngine> {
    let mut registry = RateRegistry::malta()?;

    if let Some(path) = &config.rates.brackets {
        info!("loading rate tables from {}", path.display());
        let file =
            File::open(path).with_context(|| format!("Failed to open: {}", path.display()))?;
        registry = RateTableLoader::load(registry, file)
            .with_context(|| format!("Failed to load rate tables: {}", path.display()))?;
    }

    Ok(TaxEngine::new(registry, config.engine.clone())?)
}

fn read_request(path: &Path) -> Result<CalculationInput> {
    let text = if path == Path::new("-") {
        io::read_to_string(io::stdin()).context("Failed to read request from stdin")?
    } else {
        fs::read_to_string(path)
            .with_context(|| format!("Failed to read request: {}", path.display()))?
    };
    serde_json::from_str(&text).context("Invalid calculation request")
}

fn execute(
    engine: &TaxEngine,
    command: &Command,
    year: Option<i32>,
) -> Result<Value> {
    if let Some(input) = command.calculation_input(year) {
        return Ok(serde_json::to_value(engine.calculate(&input)?)?);
    }
    if let Some(input) = command.liability_input(year) {
        return Ok(serde_json::to_value(engine.calculate_tax_liability(&input)?)?);
    }

    let value = match command {
        Command::Rates {
            status: Some(status),
        } => serde_json::to_value(engine.get_rate_table(year, *status)?)?,
        Command::Rates { status: None } => serde_json::to_value(engine.get_tax_year_rates(year)?)?,
        Command::Years => serde_json::to_value(engine.tax_years())?,
        Command::Evaluate { file } => {
            let mut input = read_request(file)?;
            if let Some(year) = year {
                input = input.or_tax_year(year);
            }
            serde_json::to_value(engine.calculate(&input)?)?
        }
        other => anyhow::bail!("unhandled command {other:?}"),
    };
    Ok(value)
}

// ─── entry point ─────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => CliConfig::load(path)?,
        None => CliConfig::default(),
    }
    .with_brackets(cli.brackets.clone());
    debug!(?config, "configuration resolved");

    let engine = build_engine(&config)?;
    let output = execute(&engine, &cli.command, cli.year)?;

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
