//! tcir - TCI score ingestion, reporting and pair comparison
//!
//! Reads a CSV of TCI scores and prints JSON on stdout. Logs go to
//! stderr or to the configured log file.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tcir_common::config::{ConfigResolver, LoggingConfig};
use tcir_engine::ingest::{ingest, IngestResult};
use tcir_engine::interpret::InterpretationCatalog;
use tcir_engine::profile::ScoreRecord;
use tcir_engine::report::{IndividualReport, PairReport};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Command-line arguments for tcir
#[derive(Parser, Debug)]
#[command(name = "tcir")]
#[command(about = "TCI score ingestion, reporting and pair comparison")]
#[command(version)]
struct Cli {
    /// Bootstrap config file (overrides TCIR_CONFIG and the platform file)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Interpretation catalog, JSON or TOML (overrides catalog_path)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a score table and print accepted records and row errors
    Ingest {
        csv: PathBuf,
    },
    /// Build individual reports
    Report {
        csv: PathBuf,
        /// Only report this subject (all subjects otherwise)
        #[arg(long)]
        subject: Option<String>,
    },
    /// Build a paired report for two subjects
    Compare {
        csv: PathBuf,
        #[arg(long)]
        first: String,
        #[arg(long)]
        second: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, source) = ConfigResolver::new(cli.config.clone()).load()?;
    init_tracing(&config.logging)?;

    info!("Starting tcir v{}", env!("CARGO_PKG_VERSION"));
    debug!(?source, "Configuration resolved");

    let pretty = cli.pretty || config.output.pretty;
    let catalog_path = cli.catalog.or(config.catalog_path);

    match cli.command {
        Command::Ingest { csv } => {
            let result = load_records(&csv).await?;
            emit(&result, pretty)
        }
        Command::Report { csv, subject } => {
            let catalog = load_catalog(catalog_path).await?;
            let result = load_records(&csv).await?;
            match subject {
                Some(name) => {
                    let record = find_record(&result, &name)?;
                    emit(&IndividualReport::build(record, &*catalog)?, pretty)
                }
                None => emit(&build_all_reports(result.valid_records, catalog).await?, pretty),
            }
        }
        Command::Compare { csv, first, second } => {
            let catalog = load_catalog(catalog_path).await?;
            let result = load_records(&csv).await?;
            let report = PairReport::build(
                find_record(&result, &first)?,
                find_record(&result, &second)?,
                &*catalog,
            )?;
            emit(&report, pretty)
        }
    }
}

/// Install the global subscriber; `RUST_LOG` overrides the configured level
fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    match &logging.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

/// Read and validate a CSV; structural problems abort, row problems are logged
async fn load_records(path: &Path) -> Result<IngestResult> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let result = ingest(&text).with_context(|| format!("Rejected {}", path.display()))?;

    info!(
        path = %path.display(),
        accepted = result.valid_records.len(),
        rejected = result.errors.len(),
        "Ingested score table"
    );
    Ok(result)
}

async fn load_catalog(path: Option<PathBuf>) -> Result<Arc<InterpretationCatalog>> {
    let Some(path) = path else {
        warn!("No interpretation catalog configured, narratives will be empty");
        return Ok(Arc::new(InterpretationCatalog::new()));
    };
    let catalog = tokio::task::spawn_blocking(move || InterpretationCatalog::from_path(&path))
        .await
        .context("Catalog loader task failed")??;
    Ok(Arc::new(catalog))
}

fn find_record<'a>(result: &'a IngestResult, name: &str) -> Result<&'a ScoreRecord> {
    result
        .record(name)
        .ok_or_else(|| anyhow!("Subject '{}' not found among accepted records", name))
}

/// Build every report concurrently; output keeps input order
async fn build_all_reports(
    records: Vec<ScoreRecord>,
    catalog: Arc<InterpretationCatalog>,
) -> Result<Vec<IndividualReport>> {
    let handles: Vec<_> = records
        .into_iter()
        .map(|record| {
            let catalog = Arc::clone(&catalog);
            tokio::task::spawn_blocking(move || IndividualReport::build(&record, &*catalog))
        })
        .collect();

    let mut reports = Vec::with_capacity(handles.len());
    for handle in handles {
        reports.push(handle.await.context("Report task failed")??);
    }
    Ok(reports)
}

fn emit<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", json);
    Ok(())
}
