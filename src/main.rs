use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use chainguard::db::Database;
use chainguard::{BatchReport, Config, RiskLevel, SignalEngine, ingest, output, score_batch};

#[derive(Parser)]
#[command(name = "chainguard")]
#[command(about = "Explainable risk scoring for blockchain transactions", long_about = None)]
struct Cli {
    /// CSV batch with tx_id, sender, receiver, amount, timestamp, wallet_age_days
    input: PathBuf,

    /// Config file path
    #[arg(short, long, default_value = "chainguard.toml")]
    config: PathBuf,

    /// Write the alert table here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value_t = Format::Csv)]
    format: Format,

    /// Only list transactions at this risk level
    #[arg(short, long, value_enum, default_value_t = LevelFilter::All)]
    level: LevelFilter,

    /// Store results in this SQLite archive (overrides archive.path)
    #[arg(long)]
    archive: Option<PathBuf>,

    /// Worker threads for rule evaluation (overrides engine.workers)
    #[arg(short, long)]
    workers: Option<usize>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Csv,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum LevelFilter {
    All,
    High,
    Medium,
    Low,
}

impl LevelFilter {
    fn level(self) -> Option<RiskLevel> {
        match self {
            LevelFilter::All => None,
            LevelFilter::High => Some(RiskLevel::High),
            LevelFilter::Medium => Some(RiskLevel::Medium),
            LevelFilter::Low => Some(RiskLevel::Low),
        }
    }
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr, stdout carries the alert table
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("chainguard=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config);
    tracing::debug!("Config: {:?}", config);

    let txs = ingest::load_transactions(&cli.input)
        .with_context(|| format!("Rejected batch {}", cli.input.display()))?;

    let engine = SignalEngine::from_config(&config.rules);
    let workers = cli.workers.unwrap_or(config.engine.workers);
    let results = score_batch(&engine, &txs, workers);

    let archive_path = cli
        .archive
        .clone()
        .or_else(|| config.archive.path.as_ref().map(PathBuf::from));
    if let Some(path) = archive_path {
        archive(&path, &cli.input, &txs, &results)?;
    }

    let rows = output::alert_rows(&txs, &results, cli.level.level());
    let writer: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        )),
        None => Box::new(io::stdout().lock()),
    };
    match cli.format {
        Format::Csv => output::write_csv(writer, &rows)?,
        Format::Json => output::write_json(writer, &rows)?,
    }

    eprint!("{}", BatchReport::from_results(&results));
    Ok(())
}

fn archive(
    path: &Path,
    input: &Path,
    txs: &[chainguard::Transaction],
    results: &[chainguard::ScoredTx],
) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create archive directory {}", parent.display()))?;
    }
    let db = Database::open(path)
        .with_context(|| format!("Failed to open archive {}", path.display()))?;
    let batch_id = db.store_batch(&input.display().to_string(), txs, results)?;
    tracing::info!("Archived batch {batch_id} to {}", path.display());
    Ok(())
}
