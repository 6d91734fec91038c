//! job-inspector: command-line view over the file-backed job ledger.
//!
//! Lists jobs, prints a job's wire projection, and runs the retention purge.
//! Reference entities are read from `{data_dir}/references/`.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;

use sluice_core::Config;
use sluice_storage::{FileJobRepository, JobLedger, ReferenceCatalog};

// ── CLI ─────────────────────────────────────────────────────────────

/// Inspect ingestion jobs recorded on disk.
#[derive(Parser, Debug)]
#[command(name = "job-inspector", version, about)]
struct Cli {
    /// Override the data directory (defaults to DATA_DIR / "data").
    #[arg(long, env = "SLUICE_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List jobs with their status and sink.
    List {
        /// Only jobs that have not reached a terminal status.
        #[arg(long)]
        active: bool,
    },
    /// Print a job's wire projection as JSON.
    Show { id: String },
    /// Delete terminated jobs past the retention window.
    Purge {
        /// Retention in days (defaults to JOB_RETENTION_DAYS).
        #[arg(long)]
        retention_days: Option<u32>,
    },
}

// ── main ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    sluice_core::config::load_dotenv();
    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(dir) = cli.data_dir {
        config.storage.data_dir = dir;
    }
    config.log_summary();

    let catalog = ReferenceCatalog::load_dir(&config.storage.data_dir.join("references"))?;
    let repo = FileJobRepository::new(config.storage.jobs_dir())?;
    let ledger = JobLedger::new(repo, Arc::new(catalog), &config.ledger);

    match cli.command {
        Command::List { active } => {
            let jobs = if active {
                ledger.list_active().await?
            } else {
                ledger.list().await?
            };
            for job in jobs {
                let sink = job
                    .sink_name()
                    .map(str::to_string)
                    .unwrap_or_else(|e| format!("<{e}>"));
                let external = if job.external_id().is_empty() {
                    "-"
                } else {
                    job.external_id()
                };
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    job.id(),
                    job.status(),
                    job.runner(),
                    external,
                    sink
                );
            }
        }
        Command::Show { id } => {
            let msg = ledger.project(&id).await?;
            println!("{}", serde_json::to_string_pretty(&msg)?);
        }
        Command::Purge { retention_days } => {
            let days = retention_days.unwrap_or(config.storage.job_retention_days);
            let purged = ledger.purge_expired(days).await?;
            info!(count = purged.len(), retention_days = days, "purge finished");
            for id in purged {
                println!("{id}");
            }
        }
    }

    Ok(())
}
