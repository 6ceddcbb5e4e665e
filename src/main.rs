//! memsift — stage historical conversation logs and memory notes as pending
//! observations.
//!
//! Thin CLI glue: argument parsing, logging setup, and default path
//! resolution. All pipeline behavior lives in the library.

use std::path::PathBuf;

use clap::Parser;
use memsift::{
    BackfillConfig, BackfillError, SourceMode, SqliteObservationStore, run_backfill,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "memsift")]
#[command(version)]
#[command(about = "Backfill a memory/observation store from session logs and memory files")]
struct Cli {
    /// Preview what would be inserted without touching the store
    #[arg(long)]
    dry_run: bool,

    /// Only process memory files
    #[arg(long, conflicts_with = "sessions_only")]
    memory_only: bool,

    /// Only process session logs
    #[arg(long)]
    sessions_only: bool,

    /// Only process sessions modified in the last N days
    #[arg(long, value_name = "N")]
    recent_days: Option<u32>,

    /// Chunk size in characters
    #[arg(long, default_value_t = memsift::config::DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    /// Observation database path
    #[arg(long, env = "MEMSIFT_DB")]
    db: Option<PathBuf>,

    /// Memory-file root directory
    #[arg(long, env = "MEMSIFT_MEMORY_DIR")]
    memory_dir: Option<PathBuf>,

    /// Session-log directory
    #[arg(long, env = "MEMSIFT_SESSIONS_DIR")]
    sessions_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), BackfillError> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let home = dirs_next::home_dir()
        .ok_or_else(|| BackfillError::Config("cannot determine home directory".into()))?;
    let base = home.join(".memsift");
    let db = cli.db.unwrap_or_else(|| base.join("observations.db"));
    let memory_dir = cli.memory_dir.unwrap_or_else(|| base.join("memory"));
    let sessions_dir = cli.sessions_dir.unwrap_or_else(|| base.join("sessions"));

    let mode = if cli.memory_only {
        SourceMode::MemoryOnly
    } else if cli.sessions_only {
        SourceMode::SessionsOnly
    } else {
        SourceMode::All
    };

    let config = BackfillConfig::new()
        .chunk_size(cli.chunk_size)
        .recent_days(cli.recent_days)
        .mode(mode)
        .memory_dir(memory_dir)
        .sessions_dir(sessions_dir);

    info!(
        db = %db.display(),
        chunk_size = config.chunk_size,
        mode = ?config.mode,
        dry_run = cli.dry_run,
        "starting backfill"
    );

    let report = if cli.dry_run {
        run_backfill(&config, None).await?
    } else {
        let store = SqliteObservationStore::open(&db).await?;
        run_backfill(&config, Some(&store)).await?
    };

    info!(
        memory_chunks = report.memory_chunks,
        session_chunks = report.session_chunks,
        total_chars = report.total_chars,
        inserted = report.inserted,
        "done"
    );
    Ok(())
}
