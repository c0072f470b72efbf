//! apptrack server binary.
//!
//! Reads `apptrack.toml` (or the path given with `--config`), layers
//! `APPTRACK_*` environment variables on top, opens the SQLite store, and
//! either serves the JSON API or recomputes every student's derived status.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use apptrack_core::store::ApplicationStore as _;
use apptrack_server::ServerConfig;
use apptrack_store_sqlite::SqliteStore;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Student application tracker")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "apptrack.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the JSON API over HTTP (default).
  Serve,
  /// Re-derive every student's highest status and intake, then exit.
  Recompute,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let server_cfg = ServerConfig::load(&cli.config)
    .with_context(|| format!("failed to load configuration from {:?}", cli.config))?;

  let store = SqliteStore::open(&server_cfg.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", server_cfg.store_path))?;

  match cli.command.unwrap_or(Command::Serve) {
    Command::Serve => serve(&server_cfg, store).await,
    Command::Recompute => recompute(&store).await,
  }
}

async fn serve(server_cfg: &ServerConfig, store: SqliteStore) -> anyhow::Result<()> {
  let app = apptrack_server::app(Arc::new(store));
  let address = server_cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

async fn recompute(store: &SqliteStore) -> anyhow::Result<()> {
  let report = store.recompute_all().await.context("recompute failed")?;
  for change in &report.changed {
    tracing::info!(
      student_id = %change.after.student_id,
      before = ?change.before.highest_status,
      after = ?change.after.highest_status,
      "repaired derived status"
    );
  }
  for failure in &report.failed {
    tracing::error!(
      student_id = %failure.student_id,
      error = %failure.error,
      "could not recompute derived status"
    );
  }
  tracing::info!(
    students = report.students,
    changed = report.changed.len(),
    failed = report.failed.len(),
    "recompute finished"
  );
  if !report.failed.is_empty() {
    anyhow::bail!("{} of {} students could not be recomputed", report.failed.len(), report.students);
  }
  Ok(())
}
