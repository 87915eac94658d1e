//! agenda-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the SQLite
//! collaborator store, optionally seeds it from a JSON fixture, and serves
//! the activity API under `/api`. The board is refreshed at startup and then
//! every `refresh_interval_secs`.

mod config;

use std::{
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use agenda_api::SharedBoard;
use agenda_store_sqlite::{Fixture, SqliteStore};
use anyhow::Context as _;
use axum::Router;
use clap::Parser;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;

#[derive(Parser)]
#[command(author, version, about = "Agenda activity server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Seed the store from this fixture, overriding `seed_path`.
  #[arg(long)]
  seed: Option<PathBuf>,
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

  let server_cfg =
    ServerConfig::load(::config::File::from(cli.config).required(false))
      .context("failed to load configuration")?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  if let Some(seed) = cli.seed.or(server_cfg.seed_path.clone()) {
    let seed = expand_tilde(&seed);
    let fixture = Fixture::load(&seed)?;
    store
      .seed(fixture)
      .await
      .with_context(|| format!("failed to seed store from {seed:?}"))?;
  }

  let board = Arc::new(SharedBoard::new(Arc::new(store)));
  board.refresh().await;

  if server_cfg.refresh_interval_secs > 0 {
    let board = board.clone();
    let period = Duration::from_secs(server_cfg.refresh_interval_secs);
    tokio::spawn(async move {
      let mut ticker = tokio::time::interval(period);
      // The first tick completes immediately; startup already refreshed.
      ticker.tick().await;
      loop {
        ticker.tick().await;
        board.refresh().await;
      }
    });
  }

  let app = Router::new()
    .nest("/api", agenda_api::api_router(board))
    .layer(TraceLayer::new_for_http());
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
