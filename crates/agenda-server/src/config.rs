use std::path::PathBuf;

use serde::Deserialize;

/// Runtime server configuration, layered from `config.toml` and `AGENDA_*`
/// environment variables.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                  String,
  #[serde(default = "default_port")]
  pub port:                  u16,
  #[serde(default = "default_store_path")]
  pub store_path:            PathBuf,
  /// Seconds between background refreshes. `0` disables the loop.
  #[serde(default = "default_refresh_interval")]
  pub refresh_interval_secs: u64,
  /// JSON fixture loaded into the store at startup.
  #[serde(default)]
  pub seed_path:             Option<PathBuf>,
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 8080 }
fn default_store_path() -> PathBuf { PathBuf::from("agenda.db") }
fn default_refresh_interval() -> u64 { 60 }

impl ServerConfig {
  /// Read `file`, then let `AGENDA_*` environment variables override it.
  pub fn load<F>(file: F) -> Result<Self, config::ConfigError>
  where
    F: config::Source + Send + Sync + 'static,
  {
    config::Config::builder()
      .add_source(file)
      .add_source(config::Environment::with_prefix("AGENDA"))
      .build()?
      .try_deserialize()
  }
}
