//! JSON fixtures for seeding a store.
//!
//! A fixture uses the same row shapes the collaborators return, so an export
//! of live payloads can be loaded as-is:
//!
//! ```json
//! {
//!   "projects":  [{ "id": "p1", "title": "Launch", "clients": { "id": "c1", "name": "Acme" } }],
//!   "tasks":     [{ "id": "t1", "title": "Brief", "status": "pending", "deadline": "2024-01-01" }],
//!   "shootings": [],
//!   "meetings":  []
//! }
//! ```

use std::path::Path;

use agenda_core::record::{MeetingRow, ProjectJoin, ShootingRow, TaskRow};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Fixture {
  #[serde(default)]
  pub projects:  Vec<ProjectJoin>,
  #[serde(default)]
  pub tasks:     Vec<TaskRow>,
  #[serde(default)]
  pub shootings: Vec<ShootingRow>,
  #[serde(default)]
  pub meetings:  Vec<MeetingRow>,
}

impl Fixture {
  pub fn from_json(json: &str) -> Result<Self> { Ok(serde_json::from_str(json)?) }

  pub fn load(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|source| Error::Fixture {
      path: path.display().to_string(),
      source,
    })?;
    Self::from_json(&raw)
  }
}
