//! Raw rows as handed over by the three collaborator stores.
//!
//! Field names follow the collaborators' column and join names so rows
//! deserialise straight from their JSON payloads. Date-like columns stay as
//! strings here: they are parsed during status derivation, so one malformed
//! value only affects its own record.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::{Error, Result};

// ─── Kind ────────────────────────────────────────────────────────────────────

/// The source an [`Activity`](crate::activity::Activity) was built from.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  AsRefStr,
  EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ActivityKind {
  Task,
  Shooting,
  Meeting,
}

impl ActivityKind {
  /// Parse a lowercase kind name (`"task"`, `"shooting"`, `"meeting"`).
  pub fn parse(s: &str) -> Result<Self> {
    Self::from_str(s.trim()).map_err(|_| Error::UnknownKind(s.to_owned()))
  }
}

// ─── Joins ───────────────────────────────────────────────────────────────────

/// A client reached through the `projects.clients` join.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientJoin {
  pub id:   String,
  pub name: Option<String>,
}

/// The `projects` join, optionally carrying its client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectJoin {
  pub id:      String,
  pub title:   Option<String>,
  pub clients: Option<ClientJoin>,
}

/// One row of a many-to-many user join table (`task_assignees`,
/// `shooting_crew`, `meeting_participants`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserLink {
  pub user_id: Option<String>,
}

impl UserLink {
  pub fn new(user_id: impl Into<String>) -> Self {
    Self {
      user_id: Some(user_id.into()),
    }
  }
}

// ─── Rows ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRow {
  pub id:             String,
  #[serde(default)]
  pub title:          String,
  #[serde(default)]
  pub status:         String,
  pub deadline:       Option<String>,
  pub priority:       Option<String>,
  pub description:    Option<String>,
  pub project_id:     Option<String>,
  pub created_by:     Option<String>,
  /// The primary assignee; additional ones live in `task_assignees`.
  pub assigned_to:    Option<String>,
  #[serde(default)]
  pub task_assignees: Vec<UserLink>,
  pub projects:       Option<ProjectJoin>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShootingRow {
  pub id:             String,
  #[serde(default)]
  pub title:          String,
  #[serde(default)]
  pub status:         String,
  /// Calendar date, `YYYY-MM-DD`.
  pub scheduled_date: Option<String>,
  /// Time of day, `HH:MM:SS`; absent means "some time that day".
  pub scheduled_time: Option<String>,
  pub notes:          Option<String>,
  pub project_id:     Option<String>,
  pub requested_by:   Option<String>,
  pub director:       Option<String>,
  pub runner:         Option<String>,
  #[serde(default)]
  pub shooting_crew:  Vec<UserLink>,
  pub projects:       Option<ProjectJoin>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingRow {
  pub id:                   String,
  #[serde(default)]
  pub title:                String,
  #[serde(default)]
  pub status:               String,
  pub meeting_date:         Option<String>,
  pub notes:                Option<String>,
  pub project_id:           Option<String>,
  pub created_by:           Option<String>,
  #[serde(default)]
  pub meeting_participants: Vec<UserLink>,
  pub projects:             Option<ProjectJoin>,
}

// ─── SourceRecord ────────────────────────────────────────────────────────────

/// Exactly one raw row from exactly one collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "row", rename_all = "lowercase")]
pub enum SourceRecord {
  Task(TaskRow),
  Shooting(ShootingRow),
  Meeting(MeetingRow),
}

impl SourceRecord {
  pub fn kind(&self) -> ActivityKind {
    match self {
      Self::Task(_) => ActivityKind::Task,
      Self::Shooting(_) => ActivityKind::Shooting,
      Self::Meeting(_) => ActivityKind::Meeting,
    }
  }

  /// The collaborator's own row id.
  pub fn raw_id(&self) -> &str {
    match self {
      Self::Task(row) => &row.id,
      Self::Shooting(row) => &row.id,
      Self::Meeting(row) => &row.id,
    }
  }

  pub fn raw_status(&self) -> &str {
    match self {
      Self::Task(row) => &row.status,
      Self::Shooting(row) => &row.status,
      Self::Meeting(row) => &row.status,
    }
  }

  /// The id of the Activity built from this record.
  ///
  /// Task ids are used as-is; shooting and meeting ids are prefixed with
  /// their kind so ids from different tables can never collide.
  pub fn activity_id(&self) -> String {
    match self {
      Self::Task(row) => row.id.clone(),
      other => format!("{}-{}", other.kind(), other.raw_id()),
    }
  }
}

impl From<TaskRow> for SourceRecord {
  fn from(row: TaskRow) -> Self { Self::Task(row) }
}

impl From<ShootingRow> for SourceRecord {
  fn from(row: ShootingRow) -> Self { Self::Shooting(row) }
}

impl From<MeetingRow> for SourceRecord {
  fn from(row: MeetingRow) -> Self { Self::Meeting(row) }
}

/// Treat empty strings the same as SQL `NULL`.
pub(crate) fn present(value: Option<&str>) -> Option<&str> {
  value.filter(|v| !v.trim().is_empty())
}
