//! The unified Activity: the computed read model over tasks, shootings and
//! meetings. Never stored; rebuilt from the source rows on every read.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::record::{ActivityKind, SourceRecord};

/// The project an activity belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRef {
  pub id:    String,
  /// `None` when the row names a project but the join came back empty.
  pub title: Option<String>,
}

/// The client behind an activity's project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRef {
  pub id:   String,
  pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
  /// Unique across all three kinds; see [`SourceRecord::activity_id`].
  pub id:           String,
  pub kind:         ActivityKind,
  pub title:        String,
  /// The raw status, or a derived terminal status.
  pub status:       String,
  pub scheduled_at: Option<DateTime<Utc>>,
  pub project:      Option<ProjectRef>,
  pub client:       Option<ClientRef>,
  /// Ordered, duplicate-free user ids.
  pub assignees:    Vec<String>,
  pub owner:        Option<String>,
  pub priority:     Option<String>,
  pub description:  Option<String>,
  /// Only ever `true` for tasks.
  pub is_overdue:   bool,
  pub source:       SourceRecord,
}

impl Activity {
  pub fn is_assigned_to(&self, user_id: &str) -> bool {
    self.assignees.iter().any(|a| a == user_id)
  }

  pub fn is_owned_by(&self, user_id: &str) -> bool {
    self.owner.as_deref() == Some(user_id)
  }
}
