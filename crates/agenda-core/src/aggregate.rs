//! The aggregator: three source collections in, one ordered Activity
//! sequence out, plus the index views built over it.
//!
//! The pipeline is split in two. [`stage`] flattens rows and resolves
//! assignees, neither of which depends on the clock. [`evaluate`] derives
//! status for a given `now`. [`aggregate`] runs both.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  activity::Activity,
  assignees,
  flatten::{self, Projection},
  record::{MeetingRow, ShootingRow, SourceRecord, TaskRow},
  status,
};

// ─── Source availability ─────────────────────────────────────────────────────

/// What is currently known about one collaborator's rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceState<T> {
  /// The fetch has not resolved yet.
  Pending,
  Ready(Vec<T>),
  /// The collaborator reported a failure; treated as "no rows".
  Failed(String),
}

impl<T> Default for SourceState<T> {
  fn default() -> Self { Self::Pending }
}

impl<T> SourceState<T> {
  /// The rows, or nothing if the source is pending or failed.
  pub fn rows(&self) -> &[T] {
    match self {
      Self::Ready(rows) => rows,
      Self::Pending | Self::Failed(_) => &[],
    }
  }

  pub fn is_pending(&self) -> bool { matches!(self, Self::Pending) }

  pub fn summary(&self) -> SourceStatus {
    match self {
      Self::Pending => SourceStatus::Pending,
      Self::Ready(rows) => SourceStatus::Ready { rows: rows.len() },
      Self::Failed(error) => SourceStatus::Failed {
        error: error.clone(),
      },
    }
  }
}

impl<T, E: std::fmt::Display> From<Result<Vec<T>, E>> for SourceState<T> {
  fn from(result: Result<Vec<T>, E>) -> Self {
    match result {
      Ok(rows) => Self::Ready(rows),
      Err(e) => Self::Failed(e.to_string()),
    }
  }
}

/// Serializable summary of a [`SourceState`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SourceStatus {
  Pending,
  Ready { rows: usize },
  Failed { error: String },
}

/// The three collaborator collections as currently cached.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceSet {
  pub tasks:     SourceState<TaskRow>,
  pub shootings: SourceState<ShootingRow>,
  pub meetings:  SourceState<MeetingRow>,
}

impl SourceSet {
  /// `true` while any of the three fetches is unresolved.
  pub fn is_loading(&self) -> bool {
    self.tasks.is_pending()
      || self.shootings.is_pending()
      || self.meetings.is_pending()
  }

  /// All rows in aggregation order: tasks, then shootings, then meetings.
  pub fn records(&self) -> impl Iterator<Item = SourceRecord> + '_ {
    let tasks = self.tasks.rows().iter().cloned().map(SourceRecord::from);
    let shootings =
      self.shootings.rows().iter().cloned().map(SourceRecord::from);
    let meetings = self.meetings.rows().iter().cloned().map(SourceRecord::from);
    tasks.chain(shootings).chain(meetings)
  }
}

// ─── Pipeline ────────────────────────────────────────────────────────────────

/// A record with everything that does not depend on the clock already
/// computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Staged {
  pub record:     SourceRecord,
  pub projection: Projection,
  pub assignees:  Vec<String>,
}

impl Staged {
  pub fn new(record: SourceRecord) -> Self {
    let projection = flatten::flatten(&record);
    let assignees = assignees::resolve(&record);
    Self {
      record,
      projection,
      assignees,
    }
  }

  pub fn evaluate(&self, now: DateTime<Utc>) -> Activity {
    let derived = status::derive(&self.record, &self.projection, now);
    let p = &self.projection;
    Activity {
      id:           self.record.activity_id(),
      kind:         self.record.kind(),
      title:        p.title.clone(),
      status:       derived.status,
      scheduled_at: p.scheduled_at,
      project:      p.project.clone(),
      client:       p.client.clone(),
      assignees:    self.assignees.clone(),
      owner:        p.owner.clone(),
      priority:     p.priority.clone(),
      description:  p.description.clone(),
      is_overdue:   derived.is_overdue,
      source:       self.record.clone(),
    }
  }
}

/// Flatten and resolve `records`, preserving their order.
pub fn stage(records: impl IntoIterator<Item = SourceRecord>) -> Vec<Staged> {
  records.into_iter().map(Staged::new).collect()
}

/// Derive statuses for already-staged records at `now`.
pub fn evaluate<'a>(
  staged: impl IntoIterator<Item = &'a Staged>,
  now: DateTime<Utc>,
) -> Vec<Activity> {
  staged.into_iter().map(|s| s.evaluate(now)).collect()
}

/// Build the full feed from `sources` as seen at `now`.
///
/// Pending and failed sources contribute no rows; they never fail the
/// aggregation.
pub fn aggregate(sources: &SourceSet, now: DateTime<Utc>) -> ActivityFeed {
  let staged = stage(sources.records());
  ActivityFeed {
    as_of:      now,
    loading:    sources.is_loading(),
    activities: evaluate(&staged, now),
  }
}

// ─── Feed and views ──────────────────────────────────────────────────────────

/// One evaluation of the Activity sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityFeed {
  /// The `now` that statuses were derived against.
  pub as_of:      DateTime<Utc>,
  /// `true` while any source is still pending.
  pub loading:    bool,
  pub activities: Vec<Activity>,
}

impl ActivityFeed {
  /// Activities the user is assigned to or owns.
  pub fn visible_to_user(&self, user_id: &str) -> Vec<&Activity> {
    self
      .activities
      .iter()
      .filter(|a| a.is_assigned_to(user_id) || a.is_owned_by(user_id))
      .collect()
  }

  /// Activities the user created (or requested, for shootings).
  pub fn created_by_user(&self, user_id: &str) -> Vec<&Activity> {
    self
      .activities
      .iter()
      .filter(|a| a.is_owned_by(user_id))
      .collect()
  }

  /// Overdue activities grouped by project id, each list in feed order.
  pub fn overdue_by_project(&self) -> BTreeMap<&str, Vec<&Activity>> {
    let mut by_project: BTreeMap<&str, Vec<&Activity>> = BTreeMap::new();
    for activity in self.activities.iter().filter(|a| a.is_overdue) {
      if let Some(project) = &activity.project {
        by_project.entry(project.id.as_str()).or_default().push(activity);
      }
    }
    by_project
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;
  use crate::record::{ActivityKind, ProjectJoin, UserLink};

  fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
  }

  fn overdue_task(id: &str, project: Option<&str>) -> TaskRow {
    TaskRow {
      id: id.into(),
      title: format!("Task {id}"),
      status: "pending".into(),
      deadline: Some("2024-01-01".into()),
      project_id: project.map(Into::into),
      created_by: Some("owner".into()),
      ..Default::default()
    }
  }

  fn sample_sources() -> SourceSet {
    SourceSet {
      tasks:     SourceState::Ready(vec![
        TaskRow {
          assigned_to: Some("alice".into()),
          ..overdue_task("t1", Some("p1"))
        },
        overdue_task("t2", Some("p1")),
        TaskRow {
          status: "done".into(),
          ..overdue_task("t3", Some("p2"))
        },
      ]),
      shootings: SourceState::Ready(vec![ShootingRow {
        id: "s1".into(),
        title: "Studio".into(),
        status: "approved".into(),
        scheduled_date: Some("2024-01-01".into()),
        requested_by: Some("bob".into()),
        director: Some("alice".into()),
        project_id: Some("p1".into()),
        ..Default::default()
      }]),
      meetings:  SourceState::Ready(vec![MeetingRow {
        id: "m1".into(),
        title: "Review".into(),
        status: "scheduled".into(),
        meeting_date: Some("2024-01-01".into()),
        created_by: Some("alice".into()),
        meeting_participants: vec![UserLink::new("carol")],
        projects: Some(ProjectJoin {
          id:      "p1".into(),
          title:   None,
          clients: None,
        }),
        ..Default::default()
      }]),
    }
  }

  fn ids<'a>(activities: impl IntoIterator<Item = &'a Activity>) -> Vec<&'a str> {
    activities.into_iter().map(|a| a.id.as_str()).collect()
  }

  #[test]
  fn sources_concatenate_in_fixed_order() {
    let feed = aggregate(&sample_sources(), now());
    assert_eq!(ids(&feed.activities), ["t1", "t2", "t3", "shooting-s1", "meeting-m1"]);
    assert_eq!(
      feed.activities.iter().map(|a| a.kind).collect::<Vec<_>>(),
      [
        ActivityKind::Task,
        ActivityKind::Task,
        ActivityKind::Task,
        ActivityKind::Shooting,
        ActivityKind::Meeting,
      ]
    );
    assert!(!feed.loading);
  }

  #[test]
  fn aggregation_is_idempotent() {
    let sources = sample_sources();
    assert_eq!(aggregate(&sources, now()), aggregate(&sources, now()));
  }

  #[test]
  fn overdue_grouped_by_project_in_fetch_order() {
    let feed = aggregate(&sample_sources(), now());
    let overdue = feed.overdue_by_project();

    assert_eq!(overdue.len(), 1);
    assert_eq!(ids(overdue["p1"].iter().copied()), ["t1", "t2"]);
  }

  #[test]
  fn overdue_without_project_is_left_out() {
    let sources = SourceSet {
      tasks: SourceState::Ready(vec![overdue_task("t1", None)]),
      ..Default::default()
    };
    let feed = aggregate(&sources, now());
    assert!(feed.activities[0].is_overdue);
    assert!(feed.overdue_by_project().is_empty());
  }

  #[test]
  fn only_tasks_are_ever_overdue() {
    let feed = aggregate(&sample_sources(), now());
    for activity in &feed.activities {
      if activity.is_overdue {
        assert_eq!(activity.kind, ActivityKind::Task);
      }
    }
    let shooting = &feed.activities[3];
    assert_eq!(shooting.status, "completed");
    let meeting = &feed.activities[4];
    assert_eq!(meeting.status, "no_update");
  }

  #[test]
  fn visible_to_user_covers_assignees_and_owner() {
    let feed = aggregate(&sample_sources(), now());
    assert_eq!(ids(feed.visible_to_user("alice")), ["t1", "shooting-s1", "meeting-m1"]);
    assert_eq!(ids(feed.visible_to_user("carol")), ["meeting-m1"]);
    assert!(feed.visible_to_user("nobody").is_empty());
  }

  #[test]
  fn created_by_user_uses_owner_only() {
    let feed = aggregate(&sample_sources(), now());
    assert_eq!(ids(feed.created_by_user("owner")), ["t1", "t2", "t3"]);
    assert_eq!(ids(feed.created_by_user("bob")), ["shooting-s1"]);
    assert_eq!(ids(feed.created_by_user("alice")), ["meeting-m1"]);
  }

  #[test]
  fn pending_sources_count_as_empty_and_loading() {
    let sources = SourceSet {
      tasks: SourceState::Ready(vec![overdue_task("t1", Some("p1"))]),
      shootings: SourceState::Pending,
      meetings: SourceState::Failed("timeout".into()),
    };
    let feed = aggregate(&sources, now());
    assert!(feed.loading);
    assert_eq!(ids(&feed.activities), ["t1"]);

    let nothing = aggregate(&SourceSet::default(), now());
    assert!(nothing.loading);
    assert!(nothing.activities.is_empty());
  }

  #[test]
  fn failed_source_is_not_loading() {
    let sources = SourceSet {
      tasks:     SourceState::Failed("boom".into()),
      shootings: SourceState::Ready(Vec::new()),
      meetings:  SourceState::Ready(Vec::new()),
    };
    assert!(!sources.is_loading());
    assert_eq!(
      sources.tasks.summary(),
      SourceStatus::Failed {
        error: "boom".into(),
      }
    );
  }

  #[test]
  fn views_leave_the_base_sequence_untouched() {
    let feed = aggregate(&sample_sources(), now());
    let before = feed.clone();
    let _ = feed.visible_to_user("alice");
    let _ = feed.created_by_user("owner");
    let _ = feed.overdue_by_project();
    assert_eq!(feed, before);
  }
}
