//! The query surface: a board that caches staged records per source and
//! hands out freshly-evaluated feeds.
//!
//! Staging is keyed on each source's revision. Replacing one source
//! re-stages that source alone; statuses are derived again on every
//! [`ActivityBoard::feed`] call, since they depend on `now`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  activity::Activity,
  aggregate::{self, ActivityFeed, SourceState, SourceStatus, Staged},
  record::{ActivityKind, MeetingRow, ShootingRow, SourceRecord, TaskRow},
};

// ─── Revision ────────────────────────────────────────────────────────────────

/// Per-source revision counters. Each bumps whenever its source's content
/// actually changes.
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub struct Revision {
  pub tasks:     u64,
  pub shootings: u64,
  pub meetings:  u64,
}

/// Per-source availability, as reported by [`ActivityBoard::status`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardStatus {
  pub loading:   bool,
  pub revision:  Revision,
  pub tasks:     SourceStatus,
  pub shootings: SourceStatus,
  pub meetings:  SourceStatus,
}

// ─── Board ───────────────────────────────────────────────────────────────────

#[derive(Debug)]
struct Slot<T> {
  state:    SourceState<T>,
  revision: u64,
  staged:   Vec<Staged>,
}

impl<T> Default for Slot<T> {
  fn default() -> Self {
    Self {
      state:    SourceState::Pending,
      revision: 0,
      staged:   Vec::new(),
    }
  }
}

impl<T> Slot<T>
where
  T: Clone + PartialEq + Into<SourceRecord>,
{
  /// Returns `false` if `state` equals what is already held.
  fn replace(&mut self, state: SourceState<T>) -> bool {
    if state == self.state {
      return false;
    }
    self.staged = aggregate::stage(state.rows().iter().cloned().map(Into::into));
    self.state = state;
    self.revision += 1;
    true
  }
}

/// The three source slots plus their staged records.
///
/// All three start out pending. A board never performs I/O itself; whoever
/// owns it feeds results in through the `set_*` methods as they arrive, in
/// any order.
#[derive(Debug, Default)]
pub struct ActivityBoard {
  tasks:     Slot<TaskRow>,
  shootings: Slot<ShootingRow>,
  meetings:  Slot<MeetingRow>,
}

impl ActivityBoard {
  pub fn new() -> Self { Self::default() }

  /// Replace the task rows. Returns whether anything changed.
  pub fn set_tasks(&mut self, state: SourceState<TaskRow>) -> bool {
    self.tasks.replace(state)
  }

  pub fn set_shootings(&mut self, state: SourceState<ShootingRow>) -> bool {
    self.shootings.replace(state)
  }

  pub fn set_meetings(&mut self, state: SourceState<MeetingRow>) -> bool {
    self.meetings.replace(state)
  }

  pub fn revision(&self) -> Revision {
    Revision {
      tasks:     self.tasks.revision,
      shootings: self.shootings.revision,
      meetings:  self.meetings.revision,
    }
  }

  pub fn is_loading(&self) -> bool {
    self.tasks.state.is_pending()
      || self.shootings.state.is_pending()
      || self.meetings.state.is_pending()
  }

  pub fn status(&self) -> BoardStatus {
    BoardStatus {
      loading:   self.is_loading(),
      revision:  self.revision(),
      tasks:     self.tasks.state.summary(),
      shootings: self.shootings.state.summary(),
      meetings:  self.meetings.state.summary(),
    }
  }

  /// Evaluate every cached record at `now`, tasks first, then shootings,
  /// then meetings.
  pub fn feed(&self, now: DateTime<Utc>) -> ActivityFeed {
    let staged = self
      .tasks
      .staged
      .iter()
      .chain(&self.shootings.staged)
      .chain(&self.meetings.staged);
    ActivityFeed {
      as_of:      now,
      loading:    self.is_loading(),
      activities: aggregate::evaluate(staged, now),
    }
  }
}

// ─── Filters ─────────────────────────────────────────────────────────────────

/// Narrows a feed for calendar and board consumers.
#[derive(Debug, Clone, Default)]
pub struct ActivityQuery {
  /// Restrict to these kinds; empty means all.
  pub kinds:  Vec<ActivityKind>,
  /// Inclusive lower bound on `scheduled_at`.
  pub from:   Option<DateTime<Utc>>,
  /// Exclusive upper bound on `scheduled_at`.
  pub until:  Option<DateTime<Utc>>,
  /// Match the effective (derived) status.
  pub status: Option<String>,
}

impl ActivityQuery {
  pub fn matches(&self, activity: &Activity) -> bool {
    if !self.kinds.is_empty() && !self.kinds.contains(&activity.kind) {
      return false;
    }
    if let Some(status) = &self.status
      && activity.status != *status
    {
      return false;
    }
    if self.from.is_none() && self.until.is_none() {
      return true;
    }
    let Some(at) = activity.scheduled_at else {
      return false;
    };
    self.from.is_none_or(|from| at >= from)
      && self.until.is_none_or(|until| at < until)
  }
}

impl ActivityFeed {
  /// Activities matching `query`, in feed order.
  pub fn filter(&self, query: &ActivityQuery) -> Vec<&Activity> {
    self.activities.iter().filter(|a| query.matches(a)).collect()
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
  }

  fn task(id: &str, deadline: &str) -> TaskRow {
    TaskRow {
      id: id.into(),
      status: "pending".into(),
      deadline: Some(deadline.into()),
      ..Default::default()
    }
  }

  fn meeting(id: &str, date: &str) -> MeetingRow {
    MeetingRow {
      id: id.into(),
      status: "scheduled".into(),
      meeting_date: Some(date.into()),
      ..Default::default()
    }
  }

  #[test]
  fn new_board_is_loading_and_empty() {
    let board = ActivityBoard::new();
    let feed = board.feed(at(2024, 6, 1));
    assert!(feed.loading);
    assert!(feed.activities.is_empty());
    assert_eq!(board.revision(), Revision::default());
  }

  #[test]
  fn sources_may_arrive_in_any_order() {
    let mut board = ActivityBoard::new();
    board.set_meetings(SourceState::Ready(vec![meeting("m1", "2024-07-01")]));
    assert!(board.is_loading());
    assert_eq!(board.feed(at(2024, 6, 1)).activities.len(), 1);

    board.set_tasks(SourceState::Ready(vec![task("t1", "2024-07-01")]));
    board.set_shootings(SourceState::Ready(Vec::new()));
    let feed = board.feed(at(2024, 6, 1));
    assert!(!feed.loading);
    let ids: Vec<_> = feed.activities.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, ["t1", "meeting-m1"]);
  }

  #[test]
  fn revision_bumps_only_on_change() {
    let mut board = ActivityBoard::new();
    assert!(board.set_tasks(SourceState::Ready(vec![task("t1", "2024-01-01")])));
    assert!(!board.set_tasks(SourceState::Ready(vec![task("t1", "2024-01-01")])));
    assert!(board.set_meetings(SourceState::Failed("down".into())));

    assert_eq!(board.revision(), Revision {
      tasks:     1,
      shootings: 0,
      meetings:  1,
    });
  }

  #[test]
  fn feed_matches_pure_aggregation() {
    let tasks = vec![task("t1", "2024-01-01"), task("t2", "2024-09-01")];
    let meetings = vec![meeting("m1", "2024-01-01")];

    let mut board = ActivityBoard::new();
    board.set_tasks(SourceState::Ready(tasks.clone()));
    board.set_shootings(SourceState::Ready(Vec::new()));
    board.set_meetings(SourceState::Ready(meetings.clone()));

    let sources = aggregate::SourceSet {
      tasks:     SourceState::Ready(tasks),
      shootings: SourceState::Ready(Vec::new()),
      meetings:  SourceState::Ready(meetings),
    };
    let now = at(2024, 6, 1);
    assert_eq!(board.feed(now), aggregate::aggregate(&sources, now));
  }

  #[test]
  fn statuses_follow_the_supplied_now() {
    let mut board = ActivityBoard::new();
    board.set_tasks(SourceState::Ready(vec![task("t1", "2024-06-15")]));

    assert!(!board.feed(at(2024, 6, 1)).activities[0].is_overdue);
    assert!(board.feed(at(2024, 7, 1)).activities[0].is_overdue);
  }

  #[test]
  fn query_filters_by_kind_window_and_status() {
    let mut board = ActivityBoard::new();
    board.set_tasks(SourceState::Ready(vec![
      task("t1", "2024-05-01"),
      task("t2", "2024-06-10"),
      TaskRow {
        deadline: None,
        ..task("t3", "")
      },
    ]));
    board.set_meetings(SourceState::Ready(vec![meeting("m1", "2024-06-20")]));
    let feed = board.feed(at(2024, 6, 1));

    let june = ActivityQuery {
      from: Some(at(2024, 6, 1)),
      until: Some(at(2024, 7, 1)),
      ..Default::default()
    };
    let ids: Vec<_> = feed.filter(&june).iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, ["t2", "meeting-m1"]);

    let meetings_only = ActivityQuery {
      kinds: vec![ActivityKind::Meeting],
      ..Default::default()
    };
    assert_eq!(feed.filter(&meetings_only).len(), 1);

    let pending = ActivityQuery {
      status: Some("pending".into()),
      ..Default::default()
    };
    assert_eq!(feed.filter(&pending).len(), 3);

    assert_eq!(feed.filter(&ActivityQuery::default()).len(), 4);
  }
}
