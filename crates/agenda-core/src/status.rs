//! Derived status.
//!
//! Each kind has two states: the raw status as stored, or an automatic
//! terminal status once its scheduled time has passed. Nothing is
//! remembered between evaluations, so a later change to the raw status
//! (e.g. a manual cancellation) shows up on the very next call.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  flatten::Projection,
  record::{SourceRecord, present},
  time,
};

pub const COMPLETED: &str = "completed";
pub const DONE: &str = "done";
pub const CANCELLED: &str = "cancelled";
pub const REJECTED: &str = "rejected";
/// A meeting whose date passed without anyone closing it out.
pub const NO_UPDATE: &str = "no_update";

const TASK_TERMINAL: &[&str] = &[COMPLETED, DONE];
const SHOOTING_TERMINAL: &[&str] = &[CANCELLED, REJECTED];
const MEETING_TERMINAL: &[&str] = &[COMPLETED, CANCELLED];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedStatus {
  pub status:     String,
  pub is_overdue: bool,
}

impl DerivedStatus {
  fn not_overdue(status: &str) -> Self {
    Self {
      status:     status.to_owned(),
      is_overdue: false,
    }
  }
}

/// Compute the effective status of `record` as seen at `now`.
///
/// `projection` must be [`flatten`](crate::flatten::flatten)`(record)`.
pub fn derive(
  record: &SourceRecord,
  projection: &Projection,
  now: DateTime<Utc>,
) -> DerivedStatus {
  match record {
    SourceRecord::Task(row) => {
      if projection.scheduled_at.is_none() {
        log_unparsable(record, row.deadline.as_deref());
      }
      let is_overdue = projection
        .scheduled_at
        .is_some_and(|deadline| deadline < now)
        && !TASK_TERMINAL.contains(&row.status.as_str());
      DerivedStatus {
        status: row.status.clone(),
        is_overdue,
      }
    }
    SourceRecord::Shooting(row) => {
      let scheduled = row.scheduled_date.as_deref().and_then(|date| {
        time::at_time_or_end_of_day(date, row.scheduled_time.as_deref())
      });
      match scheduled {
        Some(at)
          if at < now && !SHOOTING_TERMINAL.contains(&row.status.as_str()) =>
        {
          DerivedStatus::not_overdue(COMPLETED)
        }
        Some(_) => DerivedStatus::not_overdue(&row.status),
        None => {
          log_unparsable(record, row.scheduled_date.as_deref());
          DerivedStatus::not_overdue(&row.status)
        }
      }
    }
    SourceRecord::Meeting(row) => match projection.scheduled_at {
      Some(at)
        if at < now && !MEETING_TERMINAL.contains(&row.status.as_str()) =>
      {
        DerivedStatus::not_overdue(NO_UPDATE)
      }
      Some(_) => DerivedStatus::not_overdue(&row.status),
      None => {
        log_unparsable(record, row.meeting_date.as_deref());
        DerivedStatus::not_overdue(&row.status)
      }
    },
  }
}

/// Only worth a note when a value was present but did not parse.
fn log_unparsable(record: &SourceRecord, value: Option<&str>) {
  if let Some(value) = present(value) {
    tracing::debug!(
      activity = %record.activity_id(),
      value,
      "unparsable schedule; keeping raw status"
    );
  }
}

#[cfg(test)]
mod tests {
  use chrono::{Duration, NaiveDate, TimeZone};

  use super::*;
  use crate::{
    flatten::flatten,
    record::{MeetingRow, ShootingRow, TaskRow},
  };

  fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
  }

  fn eval(record: SourceRecord, now: DateTime<Utc>) -> DerivedStatus {
    let projection = flatten(&record);
    derive(&record, &projection, now)
  }

  fn task(deadline: Option<&str>, status: &str) -> SourceRecord {
    SourceRecord::from(TaskRow {
      id: "t1".into(),
      status: status.into(),
      deadline: deadline.map(Into::into),
      ..Default::default()
    })
  }

  fn shooting(date: &str, time: Option<&str>, status: &str) -> SourceRecord {
    SourceRecord::from(ShootingRow {
      id: "s1".into(),
      status: status.into(),
      scheduled_date: Some(date.into()),
      scheduled_time: time.map(Into::into),
      ..Default::default()
    })
  }

  fn meeting(date: Option<&str>, status: &str) -> SourceRecord {
    SourceRecord::from(MeetingRow {
      id: "m1".into(),
      status: status.into(),
      meeting_date: date.map(Into::into),
      ..Default::default()
    })
  }

  // ── Tasks ─────────────────────────────────────────────────────────────

  #[test]
  fn pending_task_past_deadline_is_overdue() {
    let d = eval(task(Some("2024-01-01"), "pending"), at(2024, 6, 1, 0, 0));
    assert_eq!(d, DerivedStatus {
      status:     "pending".into(),
      is_overdue: true,
    });
  }

  #[test]
  fn finished_tasks_are_never_overdue() {
    let now = at(2024, 6, 1, 0, 0);
    for status in ["completed", "done"] {
      let d = eval(task(Some("2024-01-01"), status), now);
      assert_eq!(d.status, status);
      assert!(!d.is_overdue);
    }
  }

  #[test]
  fn task_overdue_matches_definition_across_cases() {
    let now = at(2024, 6, 1, 12, 0);
    let deadlines = [
      None,
      Some("2024-06-01T12:00:00Z"),
      Some("2024-06-01T11:59:59Z"),
      Some("2024-07-01"),
      Some("not a date"),
    ];
    for deadline in deadlines {
      for status in ["pending", "in_progress", "completed", "done", ""] {
        let record = task(deadline, status);
        let projection = flatten(&record);
        let expected = projection.scheduled_at.is_some_and(|d| d < now)
          && status != "completed"
          && status != "done";
        let d = derive(&record, &projection, now);
        assert_eq!(d.is_overdue, expected, "{deadline:?} / {status}");
        assert_eq!(d.status, status);
      }
    }
  }

  #[test]
  fn deadline_exactly_now_is_not_overdue() {
    let now = at(2024, 6, 1, 0, 0);
    assert!(!eval(task(Some("2024-06-01"), "pending"), now).is_overdue);
  }

  // ── Shootings ─────────────────────────────────────────────────────────

  #[test]
  fn past_shooting_auto_completes() {
    let d = eval(
      shooting("2024-01-01", Some("10:00:00"), "approved"),
      at(2024, 6, 1, 0, 0),
    );
    assert_eq!(d.status, "completed");
    assert!(!d.is_overdue);
  }

  #[test]
  fn cancelled_or_rejected_shootings_keep_their_status() {
    for status in ["cancelled", "rejected"] {
      let d = eval(
        shooting("2024-01-01", Some("10:00:00"), status),
        at(2024, 6, 1, 0, 0),
      );
      assert_eq!(d.status, status);
    }
  }

  #[test]
  fn shooting_without_time_completes_only_after_the_day_ends() {
    let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
    let record = shooting("2024-03-10", None, "approved");

    let late_evening = today.and_hms_opt(23, 58, 0).unwrap().and_utc();
    assert_eq!(eval(record.clone(), late_evening).status, "approved");

    let next_morning = late_evening + Duration::minutes(3);
    assert_eq!(eval(record, next_morning).status, "completed");
  }

  #[test]
  fn future_shooting_keeps_raw_status() {
    let d = eval(
      shooting("2024-01-01", Some("10:00:00"), "approved"),
      at(2024, 1, 1, 9, 59),
    );
    assert_eq!(d.status, "approved");
  }

  #[test]
  fn malformed_shooting_time_keeps_raw_status() {
    let d = eval(
      shooting("2024-01-01", Some("ten o'clock"), "approved"),
      at(2024, 6, 1, 0, 0),
    );
    assert_eq!(d.status, "approved");
    assert!(!d.is_overdue);
  }

  // ── Meetings ──────────────────────────────────────────────────────────

  #[test]
  fn past_open_meeting_becomes_no_update() {
    let d = eval(meeting(Some("2024-01-01"), "scheduled"), at(2024, 6, 1, 0, 0));
    assert_eq!(d.status, "no_update");
    assert!(!d.is_overdue);
  }

  #[test]
  fn closed_meetings_keep_their_status() {
    for status in ["completed", "cancelled"] {
      let d = eval(meeting(Some("2024-01-01"), status), at(2024, 6, 1, 0, 0));
      assert_eq!(d.status, status);
    }
  }

  #[test]
  fn undated_meeting_keeps_raw_status() {
    let d = eval(meeting(None, "scheduled"), at(2024, 6, 1, 0, 0));
    assert_eq!(d.status, "scheduled");
  }

  #[test]
  fn unparsable_meeting_date_keeps_raw_status() {
    let d = eval(meeting(Some("soon"), "scheduled"), at(2024, 6, 1, 0, 0));
    assert_eq!(d.status, "scheduled");
    assert!(!d.is_overdue);
  }

  #[test]
  fn raw_status_change_is_reflected_immediately() {
    let now = at(2024, 6, 1, 0, 0);
    assert_eq!(
      eval(meeting(Some("2024-01-01"), "scheduled"), now).status,
      "no_update"
    );
    assert_eq!(
      eval(meeting(Some("2024-01-01"), "cancelled"), now).status,
      "cancelled"
    );
  }
}
