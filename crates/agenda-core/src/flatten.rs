//! Relation flattening: one raw row of any kind into a common [`Projection`].

use chrono::{DateTime, Utc};

use crate::{
  activity::{ClientRef, ProjectRef},
  record::{ProjectJoin, SourceRecord, present},
  time,
};

pub const SHOOTING_PRIORITY: &str = "high";
pub const MEETING_PRIORITY: &str = "medium";

const SHOOTING_TITLE_PREFIX: &str = "Shooting: ";
const MEETING_TITLE_PREFIX: &str = "Meeting: ";

/// The kind-independent fields of an activity, before assignees and status.
///
/// `status` is always the raw status here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
  pub title:        String,
  pub status:       String,
  pub scheduled_at: Option<DateTime<Utc>>,
  pub project:      Option<ProjectRef>,
  pub client:       Option<ClientRef>,
  pub owner:        Option<String>,
  pub priority:     Option<String>,
  pub description:  Option<String>,
}

/// Project a raw record. Never fails: missing joins and unparsable dates
/// become `None`.
pub fn flatten(record: &SourceRecord) -> Projection {
  match record {
    SourceRecord::Task(row) => Projection {
      title:        row.title.clone(),
      status:       row.status.clone(),
      scheduled_at: row.deadline.as_deref().and_then(time::parse_instant),
      project:      project_ref(row.project_id.as_deref(), row.projects.as_ref()),
      client:       client_ref(row.projects.as_ref()),
      owner:        owned(row.created_by.as_deref()),
      priority:     owned(row.priority.as_deref()),
      description:  owned(row.description.as_deref()),
    },
    SourceRecord::Shooting(row) => Projection {
      title:        format!("{SHOOTING_TITLE_PREFIX}{}", row.title),
      status:       row.status.clone(),
      scheduled_at: row
        .scheduled_date
        .as_deref()
        .and_then(time::parse_date)
        .map(time::start_of_day),
      project:      project_ref(row.project_id.as_deref(), row.projects.as_ref()),
      client:       client_ref(row.projects.as_ref()),
      owner:        owned(row.requested_by.as_deref()),
      priority:     Some(SHOOTING_PRIORITY.to_owned()),
      description:  owned(row.notes.as_deref()),
    },
    SourceRecord::Meeting(row) => Projection {
      title:        format!("{MEETING_TITLE_PREFIX}{}", row.title),
      status:       row.status.clone(),
      scheduled_at: row.meeting_date.as_deref().and_then(time::parse_instant),
      project:      project_ref(row.project_id.as_deref(), row.projects.as_ref()),
      client:       client_ref(row.projects.as_ref()),
      owner:        owned(row.created_by.as_deref()),
      priority:     Some(MEETING_PRIORITY.to_owned()),
      description:  owned(row.notes.as_deref()),
    },
  }
}

fn owned(value: Option<&str>) -> Option<String> {
  present(value).map(str::to_owned)
}

/// The join wins when present; otherwise fall back to the bare foreign key.
fn project_ref(
  project_id: Option<&str>,
  join: Option<&ProjectJoin>,
) -> Option<ProjectRef> {
  match join {
    Some(p) => Some(ProjectRef {
      id:    p.id.clone(),
      title: p.title.clone(),
    }),
    None => owned(project_id).map(|id| ProjectRef { id, title: None }),
  }
}

fn client_ref(join: Option<&ProjectJoin>) -> Option<ClientRef> {
  join.and_then(|p| p.clients.as_ref()).map(|c| ClientRef {
    id:   c.id.clone(),
    name: c.name.clone(),
  })
}

#[cfg(test)]
mod tests {
  use chrono::{TimeZone, Utc};

  use super::*;
  use crate::record::{ClientJoin, MeetingRow, ShootingRow, TaskRow};

  fn acme_project() -> ProjectJoin {
    ProjectJoin {
      id:      "p1".into(),
      title:   Some("Spring campaign".into()),
      clients: Some(ClientJoin {
        id:   "c1".into(),
        name: Some("Acme".into()),
      }),
    }
  }

  #[test]
  fn task_maps_deadline_owner_and_joins() {
    let record = SourceRecord::from(TaskRow {
      id: "t1".into(),
      title: "Edit reel".into(),
      status: "pending".into(),
      deadline: Some("2024-01-01".into()),
      project_id: Some("p1".into()),
      created_by: Some("u1".into()),
      assigned_to: Some("u2".into()),
      projects: Some(acme_project()),
      ..Default::default()
    });

    let p = flatten(&record);
    assert_eq!(p.title, "Edit reel");
    assert_eq!(p.status, "pending");
    assert_eq!(
      p.scheduled_at,
      Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
    );
    assert_eq!(p.owner.as_deref(), Some("u1"));
    assert_eq!(p.project.unwrap().title.as_deref(), Some("Spring campaign"));
    assert_eq!(p.client.unwrap().name.as_deref(), Some("Acme"));
    assert_eq!(p.priority, None);
  }

  #[test]
  fn shooting_has_fixed_priority_and_prefixed_title() {
    let record = SourceRecord::from(ShootingRow {
      id: "s1".into(),
      title: "Studio day".into(),
      status: "approved".into(),
      scheduled_date: Some("2024-03-05".into()),
      scheduled_time: Some("09:00:00".into()),
      notes: Some("Bring the 50mm".into()),
      requested_by: Some("u3".into()),
      ..Default::default()
    });

    let p = flatten(&record);
    assert_eq!(p.title, "Shooting: Studio day");
    assert_eq!(p.priority.as_deref(), Some("high"));
    assert_eq!(p.description.as_deref(), Some("Bring the 50mm"));
    assert_eq!(p.owner.as_deref(), Some("u3"));
    assert_eq!(
      p.scheduled_at,
      Some(Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap())
    );
  }

  #[test]
  fn meeting_has_fixed_priority() {
    let record = SourceRecord::from(MeetingRow {
      id: "m1".into(),
      title: "Kickoff".into(),
      meeting_date: Some("2024-02-01T15:00:00Z".into()),
      created_by: Some("u4".into()),
      ..Default::default()
    });

    let p = flatten(&record);
    assert_eq!(p.title, "Meeting: Kickoff");
    assert_eq!(p.priority.as_deref(), Some("medium"));
    assert_eq!(p.owner.as_deref(), Some("u4"));
  }

  #[test]
  fn missing_joins_are_none() {
    let record = SourceRecord::from(TaskRow {
      id: "t1".into(),
      ..Default::default()
    });

    let p = flatten(&record);
    assert_eq!(p.project, None);
    assert_eq!(p.client, None);
    assert_eq!(p.owner, None);
    assert_eq!(p.scheduled_at, None);
  }

  #[test]
  fn bare_project_id_without_join() {
    let record = SourceRecord::from(MeetingRow {
      id: "m1".into(),
      project_id: Some("p9".into()),
      ..Default::default()
    });

    let p = flatten(&record);
    assert_eq!(
      p.project,
      Some(ProjectRef {
        id:    "p9".into(),
        title: None,
      })
    );
    assert_eq!(p.client, None);
  }
}
