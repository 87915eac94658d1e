//! Assignee resolution: every person reference on a record, in a fixed
//! order, without duplicates.

use crate::record::{SourceRecord, UserLink, present};

/// Resolve the ordered assignee set for `record`.
///
/// - task: `assigned_to`, then `task_assignees`
/// - shooting: `requested_by`, `director`, `runner`, then `shooting_crew`
/// - meeting: `created_by`, then `meeting_participants`
///
/// Missing or empty ids are skipped; the first occurrence of an id wins.
pub fn resolve(record: &SourceRecord) -> Vec<String> {
  let mut set = AssigneeSet::default();
  match record {
    SourceRecord::Task(row) => {
      set.push(row.assigned_to.as_deref());
      set.extend_links(&row.task_assignees);
    }
    SourceRecord::Shooting(row) => {
      set.push(row.requested_by.as_deref());
      set.push(row.director.as_deref());
      set.push(row.runner.as_deref());
      set.extend_links(&row.shooting_crew);
    }
    SourceRecord::Meeting(row) => {
      set.push(row.created_by.as_deref());
      set.extend_links(&row.meeting_participants);
    }
  }
  set.0
}

/// Insertion-ordered set; membership is a linear scan over a short list.
#[derive(Default)]
struct AssigneeSet(Vec<String>);

impl AssigneeSet {
  fn push(&mut self, user_id: Option<&str>) {
    if let Some(id) = present(user_id)
      && !self.0.iter().any(|existing| existing == id)
    {
      self.0.push(id.to_owned());
    }
  }

  fn extend_links(&mut self, links: &[UserLink]) {
    for link in links {
      self.push(link.user_id.as_deref());
    }
  }
}
