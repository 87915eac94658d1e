//! Mapping between SQLite rows and the collaborator row types.
//!
//! Every main-table query selects its own columns followed by the four join
//! columns (`p.id, p.title, c.id, c.name`). Join-table links are loaded in a
//! second pass and attached by parent id.

use std::collections::HashMap;

use agenda_core::record::{
  ClientJoin, MeetingRow, ProjectJoin, ShootingRow, TaskRow, UserLink,
};
use rusqlite::Row;

// ─── Queries ──────────────────────────────────────────────────────────────────

const JOIN: &str = "LEFT JOIN projects p ON p.id = r.project_id
                    LEFT JOIN clients  c ON c.id = p.client_id";

pub fn select_tasks() -> String {
  format!(
    "SELECT r.id, r.title, r.status, r.deadline, r.priority, r.description,
            r.project_id, r.created_by, r.assigned_to,
            p.id, p.title, c.id, c.name
       FROM tasks r {JOIN}
      ORDER BY r.rowid"
  )
}

pub fn select_shootings() -> String {
  format!(
    "SELECT r.id, r.title, r.status, r.scheduled_date, r.scheduled_time,
            r.notes, r.project_id, r.requested_by, r.director, r.runner,
            p.id, p.title, c.id, c.name
       FROM shootings r {JOIN}
      ORDER BY r.rowid"
  )
}

pub fn select_meetings() -> String {
  format!(
    "SELECT r.id, r.title, r.status, r.meeting_date, r.notes, r.project_id,
            r.created_by,
            p.id, p.title, c.id, c.name
       FROM meetings r {JOIN}
      ORDER BY r.rowid"
  )
}

pub const SELECT_TASK_ASSIGNEES: &str =
  "SELECT task_id, user_id FROM task_assignees ORDER BY rowid";
pub const SELECT_SHOOTING_CREW: &str =
  "SELECT shooting_id, user_id FROM shooting_crew ORDER BY rowid";
pub const SELECT_MEETING_PARTICIPANTS: &str =
  "SELECT meeting_id, user_id FROM meeting_participants ORDER BY rowid";

// ─── Decoding ─────────────────────────────────────────────────────────────────

/// Read the project/client join starting at column `at`.
fn project_join(row: &Row<'_>, at: usize) -> rusqlite::Result<Option<ProjectJoin>> {
  let project_id: Option<String> = row.get(at)?;
  let Some(id) = project_id else {
    return Ok(None);
  };
  let client_id: Option<String> = row.get(at + 2)?;
  let clients = match client_id {
    Some(client_id) => Some(ClientJoin {
      id:   client_id,
      name: row.get(at + 3)?,
    }),
    None => None,
  };
  Ok(Some(ProjectJoin {
    id,
    title: row.get(at + 1)?,
    clients,
  }))
}

/// Decode a [`select_tasks`] row. Links are attached later.
pub fn task(row: &Row<'_>) -> rusqlite::Result<TaskRow> {
  Ok(TaskRow {
    id:             row.get(0)?,
    title:          row.get(1)?,
    status:         row.get(2)?,
    deadline:       row.get(3)?,
    priority:       row.get(4)?,
    description:    row.get(5)?,
    project_id:     row.get(6)?,
    created_by:     row.get(7)?,
    assigned_to:    row.get(8)?,
    task_assignees: Vec::new(),
    projects:       project_join(row, 9)?,
  })
}

pub fn shooting(row: &Row<'_>) -> rusqlite::Result<ShootingRow> {
  Ok(ShootingRow {
    id:             row.get(0)?,
    title:          row.get(1)?,
    status:         row.get(2)?,
    scheduled_date: row.get(3)?,
    scheduled_time: row.get(4)?,
    notes:          row.get(5)?,
    project_id:     row.get(6)?,
    requested_by:   row.get(7)?,
    director:       row.get(8)?,
    runner:         row.get(9)?,
    shooting_crew:  Vec::new(),
    projects:       project_join(row, 10)?,
  })
}

pub fn meeting(row: &Row<'_>) -> rusqlite::Result<MeetingRow> {
  Ok(MeetingRow {
    id:                   row.get(0)?,
    title:                row.get(1)?,
    status:               row.get(2)?,
    meeting_date:         row.get(3)?,
    notes:                row.get(4)?,
    project_id:           row.get(5)?,
    created_by:           row.get(6)?,
    meeting_participants: Vec::new(),
    projects:             project_join(row, 7)?,
  })
}

pub fn task_links(t: &mut TaskRow) -> (&str, &mut Vec<UserLink>) {
  (t.id.as_str(), &mut t.task_assignees)
}

pub fn shooting_links(s: &mut ShootingRow) -> (&str, &mut Vec<UserLink>) {
  (s.id.as_str(), &mut s.shooting_crew)
}

pub fn meeting_links(m: &mut MeetingRow) -> (&str, &mut Vec<UserLink>) {
  (m.id.as_str(), &mut m.meeting_participants)
}

/// Load a `(parent_id, user_id)` join table, grouped by parent and kept in
/// insertion order within each group.
pub fn load_links(
  conn: &rusqlite::Connection,
  sql: &str,
) -> rusqlite::Result<HashMap<String, Vec<UserLink>>> {
  let mut stmt = conn.prepare(sql)?;
  let pairs = stmt
    .query_map([], |row| {
      Ok((row.get::<_, String>(0)?, row.get::<_, Option<String>>(1)?))
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  let mut links: HashMap<String, Vec<UserLink>> = HashMap::new();
  for (parent, user_id) in pairs {
    links.entry(parent).or_default().push(UserLink { user_id });
  }
  Ok(links)
}

/// Run a main-table query and attach links to each row.
pub fn load_with_links<T>(
  conn: &rusqlite::Connection,
  sql: &str,
  links_sql: &str,
  decode: fn(&Row<'_>) -> rusqlite::Result<T>,
  attach: fn(&mut T) -> (&str, &mut Vec<UserLink>),
) -> rusqlite::Result<Vec<T>> {
  let mut links = load_links(conn, links_sql)?;
  let mut stmt = conn.prepare(sql)?;
  let mut rows = stmt
    .query_map([], decode)?
    .collect::<rusqlite::Result<Vec<T>>>()?;

  for row in &mut rows {
    let (id, slot) = attach(row);
    if let Some(found) = links.remove(id) {
      *slot = found;
    }
  }
  Ok(rows)
}
