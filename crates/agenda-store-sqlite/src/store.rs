//! [`SqliteStore`], the SQLite implementation of [`ActivitySource`].

use std::path::Path;

use agenda_core::{
  record::{ClientJoin, MeetingRow, ProjectJoin, ShootingRow, TaskRow, UserLink},
  store::ActivitySource,
};

use crate::{Fixture, Result, rows, schema::SCHEMA};

// ─── Store ───────────────────────────────────────────────────────────────────

/// Task, shooting and meeting collaborators backed by a single SQLite file.
///
/// Cloning shares the inner reference-counted connection.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Writes ──────────────────────────────────────────────────────────────

  /// Insert or update a client.
  pub async fn insert_client(&self, client: ClientJoin) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        write_client(conn, &client)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Insert or update a project, together with its client if it has one.
  pub async fn insert_project(&self, project: ProjectJoin) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        write_project(&tx, &project)?;
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Insert a task and its `task_assignees` links. The `projects` join on
  /// the row is ignored; only `project_id` is stored. Fails if the id
  /// already exists.
  pub async fn insert_task(&self, task: TaskRow) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        write_task(&tx, &task, Conflict::Reject)?;
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  pub async fn insert_shooting(&self, shooting: ShootingRow) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        write_shooting(&tx, &shooting, Conflict::Reject)?;
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  pub async fn insert_meeting(&self, meeting: MeetingRow) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        write_meeting(&tx, &meeting, Conflict::Reject)?;
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Import a whole [`Fixture`] in one transaction, in fixture order.
  ///
  /// Rows whose id already exists are updated and their links replaced, so
  /// seeding the same file on every start is harmless.
  pub async fn seed(&self, fixture: Fixture) -> Result<()> {
    let counts = (
      fixture.projects.len(),
      fixture.tasks.len(),
      fixture.shootings.len(),
      fixture.meetings.len(),
    );

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        for project in &fixture.projects {
          write_project(&tx, project)?;
        }
        for task in &fixture.tasks {
          write_task(&tx, task, Conflict::Update)?;
        }
        for shooting in &fixture.shootings {
          write_shooting(&tx, shooting, Conflict::Update)?;
        }
        for meeting in &fixture.meetings {
          write_meeting(&tx, meeting, Conflict::Update)?;
        }
        tx.commit()?;
        Ok(())
      })
      .await?;

    tracing::info!(
      projects = counts.0,
      tasks = counts.1,
      shootings = counts.2,
      meetings = counts.3,
      "seeded store"
    );
    Ok(())
  }
}

// ─── Row writers ─────────────────────────────────────────────────────────────

/// How a row writer treats an id that already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Conflict {
  /// Fail with a constraint error.
  Reject,
  /// Update the row in place and replace its links.
  Update,
}

fn write_client(
  conn: &rusqlite::Connection,
  client: &ClientJoin,
) -> rusqlite::Result<()> {
  conn.execute(
    "INSERT INTO clients (id, name) VALUES (?1, ?2)
     ON CONFLICT (id) DO UPDATE SET name = excluded.name",
    rusqlite::params![client.id, client.name],
  )?;
  Ok(())
}

fn write_project(
  conn: &rusqlite::Connection,
  project: &ProjectJoin,
) -> rusqlite::Result<()> {
  if let Some(client) = &project.clients {
    write_client(conn, client)?;
  }
  conn.execute(
    "INSERT INTO projects (id, title, client_id) VALUES (?1, ?2, ?3)
     ON CONFLICT (id) DO UPDATE SET
       title = excluded.title,
       client_id = excluded.client_id",
    rusqlite::params![
      project.id,
      project.title,
      project.clients.as_ref().map(|c| c.id.as_str()),
    ],
  )?;
  Ok(())
}

/// The bare foreign key, falling back to the join's id.
fn project_id<'a>(
  project_id: &'a Option<String>,
  join: &'a Option<ProjectJoin>,
) -> Option<&'a str> {
  project_id
    .as_deref()
    .or_else(|| join.as_ref().map(|p| p.id.as_str()))
}

/// SQL for one link table: clearing a parent's links and adding one.
struct LinkTable {
  clear:  &'static str,
  insert: &'static str,
}

const TASK_ASSIGNEES: LinkTable = LinkTable {
  clear:  "DELETE FROM task_assignees WHERE task_id = ?1",
  insert: "INSERT OR IGNORE INTO task_assignees (task_id, user_id) VALUES (?1, ?2)",
};

const SHOOTING_CREW: LinkTable = LinkTable {
  clear:  "DELETE FROM shooting_crew WHERE shooting_id = ?1",
  insert: "INSERT OR IGNORE INTO shooting_crew (shooting_id, user_id) VALUES (?1, ?2)",
};

const MEETING_PARTICIPANTS: LinkTable = LinkTable {
  clear:  "DELETE FROM meeting_participants WHERE meeting_id = ?1",
  insert: "INSERT OR IGNORE INTO meeting_participants (meeting_id, user_id) \
           VALUES (?1, ?2)",
};

fn write_links(
  conn: &rusqlite::Connection,
  table: &LinkTable,
  conflict: Conflict,
  parent_id: &str,
  links: &[UserLink],
) -> rusqlite::Result<()> {
  if conflict == Conflict::Update {
    conn.execute(table.clear, [parent_id])?;
  }
  let mut stmt = conn.prepare(table.insert)?;
  for link in links {
    stmt.execute(rusqlite::params![parent_id, link.user_id])?;
  }
  Ok(())
}

/// Upserts keep the original rowid, so reseeding preserves fetch order.
fn on_conflict(conflict: Conflict, update: &str) -> String {
  match conflict {
    Conflict::Reject => String::new(),
    Conflict::Update => format!(" ON CONFLICT (id) DO UPDATE SET {update}"),
  }
}

fn write_task(
  conn: &rusqlite::Connection,
  task: &TaskRow,
  conflict: Conflict,
) -> rusqlite::Result<()> {
  let sql = format!(
    "INSERT INTO tasks (
       id, title, status, deadline, priority, description,
       project_id, created_by, assigned_to
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9){}",
    on_conflict(
      conflict,
      "title = excluded.title, status = excluded.status, \
       deadline = excluded.deadline, priority = excluded.priority, \
       description = excluded.description, project_id = excluded.project_id, \
       created_by = excluded.created_by, assigned_to = excluded.assigned_to",
    ),
  );
  conn.execute(
    &sql,
    rusqlite::params![
      task.id,
      task.title,
      task.status,
      task.deadline,
      task.priority,
      task.description,
      project_id(&task.project_id, &task.projects),
      task.created_by,
      task.assigned_to,
    ],
  )?;
  write_links(conn, &TASK_ASSIGNEES, conflict, &task.id, &task.task_assignees)
}

fn write_shooting(
  conn: &rusqlite::Connection,
  shooting: &ShootingRow,
  conflict: Conflict,
) -> rusqlite::Result<()> {
  let sql = format!(
    "INSERT INTO shootings (
       id, title, status, scheduled_date, scheduled_time, notes,
       project_id, requested_by, director, runner
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10){}",
    on_conflict(
      conflict,
      "title = excluded.title, status = excluded.status, \
       scheduled_date = excluded.scheduled_date, \
       scheduled_time = excluded.scheduled_time, notes = excluded.notes, \
       project_id = excluded.project_id, requested_by = excluded.requested_by, \
       director = excluded.director, runner = excluded.runner",
    ),
  );
  conn.execute(
    &sql,
    rusqlite::params![
      shooting.id,
      shooting.title,
      shooting.status,
      shooting.scheduled_date,
      shooting.scheduled_time,
      shooting.notes,
      project_id(&shooting.project_id, &shooting.projects),
      shooting.requested_by,
      shooting.director,
      shooting.runner,
    ],
  )?;
  write_links(
    conn,
    &SHOOTING_CREW,
    conflict,
    &shooting.id,
    &shooting.shooting_crew,
  )
}

fn write_meeting(
  conn: &rusqlite::Connection,
  meeting: &MeetingRow,
  conflict: Conflict,
) -> rusqlite::Result<()> {
  let sql = format!(
    "INSERT INTO meetings (
       id, title, status, meeting_date, notes, project_id, created_by
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7){}",
    on_conflict(
      conflict,
      "title = excluded.title, status = excluded.status, \
       meeting_date = excluded.meeting_date, notes = excluded.notes, \
       project_id = excluded.project_id, created_by = excluded.created_by",
    ),
  );
  conn.execute(
    &sql,
    rusqlite::params![
      meeting.id,
      meeting.title,
      meeting.status,
      meeting.meeting_date,
      meeting.notes,
      project_id(&meeting.project_id, &meeting.projects),
      meeting.created_by,
    ],
  )?;
  write_links(
    conn,
    &MEETING_PARTICIPANTS,
    conflict,
    &meeting.id,
    &meeting.meeting_participants,
  )
}

// ─── ActivitySource impl ─────────────────────────────────────────────────────

impl ActivitySource for SqliteStore {
  type Error = crate::Error;

  async fn fetch_tasks(&self) -> Result<Vec<TaskRow>> {
    let tasks = self
      .conn
      .call(|conn| {
        Ok(rows::load_with_links(
          conn,
          &rows::select_tasks(),
          rows::SELECT_TASK_ASSIGNEES,
          rows::task,
          rows::task_links,
        )?)
      })
      .await?;
    Ok(tasks)
  }

  async fn fetch_shootings(&self) -> Result<Vec<ShootingRow>> {
    let shootings = self
      .conn
      .call(|conn| {
        Ok(rows::load_with_links(
          conn,
          &rows::select_shootings(),
          rows::SELECT_SHOOTING_CREW,
          rows::shooting,
          rows::shooting_links,
        )?)
      })
      .await?;
    Ok(shootings)
  }

  async fn fetch_meetings(&self) -> Result<Vec<MeetingRow>> {
    let meetings = self
      .conn
      .call(|conn| {
        Ok(rows::load_with_links(
          conn,
          &rows::select_meetings(),
          rows::SELECT_MEETING_PARTICIPANTS,
          rows::meeting,
          rows::meeting_links,
        )?)
      })
      .await?;
    Ok(meetings)
  }
}
