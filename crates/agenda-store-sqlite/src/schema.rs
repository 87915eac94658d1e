//! SQL schema for the collaborator tables.
//!
//! Date-like columns hold whatever text the collaborator was given; they are
//! parsed by the engine, not here. `project_id` carries no foreign key: rows
//! may reference projects this store does not hold.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS clients (
    id    TEXT PRIMARY KEY,
    name  TEXT
);

CREATE TABLE IF NOT EXISTS projects (
    id         TEXT PRIMARY KEY,
    title      TEXT,
    client_id  TEXT REFERENCES clients(id)
);

CREATE TABLE IF NOT EXISTS tasks (
    id           TEXT PRIMARY KEY,
    title        TEXT NOT NULL DEFAULT '',
    status       TEXT NOT NULL DEFAULT '',
    deadline     TEXT,
    priority     TEXT,
    description  TEXT,
    project_id   TEXT,
    created_by   TEXT,
    assigned_to  TEXT
);

CREATE TABLE IF NOT EXISTS task_assignees (
    task_id  TEXT NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
    user_id  TEXT,
    UNIQUE (task_id, user_id)
);

CREATE TABLE IF NOT EXISTS shootings (
    id              TEXT PRIMARY KEY,
    title           TEXT NOT NULL DEFAULT '',
    status          TEXT NOT NULL DEFAULT '',
    scheduled_date  TEXT,
    scheduled_time  TEXT,
    notes           TEXT,
    project_id      TEXT,
    requested_by    TEXT,
    director        TEXT,
    runner          TEXT
);

CREATE TABLE IF NOT EXISTS shooting_crew (
    shooting_id  TEXT NOT NULL REFERENCES shootings(id) ON DELETE CASCADE,
    user_id      TEXT,
    UNIQUE (shooting_id, user_id)
);

CREATE TABLE IF NOT EXISTS meetings (
    id            TEXT PRIMARY KEY,
    title         TEXT NOT NULL DEFAULT '',
    status        TEXT NOT NULL DEFAULT '',
    meeting_date  TEXT,
    notes         TEXT,
    project_id    TEXT,
    created_by    TEXT
);

CREATE TABLE IF NOT EXISTS meeting_participants (
    meeting_id  TEXT NOT NULL REFERENCES meetings(id) ON DELETE CASCADE,
    user_id     TEXT,
    UNIQUE (meeting_id, user_id)
);

CREATE INDEX IF NOT EXISTS task_assignees_task_idx      ON task_assignees(task_id);
CREATE INDEX IF NOT EXISTS shooting_crew_shooting_idx   ON shooting_crew(shooting_id);
CREATE INDEX IF NOT EXISTS meeting_participants_mtg_idx ON meeting_participants(meeting_id);

PRAGMA user_version = 1;
";
