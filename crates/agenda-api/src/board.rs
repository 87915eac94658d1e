//! [`SharedBoard`]: an [`ActivityBoard`] shared between handlers and the
//! refresh loop.
//!
//! A refresh polls the three collaborators concurrently. Each result is
//! written to the board the moment its fetch resolves, so readers in the
//! meantime see whatever has arrived, with `loading` still set for the
//! rest. Until a source's new result lands, its previous rows stay visible.

use std::sync::Arc;

use agenda_core::{
  aggregate::{ActivityFeed, SourceState},
  query::{ActivityBoard, BoardStatus, Revision},
  store::ActivitySource,
};
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

pub struct SharedBoard<S> {
  source: Arc<S>,
  board:  RwLock<ActivityBoard>,
}

impl<S: ActivitySource> SharedBoard<S> {
  /// A board with all three sources pending. Nothing is fetched until the
  /// first [`refresh`](Self::refresh).
  pub fn new(source: Arc<S>) -> Self {
    Self {
      source,
      board: RwLock::new(ActivityBoard::new()),
    }
  }

  /// Re-fetch all three sources and return the resulting status.
  pub async fn refresh(&self) -> BoardStatus {
    let tasks = async {
      let state = into_state("tasks", self.source.fetch_tasks().await);
      let changed = self.board.write().await.set_tasks(state);
      tracing::debug!(source = "tasks", changed, "source refreshed");
    };
    let shootings = async {
      let state = into_state("shootings", self.source.fetch_shootings().await);
      let changed = self.board.write().await.set_shootings(state);
      tracing::debug!(source = "shootings", changed, "source refreshed");
    };
    let meetings = async {
      let state = into_state("meetings", self.source.fetch_meetings().await);
      let changed = self.board.write().await.set_meetings(state);
      tracing::debug!(source = "meetings", changed, "source refreshed");
    };
    tokio::join!(tasks, shootings, meetings);

    let status = self.status().await;
    tracing::info!(
      tasks = status.revision.tasks,
      shootings = status.revision.shootings,
      meetings = status.revision.meetings,
      "refresh complete"
    );
    status
  }

  /// The feed as seen at `now`, with the revision it was built from.
  pub async fn snapshot(&self, now: DateTime<Utc>) -> (ActivityFeed, Revision) {
    let board = self.board.read().await;
    (board.feed(now), board.revision())
  }

  pub async fn status(&self) -> BoardStatus { self.board.read().await.status() }
}

fn into_state<T, E: std::fmt::Display>(
  source: &'static str,
  result: Result<Vec<T>, E>,
) -> SourceState<T> {
  if let Err(e) = &result {
    tracing::warn!(source, error = %e, "fetch failed; treating source as empty");
  }
  SourceState::from(result)
}
