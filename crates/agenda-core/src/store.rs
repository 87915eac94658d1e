//! The `ActivitySource` trait: the seam to the three collaborator stores.
//!
//! Implemented by storage backends (e.g. `agenda-store-sqlite`). Each
//! collaborator applies its own visibility rules before handing rows over;
//! this crate never filters by permission.

use std::future::Future;

use crate::record::{MeetingRow, ShootingRow, TaskRow};

/// Read access to the task, shooting and meeting collaborators.
///
/// The three fetches are independent and may be polled concurrently. Rows
/// come back in the collaborator's own order, which the aggregator keeps.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait ActivitySource: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Tasks with their assignee links and project/client join.
  fn fetch_tasks(
    &self,
  ) -> impl Future<Output = Result<Vec<TaskRow>, Self::Error>> + Send + '_;

  /// Shootings with their crew links and project/client join.
  fn fetch_shootings(
    &self,
  ) -> impl Future<Output = Result<Vec<ShootingRow>, Self::Error>> + Send + '_;

  /// Meetings with their participant links and project/client join.
  fn fetch_meetings(
    &self,
  ) -> impl Future<Output = Result<Vec<MeetingRow>, Self::Error>> + Send + '_;
}
