//! JSON query surface for the activity engine.
//!
//! Exposes an axum [`Router`] backed by a [`SharedBoard`] over any
//! [`agenda_core::store::ActivitySource`]. Every endpoint is read-only with
//! respect to the collaborators; auth, TLS, and transport concerns are the
//! caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", agenda_api::api_router(board.clone()))
//! ```

pub mod activities;
pub mod board;
pub mod error;
pub mod etag;
pub mod status;

use std::sync::Arc;

use agenda_core::store::ActivitySource;
use axum::{
  Router,
  routing::{get, post},
};

pub use board::SharedBoard;
pub use error::ApiError;

/// Build a fully-materialised API router for `board`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(board: Arc<SharedBoard<S>>) -> Router<()>
where
  S: ActivitySource + 'static,
{
  Router::new()
    .route("/activities", get(activities::list::<S>))
    .route("/users/{id}/activities", get(activities::for_user::<S>))
    .route("/overdue", get(activities::overdue::<S>))
    .route("/status", get(status::get::<S>))
    .route("/refresh", post(status::refresh::<S>))
    .with_state(board)
}
