//! Handlers for board status and manual refresh.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/status` | Per-source state, `loading`, `revision` |
//! | `POST` | `/refresh` | Re-fetch all sources; returns the new status |

use std::sync::Arc;

use agenda_core::{query::BoardStatus, store::ActivitySource};
use axum::{Json, extract::State};

use crate::board::SharedBoard;

/// `GET /status`
pub async fn get<S>(State(board): State<Arc<SharedBoard<S>>>) -> Json<BoardStatus>
where
  S: ActivitySource,
{
  Json(board.status().await)
}

/// `POST /refresh`
pub async fn refresh<S>(
  State(board): State<Arc<SharedBoard<S>>>,
) -> Json<BoardStatus>
where
  S: ActivitySource,
{
  Json(board.refresh().await)
}
