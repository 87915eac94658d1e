//! Handlers for the activity views.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/activities` | Optional `now`, `kind` (comma-separated), `from`, `until`, `status` |
//! | `GET`  | `/users/:id/activities` | Optional `now`, `scope=visible\|created` |
//! | `GET`  | `/overdue` | Optional `now`; overdue activities keyed by project id |
//!
//! `now` defaults to the time of the request.

use std::{collections::BTreeMap, sync::Arc};

use agenda_core::{
  activity::Activity,
  query::{ActivityQuery, Revision},
  record::ActivityKind,
  store::ActivitySource,
};
use axum::{
  Json,
  extract::{Path, Query, State},
  http::{HeaderMap, StatusCode, header},
  response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{board::SharedBoard, error::ApiError, etag};

/// Body of every list response.
#[derive(Debug, Serialize)]
pub struct FeedBody<'a> {
  pub as_of:      DateTime<Utc>,
  pub loading:    bool,
  pub revision:   Revision,
  pub activities: Vec<&'a Activity>,
}

// ─── Full feed ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
  pub now:    Option<DateTime<Utc>>,
  /// Comma-separated kinds, e.g. `task,meeting`.
  pub kind:   Option<String>,
  pub from:   Option<DateTime<Utc>>,
  pub until:  Option<DateTime<Utc>>,
  /// Effective status to match, e.g. `no_update`.
  pub status: Option<String>,
}

fn parse_kinds(raw: Option<&str>) -> Result<Vec<ActivityKind>, ApiError> {
  let Some(raw) = raw else {
    return Ok(Vec::new());
  };
  Ok(
    raw
      .split(',')
      .filter(|k| !k.trim().is_empty())
      .map(ActivityKind::parse)
      .collect::<agenda_core::Result<Vec<_>>>()?,
  )
}

/// `GET /activities[?now=...][&kind=...][&from=...][&until=...][&status=...]`
pub async fn list<S>(
  State(board): State<Arc<SharedBoard<S>>>,
  Query(params): Query<ListParams>,
  headers: HeaderMap,
) -> Result<Response, ApiError>
where
  S: ActivitySource,
{
  let query = ActivityQuery {
    kinds:  parse_kinds(params.kind.as_deref())?,
    from:   params.from,
    until:  params.until,
    status: params.status,
  };

  let (feed, revision) = board.snapshot(params.now.unwrap_or_else(Utc::now)).await;
  let activities = feed.filter(&query);
  let tag = etag::compute_etag(feed.loading, revision, &activities)?;

  let not_modified = headers
    .get(header::IF_NONE_MATCH)
    .and_then(|v| v.to_str().ok())
    .is_some_and(|v| etag::matches(v, &tag));
  if not_modified {
    return Ok((StatusCode::NOT_MODIFIED, [(header::ETAG, tag)]).into_response());
  }

  let body = FeedBody {
    as_of: feed.as_of,
    loading: feed.loading,
    revision,
    activities,
  };
  Ok(([(header::ETAG, tag)], Json(body)).into_response())
}

// ─── Per-user ─────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
  /// Assigned to or owned by the user.
  #[default]
  Visible,
  /// Owned by the user.
  Created,
}

#[derive(Debug, Deserialize, Default)]
pub struct UserParams {
  pub now:   Option<DateTime<Utc>>,
  #[serde(default)]
  pub scope: Scope,
}

/// `GET /users/:id/activities[?now=...][&scope=visible|created]`
pub async fn for_user<S>(
  State(board): State<Arc<SharedBoard<S>>>,
  Path(user_id): Path<String>,
  Query(params): Query<UserParams>,
) -> Result<Response, ApiError>
where
  S: ActivitySource,
{
  let (feed, revision) = board.snapshot(params.now.unwrap_or_else(Utc::now)).await;
  let activities = match params.scope {
    Scope::Visible => feed.visible_to_user(&user_id),
    Scope::Created => feed.created_by_user(&user_id),
  };
  let body = FeedBody {
    as_of: feed.as_of,
    loading: feed.loading,
    revision,
    activities,
  };
  Ok(Json(body).into_response())
}

// ─── Overdue ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct OverdueParams {
  pub now: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct OverdueBody<'a> {
  pub as_of:    DateTime<Utc>,
  pub loading:  bool,
  pub projects: BTreeMap<&'a str, Vec<&'a Activity>>,
}

/// `GET /overdue[?now=...]`
pub async fn overdue<S>(
  State(board): State<Arc<SharedBoard<S>>>,
  Query(params): Query<OverdueParams>,
) -> Result<Response, ApiError>
where
  S: ActivitySource,
{
  let (feed, _) = board.snapshot(params.now.unwrap_or_else(Utc::now)).await;
  let body = OverdueBody {
    as_of:    feed.as_of,
    loading:  feed.loading,
    projects: feed.overdue_by_project(),
  };
  Ok(Json(body).into_response())
}
