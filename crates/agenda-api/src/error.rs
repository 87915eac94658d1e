//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl From<agenda_core::Error> for ApiError {
  fn from(e: agenda_core::Error) -> Self { ApiError::BadRequest(e.to_string()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Serialization(e) => {
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn unknown_kind_maps_to_bad_request() {
    let err = ApiError::from(agenda_core::Error::UnknownKind("webinar".into()));
    assert!(matches!(&err, ApiError::BadRequest(m) if m.contains("webinar")));
    assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
  }

  #[test]
  fn serialization_failure_is_a_server_error() {
    let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    assert_eq!(
      ApiError::from(json_err).into_response().status(),
      StatusCode::INTERNAL_SERVER_ERROR
    );
  }
}
