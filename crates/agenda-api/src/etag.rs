//! ETag computation for activity listings.
//!
//! The tag is a SHA-256 over the `loading` flag, the source revisions and
//! the serialised activities. It changes when any row changes, when a
//! derived status flips with the clock, and when a pending source resolves
//! even if it brought no rows. `as_of` is left out.

use agenda_core::{activity::Activity, query::Revision};
use sha2::{Digest, Sha256};

use crate::error::ApiError;

/// Compute a quoted strong ETag for a listing, activities in the order given.
pub fn compute_etag(
  loading: bool,
  revision: Revision,
  activities: &[&Activity],
) -> Result<String, ApiError> {
  let mut hasher = Sha256::new();
  hasher.update([u8::from(loading)]);
  hasher.update(serde_json::to_vec(&revision)?);
  hasher.update([0u8]);
  for activity in activities {
    hasher.update(serde_json::to_vec(activity)?);
    hasher.update([0u8]);
  }
  Ok(format!("\"{}\"", hex::encode(hasher.finalize())))
}

/// Whether an `If-None-Match` header value matches `etag`.
pub fn matches(if_none_match: &str, etag: &str) -> bool {
  if_none_match
    .split(',')
    .map(str::trim)
    .any(|candidate| candidate == "*" || candidate == etag)
}
