//! SQLite backend for the task, shooting and meeting collaborators.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! pool without blocking the async runtime.

mod rows;
mod schema;
mod store;

pub mod error;
pub mod fixture;

pub use error::{Error, Result};
pub use fixture::Fixture;
pub use store::SqliteStore;
