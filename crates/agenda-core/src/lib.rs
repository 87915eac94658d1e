//! Unified activity engine: tasks, shootings and meetings merged into one
//! Activity sequence with time-derived status.
//!
//! This crate has no HTTP or database dependencies. The
//! engine itself is a pure function of the source rows and an explicit
//! `now`; nothing it derives is ever written back.

pub mod activity;
pub mod aggregate;
pub mod assignees;
pub mod error;
pub mod flatten;
pub mod query;
pub mod record;
pub mod status;
pub mod store;
pub mod time;

pub use error::{Error, Result};
