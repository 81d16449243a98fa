//! Tread Auth - Credential and session-state storage for Tread.
//!
//! This crate provides durable storage for the client session:
//! - the access token identifying the logged-in user
//! - the last selected vehicle id
//! - the unseen-reminders flag
//!
//! # Architecture
//!
//! State lives in a small SQLite database (`session.db`), split into
//! independent key-value partitions so a logout can clear credential and
//! cache state atomically. Keeping credentials in their own crate and
//! database keeps the rest of the client free of token handling.

pub mod db;
pub mod error;
pub mod state;

pub use db::SessionDb;
pub use error::{AuthError, AuthResult};
pub use state::{PARTITION_AUTH, PARTITION_SESSION, PARTITION_VEHICLE};
