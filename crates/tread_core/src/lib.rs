//! Tread Core - Session store, real-time channel, and API client
//!
//! This crate provides the non-UI core of the Tread vehicle maintenance
//! tracker client:
//!
//! - [`session::SessionStore`]: durable, observable session state (token,
//!   selected vehicle, unseen-reminders flag) over `tread-auth`
//! - [`channel::ChannelManager`]: the self-healing real-time connection to
//!   the reminder notification hub
//! - [`api::ApiClient`]: the bearer-token REST repository layer
//! - [`consumer`]: helpers for reacting to session changes
//!
//! Control flow: the session store holds the access token; the channel
//! manager reads it to open a hub connection; a push event sets the
//! unseen-reminders flag; consumers observing that flag re-fetch from the
//! REST API.

pub mod api;
pub mod channel;
pub mod config;
pub mod consumer;
pub mod error;
pub mod session;

pub use api::{ApiClient, ApiError};
pub use channel::{BackoffPolicy, ChannelManager, ChannelState, HubEvent, HubTransport};
pub use config::TreadConfig;
pub use error::{ConfigError, CoreError, Result};
pub use session::SessionStore;

// Re-export the storage layer so callers don't need a direct tread-auth
// dependency for the common path.
pub use tread_auth::{SessionDb, AuthError};
