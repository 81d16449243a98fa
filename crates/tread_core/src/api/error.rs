//! REST-call error taxonomy.
//!
//! Every failure is converted at the repository boundary into an
//! [`ApiError`] carrying a human-readable message; no error propagates as a
//! panic or raw transport type. There is no automatic retry — the caller
//! re-triggers the action.

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum ApiError {
    /// The server answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    #[diagnostic(code(tread_core::api_status))]
    Status { status: u16, message: String },

    /// Transport-level I/O failure (connect, timeout, TLS).
    #[error("Network error: {0}")]
    #[diagnostic(code(tread_core::api_transport))]
    Transport(#[source] reqwest::Error),

    /// The response body could not be parsed.
    #[error("Failed to decode response: {0}")]
    #[diagnostic(code(tread_core::api_decode))]
    Decode(String),

    /// An authenticated call was made without a session token.
    #[error("Not logged in")]
    #[diagnostic(
        code(tread_core::api_unauthenticated),
        help("Log in before calling authenticated endpoints")
    )]
    Unauthenticated,
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            ApiError::Transport(e)
        }
    }
}

impl ApiError {
    /// True for 4xx responses.
    pub fn is_client_error(&self) -> bool {
        matches!(self, ApiError::Status { status, .. } if (400..500).contains(status))
    }

    /// True for 5xx responses.
    pub fn is_server_error(&self) -> bool {
        matches!(self, ApiError::Status { status, .. } if (500..600).contains(status))
    }

    /// Message suitable for a transient UI notice. Each taxonomy class
    /// maps to a distinct message.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Status { status, message } if (400..500).contains(status) => {
                format!("The request was rejected: {}", message)
            }
            ApiError::Status { .. } => {
                "The server had a problem. Please try again later.".to_string()
            }
            ApiError::Transport(_) => {
                "Could not reach the server. Check your connection.".to_string()
            }
            ApiError::Decode(_) => "The server sent an unexpected response.".to_string(),
            ApiError::Unauthenticated => "Please log in to continue.".to_string(),
        }
    }
}
