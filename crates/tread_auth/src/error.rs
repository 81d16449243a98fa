//! Error types for tread_auth.

use miette::Diagnostic;
use thiserror::Error;

/// Result type for session-storage operations.
pub type AuthResult<T> = Result<T, AuthError>;

/// Errors that can occur in session-storage operations.
#[derive(Debug, Error, Diagnostic)]
pub enum AuthError {
    /// Database error from sqlx.
    #[error("Database error: {0}")]
    #[diagnostic(code(tread_auth::database))]
    Database(#[from] sqlx::Error),

    /// Migration error.
    #[error("Migration error: {0}")]
    #[diagnostic(code(tread_auth::migration))]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// IO error.
    #[error("IO error: {0}")]
    #[diagnostic(code(tread_auth::io))]
    Io(#[from] std::io::Error),

    /// A stored value could not be interpreted as the expected type.
    #[error("Invalid stored value for {partition}/{key}: {value:?}")]
    #[diagnostic(code(tread_auth::invalid_value))]
    InvalidValue {
        partition: String,
        key: String,
        value: String,
    },
}
