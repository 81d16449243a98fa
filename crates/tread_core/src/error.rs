use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::ApiError;

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Configuration-specific errors
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(String),

    #[error("Invalid value for field {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

#[derive(Error, Diagnostic, Debug)]
pub enum CoreError {
    #[error("Channel {operation} failed: {cause}")]
    #[diagnostic(
        code(tread_core::channel_error),
        help("The reminder channel retries automatically; this error is internal to one attempt")
    )]
    Channel { operation: String, cause: String },

    #[error("Session storage error")]
    #[diagnostic(
        code(tread_core::storage_error),
        help("Check that the session database is writable")
    )]
    Storage(#[from] tread_auth::AuthError),

    #[error("API request failed")]
    #[diagnostic(code(tread_core::api_error))]
    Api(#[from] ApiError),

    #[error("Configuration error for field '{field}'")]
    #[diagnostic(
        code(tread_core::configuration_error),
        help("Check configuration file at {config_path}")
    )]
    Configuration {
        config_path: String,
        field: String,
        #[source]
        cause: ConfigError,
    },

    #[error("Serialization error")]
    #[diagnostic(
        code(tread_core::serialization_error),
        help("Failed to serialize/deserialize {data_type}")
    )]
    Serialization {
        data_type: String,
        #[source]
        cause: serde_json::Error,
    },
}

impl CoreError {
    /// Shorthand for channel-attempt failures.
    pub fn channel(operation: impl Into<String>, cause: impl ToString) -> Self {
        Self::Channel {
            operation: operation.into(),
            cause: cause.to_string(),
        }
    }
}
