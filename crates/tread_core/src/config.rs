//! Configuration for the Tread client core.
//!
//! Settings are persisted as TOML. Every field has a serde default so a
//! partial (or missing) file still yields a working configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::channel::BackoffPolicy;
use crate::error::{ConfigError, CoreError, Result};

/// REST backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the REST backend.
    pub base_url: String,
    /// Request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.tread.app".to_string(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Real-time notification hub configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubConfig {
    /// WebSocket endpoint of the notification hub.
    pub endpoint: String,
    #[serde(default)]
    pub backoff: BackoffConfig,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            endpoint: "wss://api.tread.app/hubs/reminders".to_string(),
            backoff: BackoffConfig::default(),
        }
    }
}

/// Reconnect delay policy for the hub connection.
///
/// The default is the historical fixed 5 second delay; setting a
/// `multiplier` above 1.0 switches to capped exponential backoff.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackoffConfig {
    #[serde(default = "default_initial_delay_secs")]
    pub initial_delay_secs: u64,
    #[serde(default = "default_max_delay_secs")]
    pub max_delay_secs: u64,
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
    /// Fraction of the delay randomized away (0.0 = none).
    #[serde(default)]
    pub jitter: f64,
}

fn default_initial_delay_secs() -> u64 {
    5
}

fn default_max_delay_secs() -> u64 {
    60
}

fn default_multiplier() -> f64 {
    1.0
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_delay_secs: default_initial_delay_secs(),
            max_delay_secs: default_max_delay_secs(),
            multiplier: default_multiplier(),
            jitter: 0.0,
        }
    }
}

impl BackoffConfig {
    /// Build the runtime policy from this config.
    pub fn policy(&self) -> BackoffPolicy {
        BackoffPolicy::new(
            Duration::from_secs(self.initial_delay_secs),
            Duration::from_secs(self.max_delay_secs),
            self.multiplier,
            self.jitter,
        )
    }
}

/// Local database configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the database directory.
    pub path: PathBuf,
}

impl DatabaseConfig {
    /// Path to the session database file.
    pub fn session_db(&self) -> PathBuf {
        self.path.join("session.db")
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("tread"),
        }
    }
}

/// Top-level client configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TreadConfig {
    pub api: ApiConfig,
    pub hub: HubConfig,
    pub database: DatabaseConfig,
}

impl TreadConfig {
    /// Load configuration from a TOML file.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let contents = std::fs::read_to_string(path).map_err(|e| CoreError::Configuration {
            config_path: path.display().to_string(),
            field: "(file)".to_string(),
            cause: ConfigError::Io(e.to_string()),
        })?;

        toml::from_str(&contents).map_err(|e| CoreError::Configuration {
            config_path: path.display().to_string(),
            field: "(file)".to_string(),
            cause: ConfigError::TomlParse(e.to_string()),
        })
    }

    /// Save configuration to a TOML file, creating parent directories.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let contents = toml::to_string_pretty(self).map_err(|e| CoreError::Configuration {
            config_path: path.display().to_string(),
            field: "(file)".to_string(),
            cause: ConfigError::TomlSerialize(e.to_string()),
        })?;

        if let Some(parent) = path.parent().filter(|p| !p.exists()) {
            std::fs::create_dir_all(parent).map_err(|e| CoreError::Configuration {
                config_path: path.display().to_string(),
                field: "(file)".to_string(),
                cause: ConfigError::Io(e.to_string()),
            })?;
        }

        std::fs::write(path, contents).map_err(|e| CoreError::Configuration {
            config_path: path.display().to_string(),
            field: "(file)".to_string(),
            cause: ConfigError::Io(e.to_string()),
        })
    }
}
