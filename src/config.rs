//! Client configuration

use crate::{notify::ToastDurations, Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default location of the configuration file
pub const DEFAULT_CONFIG_PATH: &str = "./tomesphere_data/config.json";

/// Client configuration
///
/// Stored as JSON. Missing fields take their default value, so older files
/// keep loading after new settings are added.
///
/// # Example
/// ```rust,no_run
/// use tomesphere_dm::config::ClientConfig;
///
/// let mut config = ClientConfig::load("config.json").expect("Failed to load");
/// config.user_id = Some("alice".to_string());
/// config.save("config.json").expect("Failed to save");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Path of the SQLite message database
    pub db_path: String,
    /// User signed in on the last run
    pub user_id: Option<String>,
    /// Interval between scans for rows written by other processes
    pub realtime_poll_interval_ms: u64,
    /// Lifetime of error toasts in milliseconds
    pub error_toast_ms: u64,
    /// Lifetime of other toasts in milliseconds
    pub toast_ms: u64,
    /// Log file of the terminal client
    pub log_path: String,
    /// Default `tracing` filter when `RUST_LOG` is unset
    pub log_filter: String,
}

impl ClientConfig {
    /// Load configuration from a JSON file
    ///
    /// Returns the default configuration if the file doesn't exist or is empty.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let data = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?;

        if data.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Self = serde_json::from_str(&data)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("Failed to create config directory: {}", e)))?;
        }

        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .map_err(|e| Error::Config(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Reject values the client cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.db_path.trim().is_empty() {
            return Err(Error::Config("db_path must not be empty".to_string()));
        }
        if self.realtime_poll_interval_ms == 0 {
            return Err(Error::Config(
                "realtime_poll_interval_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Tail interval of the realtime channel
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.realtime_poll_interval_ms)
    }

    /// Toast lifetimes
    pub fn toast_durations(&self) -> ToastDurations {
        ToastDurations {
            error: Duration::from_millis(self.error_toast_ms),
            default: Duration::from_millis(self.toast_ms),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            db_path: "./tomesphere_data/messages.db".to_string(),
            user_id: None,
            realtime_poll_interval_ms: 250,
            error_toast_ms: 5000,
            toast_ms: 4000,
            log_path: "./tomesphere_data/tomesphere-dm.log".to_string(),
            log_filter: "tomesphere_dm=info,warn".to_string(),
        }
    }
}
