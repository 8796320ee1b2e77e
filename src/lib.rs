//! TomeSphere direct messages
//!
//! This library provides the two-party direct message view used by the
//! TomeSphere reading platform: history loading, live inbound delivery and
//! optimistic sends reconciled against a durable message store.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod config;
pub mod conversation;
pub mod models;
pub mod notify;
pub mod tui;
pub mod view;

#[cfg(test)]
mod tests;

use tracing_subscriber::{fmt, EnvFilter};

/// Result type alias for TomeSphere DM operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for TomeSphere DM operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Storage operation error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Authentication error
    #[error("Auth error: {0}")]
    Auth(String),

    /// Requested row does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Realtime subscription error
    #[error("Realtime error: {0}")]
    Realtime(String),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// General I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// SQLite database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

const DEFAULT_LOG_FILTER: &str = "tomesphere_dm=info,warn";

fn env_filter(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}

/// Initialize logging to stderr
pub fn init() {
    fmt().with_env_filter(env_filter(DEFAULT_LOG_FILTER)).init();
}

/// Initialize logging into a file
///
/// Used by the terminal client, where writing to stderr would corrupt the
/// alternate screen. `RUST_LOG` takes precedence over `filter`.
pub fn init_with_writer(file: std::fs::File, filter: &str) {
    fmt()
        .with_env_filter(env_filter(filter))
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .init();
}
