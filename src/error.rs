// src/error.rs

//! Unified error handling for the synchronization engine.

use thiserror::Error;

/// Result type alias for synchronization operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
///
/// Feed-level failures (unreachable server, rejected index document) are not
/// represented here; they are recorded as audit messages and surface as a
/// `success = false` outcome. `AppError` covers infrastructure faults only.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client construction failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization failed
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Persistence layer error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Synchronization error
    #[error("Sync error for {context}: {message}")]
    Sync { context: String, message: String },
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Create a sync error with context.
    pub fn sync(context: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Sync {
            context: context.into(),
            message: message.to_string(),
        }
    }
}
