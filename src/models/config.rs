//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP fetch behavior settings
    #[serde(default)]
    pub fetcher: FetcherConfig,

    /// Batch synchronization settings
    #[serde(default)]
    pub sync: SyncConfig,

    /// Persistence settings
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.fetcher.user_agent.trim().is_empty() {
            return Err(AppError::config("fetcher.user_agent is empty"));
        }
        if self.fetcher.timeout_secs == 0 {
            return Err(AppError::config("fetcher.timeout_secs must be > 0"));
        }
        if self.sync.max_concurrent == 0 {
            return Err(AppError::config("sync.max_concurrent must be > 0"));
        }
        if self.storage.data_dir.trim().is_empty() {
            return Err(AppError::config("storage.data_dir is empty"));
        }
        Ok(())
    }
}

/// HTTP client and redirect policy settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Whether to follow redirects at all
    #[serde(default = "defaults::follow")]
    pub follow: bool,

    /// Maximum redirects to follow
    #[serde(default = "defaults::depth")]
    pub depth: u32,

    /// Whether a permanent redirect rewrites the persisted URL
    #[serde(default = "defaults::update")]
    pub update: bool,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            follow: defaults::follow(),
            depth: defaults::depth(),
            update: defaults::update(),
        }
    }
}

/// Batch synchronization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Maximum feeds synchronized concurrently
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_concurrent: defaults::max_concurrent(),
        }
    }
}

/// Persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the registry files
    #[serde(default = "defaults::data_dir")]
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: defaults::data_dir(),
        }
    }
}

mod defaults {
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; mensasync/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn follow() -> bool {
        true
    }
    pub fn depth() -> u32 {
        2
    }
    pub fn update() -> bool {
        true
    }
    pub fn max_concurrent() -> usize {
        5
    }
    pub fn data_dir() -> String {
        "data/store".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_user_agent() {
        let mut config = Config::default();
        config.fetcher.user_agent = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_concurrency() {
        let mut config = Config::default();
        config.sync.max_concurrent = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn default_redirect_policy() {
        let config = FetcherConfig::default();
        assert!(config.follow);
        assert!(config.update);
        assert_eq!(config.depth, 2);
    }

    #[test]
    fn parses_partial_toml() {
        let config: Config = toml::from_str("[fetcher]\ndepth = 5\n").unwrap();
        assert_eq!(config.fetcher.depth, 5);
        assert_eq!(config.sync.max_concurrent, 5);
    }
}
