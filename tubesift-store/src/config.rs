//! Run configuration.

use crate::error::StoreError;
use crate::persistence;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable consulted when no API key is configured.
pub const API_KEY_ENV: &str = "TUBESIFT_API_KEY";

/// Output sink locations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Path for the JSON report, if any.
    #[serde(default)]
    pub json: Option<PathBuf>,
    /// Path for the CSV export, if any.
    #[serde(default)]
    pub csv: Option<PathBuf>,
}

/// Configuration for one resolution run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Whether to try the authoritative metadata API first.
    #[serde(default)]
    pub use_authoritative_api: bool,
    /// Egress proxy pool, empty for direct connections.
    #[serde(default)]
    pub proxy_pool: Vec<String>,
    /// Credential for the authoritative API. Falls back to the
    /// `TUBESIFT_API_KEY` environment variable when absent.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Output sink locations.
    #[serde(default)]
    pub output: OutputConfig,
    /// Validator cache file path.
    #[serde(default = "persistence::default_cache_path")]
    pub cache_path: PathBuf,
    /// Maximum entries resolved concurrently.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Per-fetch timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_concurrency() -> usize {
    4
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            use_authoritative_api: false,
            proxy_pool: Vec::new(),
            api_key: None,
            output: OutputConfig::default(),
            cache_path: persistence::default_cache_path(),
            concurrency: default_concurrency(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl RunConfig {
    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        persistence::default_config_path()
    }

    /// Loads configuration from a specific path, using defaults when the
    /// file does not exist.
    pub fn load_from(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: RunConfig = serde_json::from_str(&content)?;

        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Saves configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        info!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    /// Resolves the effective API credential, preferring the config value
    /// over the environment variable.
    pub fn effective_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty()))
    }

    /// Validates the configuration before any network activity.
    ///
    /// Requesting the authoritative API without a credential is a fatal
    /// configuration error, not a per-entry failure.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.use_authoritative_api && self.effective_api_key().is_none() {
            return Err(StoreError::Config(format!(
                "Authoritative API requested but no credential configured \
                (set api_key or the {API_KEY_ENV} environment variable)"
            )));
        }
        if self.concurrency == 0 {
            return Err(StoreError::Config("concurrency must be at least 1".into()));
        }
        if self.timeout_secs == 0 {
            return Err(StoreError::Config("timeout_secs must be at least 1".into()));
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RunConfig::default();
        assert!(!config.use_authoritative_api);
        assert!(config.proxy_pool.is_empty());
        assert_eq!(config.concurrency, 4);
        assert_eq!(config.timeout_secs, 120);
    }

    #[test]
    fn test_validate_requires_credential_for_api() {
        let config = RunConfig {
            use_authoritative_api: true,
            api_key: None,
            ..RunConfig::default()
        };
        // Only meaningful when the env var is not already set.
        if std::env::var(API_KEY_ENV).is_err() {
            assert!(matches!(config.validate(), Err(StoreError::Config(_))));
        }

        let with_key = RunConfig {
            use_authoritative_api: true,
            api_key: Some("key".into()),
            ..RunConfig::default()
        };
        assert!(with_key.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_concurrency() {
        let config = RunConfig {
            concurrency: 0,
            ..RunConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let config = RunConfig::load_from(Path::new("/definitely/not/here.json")).unwrap();
        assert_eq!(config.concurrency, 4);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"use_authoritative_api": true, "api_key": "k"}"#).unwrap();

        let config = RunConfig::load_from(&path).unwrap();
        assert!(config.use_authoritative_api);
        assert_eq!(config.api_key.as_deref(), Some("k"));
        assert_eq!(config.concurrency, 4);
        assert_eq!(config.timeout_secs, 120);
    }
}
