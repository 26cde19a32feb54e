//! Application configuration.
//!
//! The sync interval is fixed (see `SYNC_INTERVAL_SECS`); only the remote
//! endpoint and storage location are configurable.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Remote endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Endpoint used for both fetch (GET) and push (POST).
    #[serde(default = "default_url")]
    pub url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Whether the daemon syncs at all.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            timeout_secs: default_timeout(),
            enabled: default_enabled(),
        }
    }
}

fn default_url() -> String {
    "https://jsonplaceholder.typicode.com/posts".to_string()
}

const fn default_timeout() -> u64 {
    10
}

const fn default_enabled() -> bool {
    true
}

/// Path configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathConfig {
    /// Base data directory.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

/// Complete application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub remote: RemoteConfig,

    #[serde(default)]
    pub paths: PathConfig,
}

impl AppConfig {
    /// Get the data directory, using default if not configured.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.paths
            .data_dir
            .clone()
            .unwrap_or_else(Self::default_data_dir)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".quote-sync")
    }

    /// Get the storage database path.
    #[must_use]
    pub fn storage_db_path(&self) -> PathBuf {
        self.data_dir().join("quotes.db")
    }

    /// Get the default config file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        Self::default_data_dir().join("config.toml")
    }

    /// Default export file inside the data directory.
    #[must_use]
    pub fn export_path(&self) -> PathBuf {
        self.data_dir().join("quotes.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert!(config.remote.enabled);
        assert_eq!(config.remote.timeout_secs, 10);
        assert!(config.remote.url.ends_with("/posts"));
    }

    #[test]
    fn test_custom_data_dir() {
        let config = AppConfig {
            paths: PathConfig {
                data_dir: Some(PathBuf::from("/tmp/qs")),
            },
            ..Default::default()
        };
        assert_eq!(config.storage_db_path(), PathBuf::from("/tmp/qs/quotes.db"));
        assert_eq!(config.export_path(), PathBuf::from("/tmp/qs/quotes.json"));
    }
}
