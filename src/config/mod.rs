//! Configuration management for gpu-guardian
//!
//! The TOML file is optional. Environment variables are read once at the
//! process boundary and layered on top (see [`settings`]).

pub mod schema;
pub mod settings;

pub use schema::Config;
pub use settings::{DaemonConfig, ReleaseId, ResolverConfig};

use crate::error::{GuardianError, GuardianResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Product directory name used under the user config and cache roots
pub const PRODUCT: &str = "gpu-guardian";

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(PRODUCT)
            .join("config.toml")
    }

    /// Get the root directory for downloaded binaries
    pub fn cache_root() -> PathBuf {
        dirs::cache_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join(".cache")))
            .unwrap_or_else(|| PathBuf::from("."))
            .join(PRODUCT)
            .join("bin")
    }

    /// Load configuration, using defaults if the file does not exist
    pub async fn load(&self) -> GuardianResult<Config> {
        if !self.config_path.exists() {
            debug!("Config file not found, using defaults");
            return Ok(Config::default());
        }

        self.load_from_file(&self.config_path).await
    }

    /// Load configuration from a specific file
    pub async fn load_from_file(&self, path: &Path) -> GuardianResult<Config> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| GuardianError::io(format!("reading config from {}", path.display()), e))?;

        toml::from_str(&content).map_err(|e| GuardianError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_default_when_missing() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nonexistent.toml");
        let manager = ConfigManager::with_path(path);

        let config = manager.load().await.unwrap();
        assert_eq!(config.resolver.max_redirects, 5);
        assert_eq!(config.daemon.base_url, schema::DEFAULT_DAEMON_BASE_URL);
    }

    #[tokio::test]
    async fn load_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(
            &path,
            "[resolver]\nbinary_url = \"http://mirror.local/guardian\"\nmax_redirects = 2\n",
        )
        .unwrap();

        let config = ConfigManager::with_path(path).load().await.unwrap();
        assert_eq!(
            config.resolver.binary_url.as_deref(),
            Some("http://mirror.local/guardian")
        );
        assert_eq!(config.resolver.max_redirects, 2);
    }

    #[tokio::test]
    async fn invalid_toml_reports_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[resolver\nbroken").unwrap();

        let err = ConfigManager::with_path(path.clone()).load().await.unwrap_err();
        match err {
            GuardianError::ConfigInvalid { path: p, .. } => assert_eq!(p, path),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn cache_root_is_product_scoped() {
        let root = ConfigManager::cache_root();
        assert!(root.ends_with("gpu-guardian/bin"));
    }
}
