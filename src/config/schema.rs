//! Configuration schema for gpu-guardian
//!
//! Configuration is stored at `~/.config/gpu-guardian/config.toml`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default daemon control API endpoint
pub const DEFAULT_DAEMON_BASE_URL: &str = "http://127.0.0.1:8090/v1";

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Runtime binary resolution settings
    pub resolver: ResolverSection,

    /// Daemon client settings
    pub daemon: DaemonSection,
}

/// Runtime binary resolution settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverSection {
    /// Explicit path to a guardian executable
    pub bin_path: Option<PathBuf>,

    /// Literal download URL replacing the computed release URL
    pub binary_url: Option<String>,

    /// Release tag used in computed download URLs
    pub release: Option<String>,

    /// Root of the downloaded binary cache
    pub cache_dir: Option<PathBuf>,

    /// Never download; fail when no local binary is found
    pub skip_download: bool,

    /// Per-request download timeout in seconds; 0 disables it
    pub download_timeout_secs: u64,

    /// Maximum redirect hops per download
    pub max_redirects: u32,

    /// Expected SHA-256 of the downloaded binary (hex)
    pub sha256: Option<String>,
}

impl Default for ResolverSection {
    fn default() -> Self {
        Self {
            bin_path: None,
            binary_url: None,
            release: None,
            cache_dir: None,
            skip_download: false,
            download_timeout_secs: 300,
            max_redirects: 5,
            sha256: None,
        }
    }
}

/// Daemon client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonSection {
    /// Base URL of the daemon control API
    pub base_url: String,

    /// Request timeout in seconds; 0 disables it
    pub timeout_secs: u64,

    /// Bearer token sent with every request
    pub api_token: Option<String>,
}

impl Default for DaemonSection {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_DAEMON_BASE_URL.to_string(),
            timeout_secs: 5,
            api_token: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("[resolver]"));
        assert!(toml.contains("[daemon]"));
        assert!(toml.contains("max_redirects = 5"));
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml = r#"
[resolver]
release = "v0.2.0"

[daemon]
api_token = "secret"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.resolver.release.as_deref(), Some("v0.2.0"));
        assert_eq!(config.resolver.download_timeout_secs, 300);
        assert!(!config.resolver.skip_download);
        assert_eq!(config.daemon.base_url, DEFAULT_DAEMON_BASE_URL);
        assert_eq!(config.daemon.api_token.as_deref(), Some("secret"));
    }
}
