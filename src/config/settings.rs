//! Runtime settings handed to the resolver and the daemon client
//!
//! Built once at the process boundary: built-in defaults, then the TOML
//! file, then environment variables. Nothing below this layer reads the
//! process environment.

use super::schema::{DaemonSection, ResolverSection, DEFAULT_DAEMON_BASE_URL};
use super::ConfigManager;
use crate::platform::PlatformKey;
use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_BIN_PATH: &str = "GUARDIAN_BIN_PATH";
pub const ENV_SKIP_DOWNLOAD: &str = "GUARDIAN_SKIP_DOWNLOAD";
pub const ENV_BINARY_URL: &str = "GUARDIAN_BINARY_URL";
pub const ENV_RELEASE_VERSION: &str = "GUARDIAN_RELEASE_VERSION";
pub const ENV_BINARY_SHA256: &str = "GUARDIAN_BINARY_SHA256";
pub const ENV_DAEMON_BASE_URL: &str = "GUARDIAN_DAEMON_BASE_URL";
pub const ENV_DAEMON_API_TOKEN: &str = "GUARDIAN_DAEMON_API_TOKEN";

/// Release tag baked into computed download URLs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseId(String);

impl ReleaseId {
    /// Parse a release tag.
    ///
    /// Semver versions are normalized to `v<version>`; other tags are kept
    /// verbatim. Blank input yields `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        let bare = raw.strip_prefix('v').unwrap_or(raw);
        match semver::Version::parse(bare) {
            Ok(version) => Some(Self(format!("v{}", version))),
            Err(_) => Some(Self(raw.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ReleaseId {
    fn default() -> Self {
        Self(format!("v{}", env!("CARGO_PKG_VERSION")))
    }
}

impl fmt::Display for ReleaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Inputs to a single binary resolution
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Explicit binary path override
    pub bin_path: Option<PathBuf>,
    /// Fail instead of downloading when nothing local is found
    pub skip_download: bool,
    /// Literal URL replacing the computed download URL list
    pub binary_url: Option<String>,
    pub release: ReleaseId,
    /// Directory holding `binaries/<os>-<arch>/`
    pub bundle_root: Option<PathBuf>,
    pub cache_root: PathBuf,
    /// Command search path; `None` disables the search-path step
    pub search_path: Option<OsString>,
    pub platform: PlatformKey,
    pub download_timeout: Duration,
    pub max_redirects: u32,
    /// Expected SHA-256 of downloaded bytes, lowercase hex
    pub sha256: Option<String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            bin_path: None,
            skip_download: false,
            binary_url: None,
            release: ReleaseId::default(),
            bundle_root: std::env::current_exe()
                .ok()
                .and_then(|exe| exe.parent().map(|p| p.to_path_buf())),
            cache_root: ConfigManager::cache_root(),
            search_path: std::env::var_os("PATH"),
            platform: PlatformKey::detect(),
            download_timeout: Duration::from_secs(300),
            max_redirects: 5,
            sha256: None,
        }
    }
}

impl ResolverConfig {
    /// Host defaults overlaid with the process environment
    pub fn from_env() -> Self {
        Self::default().with_env(|key| std::env::var(key).ok())
    }

    /// Overlay values from the `[resolver]` section of the config file
    pub fn with_file(mut self, section: &ResolverSection) -> Self {
        if let Some(path) = &section.bin_path {
            self.bin_path = Some(expand_home(&path.to_string_lossy()));
        }
        if let Some(url) = non_empty(section.binary_url.as_deref()) {
            self.binary_url = Some(url);
        }
        if let Some(release) = section.release.as_deref().and_then(ReleaseId::parse) {
            self.release = release;
        }
        if let Some(dir) = &section.cache_dir {
            self.cache_root = dir.clone();
        }
        if let Some(sha) = non_empty(section.sha256.as_deref()) {
            self.sha256 = Some(sha.to_ascii_lowercase());
        }
        self.skip_download = section.skip_download;
        self.download_timeout = Duration::from_secs(section.download_timeout_secs);
        self.max_redirects = section.max_redirects;
        self
    }

    /// Overlay `GUARDIAN_*` variables obtained through `lookup`
    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = non_empty(lookup(ENV_BIN_PATH).as_deref()) {
            self.bin_path = Some(expand_home(&path));
        }
        if let Some(flag) = lookup(ENV_SKIP_DOWNLOAD) {
            self.skip_download = flag == "1";
        }
        if let Some(url) = non_empty(lookup(ENV_BINARY_URL).as_deref()) {
            self.binary_url = Some(url);
        }
        if let Some(release) = lookup(ENV_RELEASE_VERSION)
            .as_deref()
            .and_then(ReleaseId::parse)
        {
            self.release = release;
        }
        if let Some(sha) = non_empty(lookup(ENV_BINARY_SHA256).as_deref()) {
            self.sha256 = Some(sha.to_ascii_lowercase());
        }
        self
    }
}

/// Settings for the daemon HTTP client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaemonConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub api_token: Option<String>,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_DAEMON_BASE_URL.to_string(),
            timeout: Duration::from_secs(5),
            api_token: None,
        }
    }
}

impl DaemonConfig {
    pub fn from_env() -> Self {
        Self::default().with_env(|key| std::env::var(key).ok())
    }

    pub fn with_file(mut self, section: &DaemonSection) -> Self {
        if let Some(url) = non_empty(Some(section.base_url.as_str())) {
            self.base_url = url;
        }
        self.timeout = Duration::from_secs(section.timeout_secs);
        if let Some(token) = non_empty(section.api_token.as_deref()) {
            self.api_token = Some(token);
        }
        self
    }

    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = non_empty(lookup(ENV_DAEMON_BASE_URL).as_deref()) {
            self.base_url = url;
        }
        if let Some(token) = non_empty(lookup(ENV_DAEMON_API_TOKEN).as_deref()) {
            self.api_token = Some(token);
        }
        self
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Expand a leading `~` to the user's home directory
fn expand_home(raw: &str) -> PathBuf {
    if raw == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(rest) = raw.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(raw)
}
