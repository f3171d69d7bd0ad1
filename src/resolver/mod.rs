//! Runtime binary resolution
//!
//! Finds a usable `guardian` executable, trying in order:
//! 1. the explicit `GUARDIAN_BIN_PATH` override
//! 2. the binary bundled next to the wrapper (`binaries/<os>-<arch>/`)
//! 3. the command search path
//! 4. the download cache, then each release URL
//!
//! Step 4 is skipped entirely when downloads are disabled.

pub mod download;
pub mod locate;
pub mod probe;

pub use download::Downloader;
pub use probe::is_executable;

use crate::config::ResolverConfig;
use crate::error::{GuardianError, GuardianResult};
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Which fallback step produced a binary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    ExplicitOverride,
    Bundled,
    SystemPath,
    DownloadedCache,
}

impl Origin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExplicitOverride => "explicit-override",
            Self::Bundled => "bundled",
            Self::SystemPath => "system-path",
            Self::DownloadedCache => "downloaded-cache",
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved runtime binary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryLocation {
    pub path: PathBuf,
    pub origin: Origin,
}

impl BinaryLocation {
    fn new(path: PathBuf, origin: Origin) -> Self {
        Self { path, origin }
    }
}

/// Runs the fallback chain for one configuration
pub struct Resolver {
    config: ResolverConfig,
    downloader: Downloader,
}

impl Resolver {
    pub fn new(config: ResolverConfig) -> Self {
        let downloader = Downloader::from_config(&config);
        Self { config, downloader }
    }

    /// Resolve the runtime binary, downloading it if nothing local is usable
    pub fn resolve(&self) -> GuardianResult<BinaryLocation> {
        let location = match self.find_local() {
            Some(location) => location,
            None if self.config.skip_download => {
                debug!("No local guardian binary and downloads are disabled");
                return Err(GuardianError::NotFound);
            }
            None => self.provision()?,
        };

        info!(
            "Using guardian at {} ({})",
            location.path.display(),
            location.origin
        );
        Ok(location)
    }

    /// Steps 1-3: override, bundled, search path
    fn find_local(&self) -> Option<BinaryLocation> {
        if let Some(path) = &self.config.bin_path {
            if is_executable(path) {
                return Some(BinaryLocation::new(path.clone(), Origin::ExplicitOverride));
            }
            warn!(
                "GUARDIAN_BIN_PATH {} is not an executable file, ignoring",
                path.display()
            );
        }

        let platform = &self.config.platform;
        for candidate in locate::local_candidates(self.config.bundle_root.as_deref(), platform) {
            if is_executable(&candidate) {
                return Some(BinaryLocation::new(candidate, Origin::Bundled));
            }
            debug!("No bundled binary at {}", candidate.display());
        }

        match locate::search_path_candidate(self.config.search_path.as_deref(), platform) {
            Some(path) if is_executable(&path) => {
                Some(BinaryLocation::new(path, Origin::SystemPath))
            }
            _ => {
                debug!("guardian not found on the search path");
                None
            }
        }
    }

    /// Step 5: reuse the cache, else try each download URL in order
    fn provision(&self) -> GuardianResult<BinaryLocation> {
        let platform = &self.config.platform;
        let target = locate::cache_path(&self.config.cache_root, platform);

        if is_executable(&target) {
            debug!("Reusing cached binary {}", target.display());
            return Ok(BinaryLocation::new(target, Origin::DownloadedCache));
        }

        let urls = locate::download_urls(
            self.config.binary_url.as_deref(),
            &self.config.release,
            platform,
        );
        let attempts = urls.len();

        let mut last_error = None;
        for url in &urls {
            match self.downloader.fetch(url, &target) {
                Ok(path) => return Ok(BinaryLocation::new(path, Origin::DownloadedCache)),
                Err(e) => {
                    warn!("Download from {} failed: {}", url, e);
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(source) => Err(GuardianError::Resolution {
                attempts,
                source: Box::new(source),
            }),
            None => Err(GuardianError::NotFound),
        }
    }
}

/// Resolve the runtime binary path using settings from the environment
pub fn resolve_binary_path() -> GuardianResult<PathBuf> {
    Resolver::new(ResolverConfig::from_env())
        .resolve()
        .map(|location| location.path)
}
