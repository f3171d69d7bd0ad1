//! Candidate locations for the runtime binary
//!
//! Local candidates are filesystem paths tried before any network access;
//! remote candidates are release asset URLs tried in order.

use crate::config::ReleaseId;
use crate::platform::{PlatformKey, BINARY_NAME};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Release asset host; assets live at `<host>/<tag>/guardian-<os>-<arch>[.exe]`
pub const RELEASE_DOWNLOAD_ROOT: &str =
    "https://github.com/elhamdev/gpu-guardian/releases/download";

/// Bundled binaries shipped next to the wrapper, in priority order.
///
/// Currently a single `<root>/binaries/<os>-<arch>/<binary>` entry.
pub fn local_candidates(bundle_root: Option<&Path>, platform: &PlatformKey) -> Vec<PathBuf> {
    bundle_root
        .map(|root| {
            vec![root
                .join("binaries")
                .join(platform.to_string())
                .join(platform.binary_name())]
        })
        .unwrap_or_default()
}

/// Look the binary up on a command search path (`PATH` syntax)
pub fn search_path_candidate(search_path: Option<&OsStr>, platform: &PlatformKey) -> Option<PathBuf> {
    let paths = search_path.filter(|p| !p.is_empty())?;
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let name = if platform.os.is_windows() {
        platform.binary_name()
    } else {
        BINARY_NAME.to_string()
    };
    which::which_in(name, Some(paths), cwd).ok()
}

/// Download URLs in the order they should be tried.
///
/// An explicit override URL replaces the computed list entirely.
pub fn download_urls(
    override_url: Option<&str>,
    release: &ReleaseId,
    platform: &PlatformKey,
) -> Vec<String> {
    if let Some(url) = override_url {
        return vec![url.to_string()];
    }

    let root = format!("{}/{}", RELEASE_DOWNLOAD_ROOT, release);
    [platform.os.exe_suffix()]
        .iter()
        .map(|ext| format!("{}/{}-{}{}", root, BINARY_NAME, platform, ext))
        .collect()
}

/// Cache location for a downloaded binary: `<root>/<os>-<arch>/<binary>`
pub fn cache_path(cache_root: &Path, platform: &PlatformKey) -> PathBuf {
    cache_root
        .join(platform.to_string())
        .join(platform.binary_name())
}
