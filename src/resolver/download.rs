//! Runtime binary download
//!
//! Redirects are followed by hand so every hop is visible in the logs and
//! bounded by `max_redirects`. The body is streamed into a sibling temp file
//! and renamed onto the destination, so concurrent readers never observe a
//! partially written executable.

use crate::config::ResolverConfig;
use crate::error::{GuardianError, GuardianResult};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};
use ureq::Agent;
use url::Url;
use uuid::Uuid;

const USER_AGENT: &str = concat!("gpu-guardian/", env!("CARGO_PKG_VERSION"));

/// Blocking HTTP(S) downloader for release assets
pub struct Downloader {
    agent: Agent,
    max_redirects: u32,
    sha256: Option<String>,
}

impl Downloader {
    /// Create a downloader with a per-request timeout and redirect bound.
    ///
    /// A zero timeout disables the limit.
    pub fn new(timeout: Duration, max_redirects: u32) -> Self {
        let config = Agent::config_builder()
            .max_redirects(0)
            .max_redirects_will_error(false)
            .http_status_as_error(false)
            .timeout_global((!timeout.is_zero()).then_some(timeout))
            .build();

        Self {
            agent: Agent::new_with_config(config),
            max_redirects,
            sha256: None,
        }
    }

    pub fn from_config(config: &ResolverConfig) -> Self {
        Self::new(config.download_timeout, config.max_redirects).with_sha256(config.sha256.clone())
    }

    /// Require downloaded bytes to hash to `sha256` (hex)
    pub fn with_sha256(mut self, sha256: Option<String>) -> Self {
        self.sha256 = sha256.map(|s| s.to_ascii_lowercase());
        self
    }

    /// Fetch `url` into `dest`, returning `dest` on success
    pub fn fetch(&self, url: &str, dest: &Path) -> GuardianResult<PathBuf> {
        let mut current = Url::parse(url).map_err(|_| GuardianError::InvalidScheme {
            url: url.to_string(),
        })?;
        let mut hops = 0;

        loop {
            if !matches!(current.scheme(), "http" | "https") {
                return Err(GuardianError::InvalidScheme {
                    url: current.into(),
                });
            }

            debug!("GET {}", current);
            let mut response = self
                .agent
                .get(current.as_str())
                .header("User-Agent", USER_AGENT)
                .call()
                .map_err(|e| GuardianError::DownloadTransport {
                    url: current.to_string(),
                    source: e,
                })?;

            let status = response.status().as_u16();
            if is_redirect(status) {
                let location = response
                    .headers()
                    .get("location")
                    .and_then(|v| v.to_str().ok())
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .ok_or_else(|| GuardianError::RedirectWithoutLocation {
                        url: current.to_string(),
                    })?;

                if hops >= self.max_redirects {
                    return Err(GuardianError::TooManyRedirects {
                        url: url.to_string(),
                        limit: self.max_redirects,
                    });
                }
                hops += 1;

                let next = join_location(&current, location)?;
                debug!("Redirect {} -> {}", current, next);
                current = next;
                continue;
            }

            if status != 200 {
                return Err(GuardianError::DownloadStatus {
                    url: current.into(),
                    status,
                });
            }

            info!("Downloading guardian from {}", current);
            let mut body = response.body_mut().as_reader();
            self.persist(current.as_str(), &mut body, dest)?;
            info!("Saved guardian to {}", dest.display());
            return Ok(dest.to_path_buf());
        }
    }

    /// Stream `body` into a temp file next to `dest`, then rename it over `dest`
    fn persist(&self, url: &str, body: &mut dyn Read, dest: &Path) -> GuardianResult<()> {
        let parent = dest
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent)
            .map_err(|e| GuardianError::io(format!("creating directory {}", parent.display()), e))?;

        let file_name = dest
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "guardian".to_string());
        let tmp = parent.join(format!(".{}.{}.tmp", file_name, Uuid::new_v4().simple()));

        let result = self.write_temp(url, body, &tmp).and_then(|()| {
            fs::rename(&tmp, dest).map_err(|e| {
                GuardianError::io(format!("moving download into {}", dest.display()), e)
            })
        });
        if result.is_err() {
            let _ = fs::remove_file(&tmp);
        }
        result
    }

    fn write_temp(&self, url: &str, body: &mut dyn Read, tmp: &Path) -> GuardianResult<()> {
        let mut file = File::create(tmp)
            .map_err(|e| GuardianError::io(format!("creating {}", tmp.display()), e))?;

        let mut hasher = Sha256::new();
        let mut written: u64 = 0;
        let mut buf = vec![0u8; 64 * 1024];
        loop {
            let n = body
                .read(&mut buf)
                .map_err(|e| GuardianError::io(format!("reading response body from {}", url), e))?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
            file.write_all(&buf[..n])
                .map_err(|e| GuardianError::io(format!("writing {}", tmp.display()), e))?;
            written += n as u64;
        }

        if written == 0 {
            return Err(GuardianError::EmptyDownload {
                url: url.to_string(),
            });
        }

        if let Some(expected) = &self.sha256 {
            let actual = hex::encode(hasher.finalize());
            if &actual != expected {
                return Err(GuardianError::ChecksumMismatch {
                    url: url.to_string(),
                    expected: expected.clone(),
                    actual,
                });
            }
        }

        file.sync_all()
            .map_err(|e| GuardianError::io(format!("syncing {}", tmp.display()), e))?;
        drop(file);

        make_executable(tmp)
    }
}

/// Add execute permission for owner, group and other
#[cfg(unix)]
fn make_executable(path: &Path) -> GuardianResult<()> {
    use std::os::unix::fs::PermissionsExt;

    let mode = fs::metadata(path)
        .map_err(|e| GuardianError::io(format!("reading permissions of {}", path.display()), e))?
        .permissions()
        .mode();
    fs::set_permissions(path, fs::Permissions::from_mode(mode | 0o111))
        .map_err(|e| GuardianError::io(format!("setting permissions on {}", path.display()), e))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> GuardianResult<()> {
    Ok(())
}

fn is_redirect(status: u16) -> bool {
    matches!(status, 301 | 302 | 303 | 307 | 308)
}

/// Resolve a `Location` header value against the URL that produced it
fn join_location(base: &Url, location: &str) -> GuardianResult<Url> {
    base.join(location)
        .map_err(|_| GuardianError::InvalidScheme {
            url: location.to_string(),
        })
}
