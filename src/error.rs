//! Error types for gpu-guardian
//!
//! All modules use `GuardianResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for gpu-guardian operations
pub type GuardianResult<T> = Result<T, GuardianError>;

/// All errors that can occur while provisioning or talking to guardian
#[derive(Error, Debug)]
pub enum GuardianError {
    // Download errors
    #[error("binary URL must use http or https: {url}")]
    InvalidScheme { url: String },

    #[error("redirect without destination: {url}")]
    RedirectWithoutLocation { url: String },

    #[error("too many redirects (limit {limit}) while fetching {url}")]
    TooManyRedirects { url: String, limit: u32 },

    #[error("binary download failed ({status}): {url}")]
    DownloadStatus { url: String, status: u16 },

    #[error("binary download failed: {url}")]
    DownloadTransport {
        url: String,
        #[source]
        source: ureq::Error,
    },

    #[error("binary download returned an empty body: {url}")]
    EmptyDownload { url: String },

    #[error("checksum mismatch for {url}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        url: String,
        expected: String,
        actual: String,
    },

    // Resolution errors
    #[error("GUARDIAN_BIN_PATH was not set and no bundled or local binary is available")]
    NotFound,

    #[error("unable to resolve guardian binary after {attempts} download attempt(s): {source}")]
    Resolution {
        attempts: usize,
        #[source]
        source: Box<GuardianError>,
    },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    // Daemon client errors
    #[error("{0}")]
    Client(String),

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Process errors
    #[error("Command failed: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GuardianError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::NotFound => Some(
                "Set GUARDIAN_BIN_PATH to a guardian executable, or unset GUARDIAN_SKIP_DOWNLOAD",
            ),
            Self::Resolution { .. } => {
                Some("Set GUARDIAN_BINARY_URL to a reachable release asset, or GUARDIAN_BIN_PATH")
            }
            Self::ChecksumMismatch { .. } => Some("Check GUARDIAN_BINARY_SHA256 against the release"),
            _ => None,
        }
    }
}
