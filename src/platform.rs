//! Host platform detection
//!
//! Normalizes the host OS and CPU architecture into the `<os>-<arch>` key
//! used for bundled directories, cache paths and release asset names.

use std::fmt;

/// Name of the runtime binary on non-Windows hosts
pub const BINARY_NAME: &str = "guardian";

/// Canonical operating system family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
    Linux,
    Darwin,
    Win32,
}

impl Os {
    /// Map a raw OS identifier (as in `std::env::consts::OS`).
    ///
    /// Anything that is not Windows or macOS collapses to `Linux`.
    pub fn from_raw(raw: &str) -> Self {
        match raw {
            "windows" | "win32" => Self::Win32,
            "macos" | "darwin" => Self::Darwin,
            _ => Self::Linux,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::Darwin => "darwin",
            Self::Win32 => "win32",
        }
    }

    pub fn is_windows(&self) -> bool {
        matches!(self, Self::Win32)
    }

    /// Suffix appended to executable file names
    pub fn exe_suffix(&self) -> &'static str {
        if self.is_windows() {
            ".exe"
        } else {
            ""
        }
    }
}

/// Canonical CPU architecture; unknown values pass through unchanged
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Arch {
    Amd64,
    I386,
    Arm64,
    Other(String),
}

impl Arch {
    /// Map a raw architecture string through the fixed lookup table
    pub fn from_raw(raw: &str) -> Self {
        match raw {
            "x86_64" | "AMD64" => Self::Amd64,
            "i386" | "i686" | "x86" => Self::I386,
            "arm64" | "aarch64" => Self::Arm64,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Amd64 => "amd64",
            Self::I386 => "386",
            Self::Arm64 => "arm64",
            Self::Other(raw) => raw.as_str(),
        }
    }
}

/// `(os, arch)` pair identifying which runtime binary to use
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlatformKey {
    pub os: Os,
    pub arch: Arch,
}

impl PlatformKey {
    /// Derive the key for the running host. Never fails.
    pub fn detect() -> Self {
        Self::from_raw(std::env::consts::OS, std::env::consts::ARCH)
    }

    pub fn from_raw(os: &str, arch: &str) -> Self {
        Self {
            os: Os::from_raw(os),
            arch: Arch::from_raw(arch),
        }
    }

    /// File name of the runtime binary for this platform
    pub fn binary_name(&self) -> String {
        format!("{}{}", BINARY_NAME, self.os.exe_suffix())
    }
}

impl fmt::Display for PlatformKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.os.as_str(), self.arch.as_str())
    }
}
