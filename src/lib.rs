//! gpu-guardian - runtime binary bootstrap
//!
//! Makes sure the platform-specific `guardian` executable is available
//! (explicit path, bundled copy, search path, cache or download) and
//! provides a small client for the daemon's HTTP control API.

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod platform;
pub mod resolver;

pub use client::GuardianClient;
pub use error::{GuardianError, GuardianResult};
pub use platform::PlatformKey;
pub use resolver::{resolve_binary_path, BinaryLocation, Origin, Resolver};
