//! CLI argument definitions using clap derive

use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

/// gpu-guardian - provisions the guardian runtime binary and runs it
///
/// Every argument is forwarded verbatim to `guardian`, including `--help`
/// and `--version`.
#[derive(Parser, Debug)]
#[command(name = "gpu-guardian")]
#[command(disable_help_flag = true, disable_version_flag = true)]
pub struct Cli {
    /// Configuration file path
    #[arg(long = "guardian-config", env = "GUARDIAN_CONFIG", hide = true)]
    pub config: Option<PathBuf>,

    /// Arguments passed through to the guardian binary
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<OsString>,
}
