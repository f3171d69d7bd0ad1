//! Command-line wrapper: run the resolved guardian binary

pub mod args;

pub use args::Cli;

use crate::error::{GuardianError, GuardianResult};
use std::ffi::OsString;
use std::path::Path;
use std::process::{ExitCode, ExitStatus, Stdio};
use tokio::process::Command;
use tracing::debug;

/// Run `binary` with `args`, inheriting stdio and environment.
///
/// Returns the child's exit code. Interrupts are left to the child; the
/// wrapper keeps waiting until it exits.
pub async fn forward(binary: &Path, args: &[OsString]) -> GuardianResult<i32> {
    debug!("Executing: {} {:?}", binary.display(), args);

    let mut child = Command::new(binary)
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|e| GuardianError::command_failed(binary.display().to_string(), e))?;

    loop {
        tokio::select! {
            status = child.wait() => {
                let status = status
                    .map_err(|e| GuardianError::command_failed(binary.display().to_string(), e))?;
                return Ok(status_code(status));
            }
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    debug!("Cannot listen for interrupts: {}", e);
                    let status = child
                        .wait()
                        .await
                        .map_err(|e| GuardianError::command_failed(binary.display().to_string(), e))?;
                    return Ok(status_code(status));
                }
                debug!("Interrupt received, waiting for guardian to exit");
            }
        }
    }
}

/// Exit code for a finished child; signals map to `128 + signo` on Unix
fn status_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}

/// Convert a child exit code into the wrapper's own exit code
pub fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(exit_byte(code))
}

fn exit_byte(code: i32) -> u8 {
    u8::try_from(code).unwrap_or(1)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    fn script(dir: &Path, body: &str) -> std::path::PathBuf {
        let path = dir.join("guardian");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[tokio::test]
    async fn returns_child_exit_code() {
        let temp = TempDir::new().unwrap();
        let bin = script(temp.path(), "exit 7");

        assert_eq!(forward(&bin, &[]).await.unwrap(), 7);
    }

    #[tokio::test]
    async fn passes_arguments() {
        let temp = TempDir::new().unwrap();
        let bin = script(temp.path(), "[ \"$1\" = status ] && [ \"$2\" = \"--json\" ]");

        let args = vec![OsString::from("status"), OsString::from("--json")];
        assert_eq!(forward(&bin, &args).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn spawn_failure_is_reported() {
        let temp = TempDir::new().unwrap();
        let err = forward(&temp.path().join("missing"), &[]).await.unwrap_err();
        assert!(matches!(err, GuardianError::CommandFailed { .. }));
    }

    #[test]
    fn exit_code_clamps() {
        assert_eq!(exit_byte(0), 0);
        assert_eq!(exit_byte(42), 42);
        assert_eq!(exit_byte(300), 1);
        assert_eq!(exit_byte(-1), 1);
    }
}
