//! Executability checks for candidate binaries

use std::path::Path;

/// Check whether `path` names a file the current user may execute.
///
/// Every filesystem error folds into `false`. On Windows there is no execute
/// bit, so any regular file counts.
pub fn is_executable(path: &Path) -> bool {
    match std::fs::metadata(path) {
        Ok(metadata) if metadata.is_file() => can_execute(path),
        _ => false,
    }
}

#[cfg(unix)]
fn can_execute(path: &Path) -> bool {
    use nix::unistd::{access, AccessFlags};

    access(path, AccessFlags::X_OK).is_ok()
}

#[cfg(not(unix))]
fn can_execute(_path: &Path) -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_not_executable() {
        let temp = TempDir::new().unwrap();
        assert!(!is_executable(&temp.path().join("guardian")));
    }

    #[test]
    fn directory_is_not_executable() {
        let temp = TempDir::new().unwrap();
        assert!(!is_executable(temp.path()));
    }

    #[cfg(unix)]
    #[test]
    fn execute_bit_is_required() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let path = temp.path().join("guardian");
        std::fs::write(&path, b"#!/bin/sh\nexit 0\n").unwrap();

        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();
        // root bypasses permission bits only when some execute bit is set
        assert!(!is_executable(&path));

        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        assert!(is_executable(&path));
    }

    #[cfg(windows)]
    #[test]
    fn any_regular_file_is_executable_on_windows() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("guardian.exe");
        std::fs::write(&path, b"MZ").unwrap();
        assert!(is_executable(&path));
    }
}
