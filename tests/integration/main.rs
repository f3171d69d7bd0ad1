//! Integration tests for gpu-guardian

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    const GUARDIAN_VARS: &[&str] = &[
        "GUARDIAN_BIN_PATH",
        "GUARDIAN_SKIP_DOWNLOAD",
        "GUARDIAN_BINARY_URL",
        "GUARDIAN_RELEASE_VERSION",
        "GUARDIAN_BINARY_SHA256",
        "GUARDIAN_CONFIG",
        "GUARDIAN_LOG",
    ];

    /// Wrapper command isolated from the host's guardian settings
    fn wrapper(home: &Path) -> Command {
        let mut cmd = cargo_bin_cmd!("gpu-guardian");
        for var in GUARDIAN_VARS {
            cmd.env_remove(var);
        }
        cmd.env("GUARDIAN_CONFIG", home.join("missing.toml"))
            .env("PATH", home.join("empty-path"));
        cmd
    }

    #[cfg(unix)]
    fn fake_guardian(dir: &Path, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        std::fs::create_dir_all(dir).unwrap();
        let path = dir.join("guardian");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[test]
    fn forwards_arguments_to_explicit_binary() {
        let temp = TempDir::new().unwrap();
        let bin = fake_guardian(&temp.path().join("x"), "echo \"guardian $*\"");

        wrapper(temp.path())
            .env("GUARDIAN_BIN_PATH", &bin)
            .env("GUARDIAN_SKIP_DOWNLOAD", "1")
            .args(["run", "--command", "python gen.py"])
            .assert()
            .success()
            .stdout(predicate::str::contains("guardian run --command python gen.py"));
    }

    #[cfg(unix)]
    #[test]
    fn help_is_forwarded() {
        let temp = TempDir::new().unwrap();
        let bin = fake_guardian(&temp.path().join("x"), "echo \"guardian $*\"");

        wrapper(temp.path())
            .env("GUARDIAN_BIN_PATH", &bin)
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("guardian --help"));
    }

    #[cfg(unix)]
    #[test]
    fn propagates_exit_code() {
        let temp = TempDir::new().unwrap();
        let bin = fake_guardian(&temp.path().join("x"), "exit 3");

        wrapper(temp.path())
            .env("GUARDIAN_BIN_PATH", &bin)
            .assert()
            .code(3);
    }

    #[cfg(unix)]
    #[test]
    fn child_inherits_environment() {
        let temp = TempDir::new().unwrap();
        let bin = fake_guardian(&temp.path().join("x"), "echo \"token=$GUARDIAN_TEST_TOKEN\"");

        wrapper(temp.path())
            .env("GUARDIAN_BIN_PATH", &bin)
            .env("GUARDIAN_TEST_TOKEN", "abc123")
            .assert()
            .success()
            .stdout(predicate::str::contains("token=abc123"));
    }

    #[cfg(unix)]
    #[test]
    fn finds_binary_on_search_path() {
        let temp = TempDir::new().unwrap();
        let bin_dir = temp.path().join("usr-local-bin");
        fake_guardian(&bin_dir, "echo from-path");

        wrapper(temp.path())
            .env("PATH", &bin_dir)
            .env("GUARDIAN_SKIP_DOWNLOAD", "1")
            .assert()
            .success()
            .stdout(predicate::str::contains("from-path"));
    }

    #[test]
    fn offline_without_binary_fails() {
        let temp = TempDir::new().unwrap();

        wrapper(temp.path())
            .env("GUARDIAN_SKIP_DOWNLOAD", "1")
            .arg("status")
            .assert()
            .failure()
            .stderr(predicate::str::contains("no bundled or local binary"))
            .stderr(predicate::str::contains("Hint:"));
    }

    #[test]
    fn invalid_config_fails() {
        let temp = TempDir::new().unwrap();
        let config = temp.path().join("config.toml");
        std::fs::write(&config, "[resolver\n").unwrap();

        wrapper(temp.path())
            .env("GUARDIAN_CONFIG", &config)
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"));
    }

    #[cfg(unix)]
    #[test]
    fn downloads_then_runs_binary() {
        let mut server = mockito::Server::new();
        let asset = server
            .mock("GET", "/releases/download/guardian-linux")
            .with_status(302)
            .with_header("location", "/assets/guardian")
            .expect(1)
            .create();
        let payload = server
            .mock("GET", "/assets/guardian")
            .with_status(200)
            .with_body("#!/bin/sh\necho \"downloaded guardian $1\"\n")
            .expect(1)
            .create();

        let temp = TempDir::new().unwrap();
        let cache = temp.path().join("cache");
        let config = temp.path().join("config.toml");
        std::fs::write(
            &config,
            format!("[resolver]\ncache_dir = {:?}\n", cache.to_string_lossy()),
        )
        .unwrap();

        wrapper(temp.path())
            .env("GUARDIAN_CONFIG", &config)
            .env(
                "GUARDIAN_BINARY_URL",
                format!("{}/releases/download/guardian-linux", server.url()),
            )
            .arg("version")
            .assert()
            .success()
            .stdout(predicate::str::contains("downloaded guardian version"));

        asset.assert();
        payload.assert();

        let cached: Vec<_> = std::fs::read_dir(&cache)
            .unwrap()
            .filter_map(Result::ok)
            .collect();
        assert_eq!(cached.len(), 1);
        assert!(cached[0].path().join("guardian").exists());
    }
}
