//! Test utilities for reclaim integration tests.
//!
//! `TestEnv` isolates each run with its own HOME and a fake daemon, and
//! provides helpers to invoke the binary and inspect its output.

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

use httpmock::MockServer;
use tempfile::TempDir;

/// API version pinned for runs that should not negotiate.
pub const API_VERSION: &str = "1.41";

/// Test environment with an isolated HOME and a fake daemon.
pub struct TestEnv {
    /// Temporary HOME so no user config is picked up
    pub home: TempDir,
    /// Fake daemon the binary talks to
    pub server: MockServer,
}

impl TestEnv {
    pub fn new() -> Self {
        let home = TempDir::new().expect("Failed to create home temp dir");
        let server = MockServer::start();
        Self { home, server }
    }

    /// Get the path to the reclaim binary.
    pub fn reclaim_bin() -> String {
        env!("CARGO_BIN_EXE_reclaim").to_string()
    }

    /// Path of a versioned API endpoint, e.g. `/v1.41/volumes/prune`.
    pub fn endpoint(path: &str) -> String {
        format!("/v{}{}", API_VERSION, path)
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(Self::reclaim_bin());
        cmd.arg("-H")
            .arg(self.server.base_url())
            .args(args)
            .env("HOME", self.home.path())
            .env("DOCKER_API_VERSION", API_VERSION)
            .env_remove("DOCKER_HOST")
            .env_remove("RUST_LOG");
        cmd
    }

    /// Run reclaim with stdin closed.
    pub fn run(&self, args: &[&str]) -> Output {
        self.command(args)
            .stdin(Stdio::null())
            .output()
            .expect("Failed to run reclaim command")
    }

    /// Run reclaim and answer prompts with `input`.
    pub fn run_with_input(&self, args: &[&str], input: &str) -> Output {
        let mut child = self
            .command(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("Failed to spawn reclaim command");
        // The child may exit without reading (e.g. --dry-run), so a broken
        // pipe here is not a failure.
        if let Some(mut stdin) = child.stdin.take() {
            let _ = stdin.write_all(input.as_bytes());
        }
        child
            .wait_with_output()
            .expect("Failed to wait for reclaim command")
    }

    /// Run reclaim without a pinned API version, so it negotiates.
    pub fn run_negotiating(&self, args: &[&str]) -> Output {
        self.command(args)
            .env_remove("DOCKER_API_VERSION")
            .stdin(Stdio::null())
            .output()
            .expect("Failed to run reclaim command")
    }

    /// Run reclaim with HOME unset, as under cron or in minimal containers.
    pub fn run_without_home(&self, args: &[&str]) -> Output {
        self.command(args)
            .env_remove("HOME")
            .stdin(Stdio::null())
            .output()
            .expect("Failed to run reclaim command")
    }

    /// Run reclaim against an explicit host instead of the fake daemon.
    pub fn run_against(&self, host: &str, args: &[&str]) -> Output {
        Command::new(Self::reclaim_bin())
            .arg("-H")
            .arg(host)
            .args(args)
            .env("HOME", self.home.path())
            .env("DOCKER_API_VERSION", API_VERSION)
            .env_remove("DOCKER_HOST")
            .stdin(Stdio::null())
            .output()
            .expect("Failed to run reclaim command")
    }

    /// Write a config file into the temp HOME and return its path.
    pub fn write_config(&self, contents: &str) -> PathBuf {
        let path = self.home.path().join("reclaim.toml");
        fs::write(&path, contents).expect("Failed to write config");
        path
    }

    /// Check if the output indicates success.
    pub fn assert_success(output: &Output) {
        assert!(
            output.status.success(),
            "Command failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
    }

    /// Check if the output indicates failure.
    pub fn assert_failure(output: &Output) {
        assert!(
            !output.status.success(),
            "Command should have failed but succeeded"
        );
    }

    /// Get stdout as a string.
    pub fn stdout(output: &Output) -> String {
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    /// Get stderr as a string.
    pub fn stderr(output: &Output) -> String {
        String::from_utf8_lossy(&output.stderr).to_string()
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
