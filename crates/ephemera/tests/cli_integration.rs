//! CLI integration tests for the Ephemera command-line interface.
//!
//! Every test runs in a scratch directory with an empty user config dir so
//! the developer's own configuration never leaks in.

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Scratch working directory plus user config directory.
struct Sandbox {
    cwd: TempDir,
    config_dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            cwd: TempDir::new().unwrap(),
            config_dir: TempDir::new().unwrap(),
        }
    }

    fn ephemera(&self) -> Command {
        let mut cmd = Command::cargo_bin("ephemera").unwrap();
        cmd.current_dir(self.cwd.path())
            .env("EPHEMERA_CONFIG_DIR", self.config_dir.path());
        cmd
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Help and Version Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_help_lists_subcommands() {
    Sandbox::new()
        .ephemera()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("demo"))
        .stdout(predicate::str::contains("soak"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_version_displays() {
    Sandbox::new()
        .ephemera()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("ephemera"));
}

#[test]
fn test_unknown_subcommand_rejected() {
    Sandbox::new().ephemera().arg("frobnicate").assert().failure();
}

// ─────────────────────────────────────────────────────────────────────────────
// Demo
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_demo_session_is_reclaimed() {
    let output = Sandbox::new()
        .ephemera()
        .args(["--json", "demo", "--idle-ms", "100", "--reclaim-ms", "20"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let body: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body["reclaimed"], true);
    assert_eq!(body["data"]["website"], "longhoang.de");
    assert_eq!(body["session_id"].as_str().unwrap().len(), 35);
}

#[test]
fn test_demo_rejects_zero_idle_timeout() {
    Sandbox::new()
        .ephemera()
        .args(["demo", "--idle-ms", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("idle timeout"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Soak
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_soak_is_consistent() {
    let output = Sandbox::new()
        .ephemera()
        .args(["--json", "soak", "--workers", "16", "--rounds", "50"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let body: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body["mismatches"], 0);
    assert_eq!(body["stats"]["live"], 16);
    assert_eq!(body["stats"]["updated"], 800);
}

#[test]
fn test_soak_requires_workers() {
    Sandbox::new()
        .ephemera()
        .args(["soak", "--workers", "0"])
        .assert()
        .failure();
}

// ─────────────────────────────────────────────────────────────────────────────
// Config
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_config_show_defaults() {
    Sandbox::new()
        .ephemera()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("idle_timeout_ms = 5000"))
        .stdout(predicate::str::contains("reclaim_interval_ms = 1000"));
}

#[test]
fn test_config_show_reads_project_file() {
    let sandbox = Sandbox::new();
    fs::write(
        sandbox.cwd.path().join("ephemera.toml"),
        "[store]\nidle_timeout_ms = 250\n",
    )
    .unwrap();

    sandbox
        .ephemera()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("idle_timeout_ms = 250"));
}

#[test]
fn test_config_init_writes_user_file_once() {
    let sandbox = Sandbox::new();

    sandbox.ephemera().args(["config", "init"]).assert().success();
    let written = fs::read_to_string(sandbox.config_dir.path().join("config.toml")).unwrap();
    assert!(written.contains("idle_timeout_ms = 5000"));

    sandbox
        .ephemera()
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    sandbox
        .ephemera()
        .args(["config", "init", "--force"])
        .assert()
        .success();
}

#[test]
fn test_config_which_lists_sources() {
    Sandbox::new()
        .ephemera()
        .args(["config", "which"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ephemera.toml"))
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_which_reports_rejected_layer() {
    let sandbox = Sandbox::new();
    fs::write(sandbox.cwd.path().join("ephemera.toml"), "[store\n").unwrap();

    sandbox
        .ephemera()
        .args(["--json", "config", "which"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"rejected\""))
        .stdout(predicate::str::contains("\"missing\""));
}
