//! Smoke tests for the frametest CLI
//!
//! These tests run the real binary against the bundled demo fixtures.

#![allow(deprecated)] // Allow deprecated Command::cargo_bin until assert_cmd is updated
#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Get a command for the frametest binary
fn frametest() -> Command {
    let mut cmd = Command::cargo_bin("frametest").expect("frametest binary should exist");
    for var in [
        "FRAMETEST_LOG",
        "FRAMETEST_TIMEOUT_SECS",
        "FRAMETEST_POLL_FRAMES",
        "FRAMETEST_TEARDOWN",
        "FRAMETEST_START_DELAY_FRAMES",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_help_flag() {
    frametest()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("list"));
}

#[test]
fn test_no_args_fails() {
    frametest().assert().failure();
}

#[test]
fn test_list_shows_fixtures() {
    frametest()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Menu"))
        .stdout(predicate::str::contains("  add_score"))
        .stdout(predicate::str::contains("  enemy_spawns"));
}

// ============================================================================
// Run Tests
// ============================================================================

#[test]
fn test_run_single_passing_test() {
    frametest()
        .args(["run", "Menu", "add_score", "--color", "never"])
        .assert()
        .success()
        .stdout(predicate::str::contains("PASS Menu::add_score"))
        .stdout(predicate::str::contains("PASSED 1 tests"));
}

#[test]
fn test_run_verbose_shows_phases() {
    frametest()
        .args(["run", "Menu", "joystick", "--color", "never", "-v"])
        .assert()
        .success()
        .stdout(predicate::str::contains("INFO Running Menu::joystick"))
        .stdout(predicate::str::contains("open_menu"))
        .stdout(predicate::str::contains("reset"));
}

#[test]
fn test_run_default_verbosity_omits_running_line() {
    frametest()
        .args(["run", "Menu", "joystick", "--color", "never"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Running").not());
}

#[test]
fn test_run_failing_test_exits_nonzero() {
    frametest()
        .args(["run", "Menu", "wrong_score", "--color", "never"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("FAIL Menu::wrong_score"))
        .stdout(predicate::str::contains("text expected: 99"))
        .stderr(predicate::str::contains("1 of 1 tests failed"));
}

#[test]
fn test_run_json_output() {
    let output = frametest()
        .args(["run", "Level", "enemy_spawns", "--format", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let reports: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(reports[0]["fixture"], "Level");
    assert_eq!(reports[0]["test"], "enemy_spawns");
    assert_eq!(reports[0]["phases"][0]["name"], "enter_level");
}

#[test]
fn test_run_unknown_fixture() {
    frametest()
        .args(["run", "Nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown fixture"));
}

#[test]
fn test_run_zero_fps_rejected() {
    frametest()
        .args(["run", "Menu", "add_score", "--fps", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--fps"));
}

#[test]
fn test_env_teardown_override() {
    let output = frametest()
        .args(["run", "Menu", "wrong_score", "--format", "json"])
        .env("FRAMETEST_TEARDOWN", "skip-on-failure")
        .assert()
        .failure()
        .get_output()
        .stdout
        .clone();
    let reports: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(reports[0]["policy"], "skip-on-failure");
    assert_eq!(reports[0]["phases"][2]["outcome"]["status"], "skipped");
}

// ============================================================================
// Config Tests
// ============================================================================

#[test]
fn test_config_defaults() {
    frametest()
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("timeout_secs: 2"))
        .stdout(predicate::str::contains("poll_interval_frames: 10"))
        .stdout(predicate::str::contains("teardown: always"));
}

#[test]
fn test_config_file_and_env() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("engine.yaml");
    fs::write(&path, "wait:\n  poll_interval_frames: 4\n").unwrap();
    frametest()
        .args(["config", "--config"])
        .arg(&path)
        .env("FRAMETEST_TIMEOUT_SECS", "3.5")
        .assert()
        .success()
        .stdout(predicate::str::contains("poll_interval_frames: 4"))
        .stdout(predicate::str::contains("timeout_secs: 3.5"));
}

#[test]
fn test_config_invalid_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("engine.yaml");
    fs::write(&path, "wait:\n  poll_interval_frames: 0\n").unwrap();
    frametest()
        .args(["config", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("poll_interval_frames"));
}
