//! End-to-end tests for the snooze CLI binary.
//!
//! These exercise the compiled binary itself:
//! - Help and version output
//! - Argument validation
//! - Completion script generation
//! - Error handling when no daemon is listening

use assert_cmd::Command;
use predicates::prelude::*;

// ============================================================================
// Help & Version
// ============================================================================

#[test]
fn test_help_lists_subcommands() {
    let mut cmd = Command::cargo_bin("snooze").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("start"))
        .stdout(predicate::str::contains("extend"))
        .stdout(predicate::str::contains("cancel"))
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("episode-end"))
        .stdout(predicate::str::contains("chapter-end"))
        .stdout(predicate::str::contains("playing"))
        .stdout(predicate::str::contains("daemon"));
}

#[test]
fn test_version_output() {
    let mut cmd = Command::cargo_bin("snooze").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("snooze"));
}

#[test]
fn test_no_args_prints_help() {
    let mut cmd = Command::cargo_bin("snooze").unwrap();
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Usage").or(predicate::str::contains("snooze")));
}

// ============================================================================
// Argument Validation
// ============================================================================

#[test]
fn test_start_rejects_zero_minutes() {
    let mut cmd = Command::cargo_bin("snooze").unwrap();
    cmd.args(["start", "--minutes", "0"]).assert().failure();
}

#[test]
fn test_start_rejects_out_of_range_minutes() {
    let mut cmd = Command::cargo_bin("snooze").unwrap();
    cmd.args(["start", "--minutes", "481"]).assert().failure();
}

#[test]
fn test_episode_end_rejects_invalid_uuid() {
    let mut cmd = Command::cargo_bin("snooze").unwrap();
    cmd.args(["episode-end", "not-a-uuid"]).assert().failure();
}

#[test]
fn test_unknown_subcommand_fails() {
    let mut cmd = Command::cargo_bin("snooze").unwrap();
    cmd.arg("frobnicate").assert().failure();
}

// ============================================================================
// Completions
// ============================================================================

#[test]
fn test_completions_bash_mentions_binary() {
    let mut cmd = Command::cargo_bin("snooze").unwrap();
    cmd.args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("snooze"));
}

#[test]
fn test_completions_rejects_unknown_shell() {
    let mut cmd = Command::cargo_bin("snooze").unwrap();
    cmd.args(["completions", "tcsh"]).assert().failure();
}

// ============================================================================
// Daemon Connection Errors
// ============================================================================

/// Daemon不在時はエラー終了する
#[test]
fn test_status_without_daemon_fails() {
    let dir = tempfile::tempdir().unwrap();
    let socket = dir.path().join("missing.sock");

    let mut cmd = Command::cargo_bin("snooze").unwrap();
    cmd.args(["--socket", socket.to_str().unwrap(), "status"])
        .timeout(std::time::Duration::from_secs(30))
        .assert()
        .failure()
        .stderr(predicate::str::contains("エラー"));
}
