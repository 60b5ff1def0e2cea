//! Smoke tests to verify command module wiring

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Command with an empty HOME and cwd, so a developer's config and .env
/// stay out of the way. Keep the TempDir alive until the command ran.
fn tokoctl() -> (Command, TempDir) {
    let home = tempfile::tempdir().unwrap();
    let mut cmd = Command::cargo_bin("tokoctl").unwrap();
    cmd.env("HOME", home.path())
        .env_remove("DATABASE_URL")
        .env_remove("RUST_LOG")
        .current_dir(home.path());
    (cmd, home)
}

// === Help Tests ===

#[test]
fn test_top_level_help_lists_commands() {
    let (mut cmd, _home) = tokoctl();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("migrate"))
        .stdout(predicate::str::contains("order"))
        .stdout(predicate::str::contains("demo"));
}

#[test]
fn test_order_place_help() {
    let (mut cmd, _home) = tokoctl();
    cmd.args(["order", "place", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Number of units"));
}

#[test]
fn test_users_list_help() {
    let (mut cmd, _home) = tokoctl();
    cmd.args(["users", "list", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--name-not"))
        .stdout(predicate::str::contains("--summary"));
}

#[test]
fn test_serve_help() {
    let (mut cmd, _home) = tokoctl();
    cmd.args(["serve", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cors-permissive"));
}

// === Demo Tests ===

#[test]
fn test_demo_runs_without_database() {
    let (mut cmd, _home) = tokoctl();
    cmd.arg("demo")
        .assert()
        .success()
        .stdout(predicate::str::contains("insufficient_stock"))
        .stdout(predicate::str::contains("invalid_input"))
        .stdout(predicate::str::contains("5 succeeded, 7 out of stock, 0 left"));
}

#[test]
fn test_demo_json_report() {
    let (mut cmd, _home) = tokoctl();
    let output = cmd
        .args(["demo", "--json", "--stock", "2", "--buyers", "4"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["succeeded"], 2);
    assert_eq!(report["out_of_stock"], 2);
    assert_eq!(report["remaining_stock"], 0);
}

// === Error Tests ===

#[test]
fn test_database_command_without_url_fails() {
    let (mut cmd, _home) = tokoctl();
    cmd.arg("migrate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("DATABASE_URL not set"));
}

#[test]
fn test_order_list_requires_owner() {
    let (mut cmd, _home) = tokoctl();
    cmd.args(["order", "list"])
        .assert()
        .failure();
}
