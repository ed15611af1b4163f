//! CLI integration tests for the playbase binary.
//!
//! Each test uses an isolated temp directory for the database, ensuring tests
//! can run in parallel safely.

#![allow(deprecated)] // Command::cargo_bin deprecation only affects custom build dirs

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn init_cmd(data_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("playbase").expect("failed to find binary");
    cmd.args(["init", "--data-dir"]).arg(data_dir);
    cmd
}

#[test]
fn test_init_creates_database_and_artifacts() {
    let temp = TempDir::new().expect("create temp dir");

    init_cmd(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("SQLite setup complete!"))
        .stdout(predicate::str::contains("Tables: 5"))
        .stdout(predicate::str::contains("App info records: 4"));

    assert!(temp.path().join("playbase.db").exists());
    assert!(temp.path().join("db_connection.txt").exists());
    assert!(temp.path().join("db_visualizer").join("sqlite.env").exists());
}

#[test]
fn test_init_is_repeatable() {
    let temp = TempDir::new().expect("create temp dir");

    init_cmd(temp.path()).assert().success();
    init_cmd(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Tables: 5"))
        .stdout(predicate::str::contains("App info records: 4"));
}

#[test]
fn test_init_writes_connection_string() {
    let temp = TempDir::new().expect("create temp dir");

    init_cmd(temp.path()).assert().success();

    let info = std::fs::read_to_string(temp.path().join("db_connection.txt"))
        .expect("read connection info");
    assert!(info.contains("sqlite:///"));
    assert!(info.contains("playbase.db"));
}
