//! CLI integration tests for starrocks-migrate.
//!
//! These tests verify command-line argument parsing, help output,
//! and exit codes for configuration errors.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

/// Get a command for the starrocks-migrate binary.
fn cmd() -> Command {
    Command::cargo_bin("starrocks-migrate").unwrap()
}

/// Write a config into a named temp file kept alive by the returned handle.
fn write_config(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

const VALID_CONFIG: &str = r#"
source:
  type: mysql
  host: localhost
  user: root
  password: secret
planning:
  be_num: 3
rules:
  - seq: "01"
    database: app
    table: orders
"#;

// =============================================================================
// Help and Version Tests
// =============================================================================

#[test]
fn test_help_shows_all_commands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("check-config"));
}

#[test]
fn test_generate_subcommand_help() {
    cmd()
        .args(["generate", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--output-dir"));
}

#[test]
fn test_version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("starrocks-migrate"));
}

#[test]
fn test_global_flags_in_help() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--config"))
        .stdout(predicate::str::contains("--verbosity"))
        .stdout(predicate::str::contains("--log-format"));
}

// =============================================================================
// Configuration Tests
// =============================================================================

#[test]
fn test_check_config_valid() {
    let file = write_config(VALID_CONFIG);
    cmd()
        .args(["--config", file.path().to_str().unwrap(), "check-config"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration OK: 1 rule(s)"))
        .stdout(predicate::str::contains("mysql at localhost:3306"));
}

#[test]
fn test_missing_config_file_exits_with_config_error() {
    cmd()
        .args(["--config", "/nonexistent/config.yaml", "check-config"])
        .assert()
        .failure();
}

#[test]
fn test_config_without_rules_rejected() {
    let file = write_config(
        r#"
source:
  type: mysql
  host: localhost
  user: root
  password: secret
rules: []
"#,
    );
    cmd()
        .args(["--config", file.path().to_str().unwrap(), "check-config"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("rule"));
}

#[test]
fn test_invalid_yaml_rejected() {
    let file = write_config("source: [not, a, mapping");
    cmd()
        .args(["--config", file.path().to_str().unwrap(), "check-config"])
        .assert()
        .failure()
        .code(2);
}
