//! Integration tests for the hostkit command surface.

#![allow(clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A hostkit process with no target and an isolated config file.
fn hostkit(config_dir: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("hostkit"));
    cmd.env("NO_COLOR", "1")
        .env("HOSTKIT_CONFIG", config_dir.path().join("config.yaml"))
        .env_remove("HOSTKIT_HOST")
        .env_remove("RUST_LOG");
    cmd
}

fn json_stdout(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.output().expect("run hostkit");
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

// --- Help and version ---

#[test]
fn no_args_shows_help_and_exits_two() {
    let dir = TempDir::new().expect("tempdir");
    hostkit(&dir)
        .env_remove("NO_COLOR")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Administer MySQL"));
}

#[test]
fn help_lists_commands() {
    let dir = TempDir::new().expect("tempdir");
    hostkit(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("detect"))
        .stdout(predicate::str::contains("show"))
        .stdout(predicate::str::contains("service"));
}

#[test]
fn version_command_shows_version() {
    let dir = TempDir::new().expect("tempdir");
    hostkit(&dir)
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("hostkit 0.1.0"));
}

#[test]
fn version_json_has_target() {
    let dir = TempDir::new().expect("tempdir");
    let value = json_stdout(hostkit(&dir).args(["version", "--json"]));
    assert_eq!(value["version"], "0.1.0");
    assert!(value["target"].as_str().is_some_and(|t| !t.is_empty()));
}

#[test]
fn no_color_env_accepts_conventional_values() {
    let dir = TempDir::new().expect("tempdir");
    for value in ["1", "true", "yes", "0", "false"] {
        hostkit(&dir)
            .env("NO_COLOR", value)
            .arg("apps")
            .assert()
            .success()
            .stdout(predicate::str::contains("redis"));
    }
}

// --- Catalog ---

#[test]
fn apps_lists_every_application() {
    let dir = TempDir::new().expect("tempdir");
    let output = hostkit(&dir).arg("apps").output().expect("run hostkit");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for id in ["mysql", "postgresql", "redis", "nginx", "apache", "system", "files"] {
        assert!(stdout.contains(id), "missing {id} in:\n{stdout}");
    }
}

#[test]
fn apps_json_describes_capabilities() {
    let dir = TempDir::new().expect("tempdir");
    let value = json_stdout(hostkit(&dir).args(["apps", "--json"]));
    let apps = value.as_array().expect("array");
    let nginx = apps
        .iter()
        .find(|a| a["id"] == "nginx")
        .expect("nginx entry");
    assert_eq!(nginx["category"], "web_server");
    assert!(
        nginx["capabilities"]
            .as_array()
            .expect("capabilities")
            .iter()
            .any(|c| c == "has_sites")
    );
}

// --- Targets and errors ---

#[test]
fn detect_without_target_fails() {
    let dir = TempDir::new().expect("tempdir");
    hostkit(&dir)
        .arg("detect")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No target host"));
}

#[test]
fn host_and_local_are_exclusive() {
    let dir = TempDir::new().expect("tempdir");
    hostkit(&dir)
        .args(["--host", "db1", "--local", "detect"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn unknown_application_is_reported_before_connecting() {
    let dir = TempDir::new().expect("tempdir");
    hostkit(&dir)
        .args(["show", "mongodb"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("mongodb"));
}

#[test]
fn unknown_application_json_error_code() {
    let dir = TempDir::new().expect("tempdir");
    let value = json_stdout(hostkit(&dir).args(["show", "mongodb", "--json"]));
    assert_eq!(value["error"], true);
    assert_eq!(value["code"], "service_not_found");
}

#[test]
fn unknown_section_lists_choices() {
    let dir = TempDir::new().expect("tempdir");
    hostkit(&dir)
        .args(["show", "redis", "sites"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown section 'sites'"))
        .stderr(predicate::str::contains("keyspace"));
}

#[test]
fn unconfigured_host_name_is_rejected() {
    let dir = TempDir::new().expect("tempdir");
    hostkit(&dir)
        .args(["--host", "bad host!", "detect"])
        .assert()
        .failure();
}

#[test]
fn service_rejects_unknown_action() {
    let dir = TempDir::new().expect("tempdir");
    hostkit(&dir)
        .args(["service", "nginx", "explode"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("possible values"));
}
