//! Integration tests for `hostkit config`.
//!
//! Every test points `HOSTKIT_CONFIG` at a temp path so none of them reads or
//! writes `~/.hostkit/config.yaml`.

#![allow(clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn hostkit() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("hostkit"));
    cmd.env("NO_COLOR", "1").env_remove("HOSTKIT_HOST");
    cmd
}

/// Returns a `TempDir` and the path string for a config file inside it.
fn temp_config_path() -> (TempDir, String) {
    let dir = TempDir::new().expect("temp dir");
    let path = dir
        .path()
        .join("config.yaml")
        .to_string_lossy()
        .into_owned();
    (dir, path)
}

// ---------------------------------------------------------------------------
// show / get / path
// ---------------------------------------------------------------------------

#[test]
fn show_without_file_uses_defaults() {
    let (_dir, path) = temp_config_path();
    hostkit()
        .args(["config", "show"])
        .env("HOSTKIT_CONFIG", &path)
        .assert()
        .success()
        .stdout(predicate::str::contains("timeouts.command_secs:"))
        .stdout(predicate::str::contains("30"))
        .stdout(predicate::str::contains("HOSTKIT_CONFIG"));
}

#[test]
fn show_does_not_create_file() {
    let (_dir, path) = temp_config_path();
    hostkit()
        .args(["config", "show"])
        .env("HOSTKIT_CONFIG", &path)
        .assert()
        .success();
    assert!(!std::path::Path::new(&path).exists());
}

#[test]
fn get_prints_the_bare_value() {
    let (_dir, path) = temp_config_path();
    hostkit()
        .args(["config", "get", "timeouts.install_secs"])
        .env("HOSTKIT_CONFIG", &path)
        .assert()
        .success()
        .stdout("600\n");
}

#[test]
fn path_honours_env_override() {
    let (_dir, path) = temp_config_path();
    hostkit()
        .args(["config", "path"])
        .env("HOSTKIT_CONFIG", &path)
        .assert()
        .success()
        .stdout(predicate::str::contains(path.as_str()));
}

// ---------------------------------------------------------------------------
// set
// ---------------------------------------------------------------------------

#[test]
fn set_then_get_round_trips() {
    let (_dir, path) = temp_config_path();
    hostkit()
        .args(["config", "set", "timeouts.command_secs", "45"])
        .env("HOSTKIT_CONFIG", &path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Set timeouts.command_secs = 45"));
    hostkit()
        .args(["config", "get", "timeouts.command_secs"])
        .env("HOSTKIT_CONFIG", &path)
        .assert()
        .success()
        .stdout("45\n");
}

#[test]
fn set_unknown_key_fails() {
    let (_dir, path) = temp_config_path();
    hostkit()
        .args(["config", "set", "ssh.password", "hunter2"])
        .env("HOSTKIT_CONFIG", &path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("timeouts.command_secs"));
    assert!(!std::path::Path::new(&path).exists());
}

#[test]
fn set_zero_command_timeout_fails() {
    let (_dir, path) = temp_config_path();
    hostkit()
        .args(["config", "set", "timeouts.command_secs", "0"])
        .env("HOSTKIT_CONFIG", &path)
        .assert()
        .failure();
}

#[test]
fn set_zero_settle_delay_is_allowed() {
    let (_dir, path) = temp_config_path();
    hostkit()
        .args(["config", "set", "timeouts.settle_secs", "0"])
        .env("HOSTKIT_CONFIG", &path)
        .assert()
        .success();
}

// ---------------------------------------------------------------------------
// add-host / remove-host
// ---------------------------------------------------------------------------

#[test]
fn added_host_shows_up_in_config() {
    let (_dir, path) = temp_config_path();
    hostkit()
        .args([
            "config", "add-host", "db1", "10.0.0.5", "--user", "deploy", "--port", "2222",
        ])
        .env("HOSTKIT_CONFIG", &path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved host 'db1'"));

    hostkit()
        .args(["config", "show"])
        .env("HOSTKIT_CONFIG", &path)
        .assert()
        .success()
        .stdout(predicate::str::contains("deploy@10.0.0.5:2222"));

    let output = hostkit()
        .args(["config", "show", "--json"])
        .env("HOSTKIT_CONFIG", &path)
        .output()
        .expect("run hostkit");
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(value["config"]["hosts"]["db1"]["host"], "10.0.0.5");
    assert_eq!(value["config"]["hosts"]["db1"]["port"], 2222);
}

#[test]
fn add_host_rejects_user_in_address() {
    let (_dir, path) = temp_config_path();
    hostkit()
        .args(["config", "add-host", "db1", "root@10.0.0.5"])
        .env("HOSTKIT_CONFIG", &path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--user"));
}

#[test]
fn remove_host_forgets_it() {
    let (_dir, path) = temp_config_path();
    hostkit()
        .args(["config", "add-host", "web", "web.example.com"])
        .env("HOSTKIT_CONFIG", &path)
        .assert()
        .success();
    hostkit()
        .args(["config", "remove-host", "web"])
        .env("HOSTKIT_CONFIG", &path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed host 'web'"));
    hostkit()
        .args(["config", "show"])
        .env("HOSTKIT_CONFIG", &path)
        .assert()
        .success()
        .stdout(predicate::str::contains("web.example.com").not());
}

#[test]
fn remove_missing_host_warns_but_succeeds() {
    let (_dir, path) = temp_config_path();
    hostkit()
        .args(["config", "remove-host", "ghost"])
        .env("HOSTKIT_CONFIG", &path)
        .assert()
        .success()
        .stdout(predicate::str::contains("No host named 'ghost'"));
}

#[test]
fn malformed_config_file_is_reported() {
    let (_dir, path) = temp_config_path();
    std::fs::write(&path, "timeouts: [not, a, map]\n").expect("write");
    hostkit()
        .args(["config", "show"])
        .env("HOSTKIT_CONFIG", &path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot parse"));
}
