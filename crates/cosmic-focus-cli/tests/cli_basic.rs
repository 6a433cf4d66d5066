//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run against the dev data
//! directory and verify outputs.

use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-p", "cosmic-focus-cli", "--"])
        .args(args)
        .env("COSMIC_FOCUS_ENV", "dev")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

#[test]
fn test_help() {
    let (stdout, _, code) = run_cli(&["--help"]);
    assert_eq!(code, 0, "help failed");
    assert!(stdout.contains("Cosmic Focus CLI"));
    assert!(stdout.contains("run"));
    assert!(stdout.contains("config"));
}

#[test]
fn test_config_list_is_json() {
    let (stdout, _, code) = run_cli(&["config", "list"]);
    assert_eq!(code, 0, "config list failed");
    let parsed: serde_json::Value =
        serde_json::from_str(&stdout).expect("config list should print JSON");
    assert!(parsed["timer"]["focus_min"].is_u64());
    assert!(parsed["ui"]["theme"].is_string());
}

#[test]
fn test_config_get() {
    let (stdout, _, code) = run_cli(&["config", "get", "timer.daily_session_target"]);
    assert_eq!(code, 0, "config get failed");
    assert!(!stdout.trim().is_empty());
}

#[test]
fn test_config_get_unknown_key_fails() {
    let (_, stderr, code) = run_cli(&["config", "get", "timer.no_such_key"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("unknown key"));
}
