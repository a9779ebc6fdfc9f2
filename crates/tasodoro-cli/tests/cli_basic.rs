//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own temporary data directory.

use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(home: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_tasodoro"))
        .args(args)
        .env("TASODORO_HOME", home)
        .env_remove("TASODORO_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_json(home: &Path, args: &[&str]) -> serde_json::Value {
    let (stdout, stderr, code) = run_cli(home, args);
    assert_eq!(code, 0, "command {args:?} failed: {stderr}");
    serde_json::from_str(&stdout).expect("Failed to parse JSON output")
}

#[test]
fn status_on_fresh_home_is_stopped() {
    let home = TempDir::new().unwrap();
    let report = run_json(home.path(), &["timer", "status"]);
    let snap = &report["snapshot"];
    assert_eq!(snap["state"], "stopped");
    assert_eq!(snap["label"], "Press play to start");
    assert_eq!(snap["time_display"], "25:00");
    assert_eq!(snap["is_running"], false);
    assert_eq!(snap["progress"], 1.0);
}

#[test]
fn start_stop_and_reset_persist_between_runs() {
    let home = TempDir::new().unwrap();

    let report = run_json(home.path(), &["timer", "start"]);
    assert_eq!(report["event"]["type"], "timer_started");
    assert_eq!(report["snapshot"]["state"], "working");

    let report = run_json(home.path(), &["timer", "status"]);
    assert_eq!(report["snapshot"]["is_running"], true);
    assert_eq!(report["snapshot"]["state"], "working");

    let report = run_json(home.path(), &["timer", "stop"]);
    assert_eq!(report["event"]["type"], "timer_stopped");
    assert_eq!(report["snapshot"]["is_running"], false);
    assert_eq!(report["snapshot"]["state"], "working");

    let report = run_json(home.path(), &["timer", "reset"]);
    assert_eq!(report["event"]["type"], "timer_reset");
    assert_eq!(report["snapshot"]["state"], "stopped");
    assert_eq!(report["snapshot"]["completed_pomodoros"], 0);
}

#[test]
fn skip_moves_to_break() {
    let home = TempDir::new().unwrap();
    run_json(home.path(), &["timer", "start"]);
    let report = run_json(home.path(), &["timer", "skip"]);
    assert_eq!(report["event"]["type"], "period_completed");
    assert_eq!(report["snapshot"]["state"], "short_break");
    assert_eq!(report["snapshot"]["label"], "Short Break");
    assert_eq!(report["snapshot"]["color"], "secondary");
}

#[test]
fn custom_settings_change_work_length() {
    let home = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["settings", "set", "work", "10"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "ok");
    run_cli(home.path(), &["settings", "set", "classic", "false"]);

    let settings = run_json(home.path(), &["settings", "list"]);
    assert_eq!(settings["is_classic_mode"], false);
    assert_eq!(settings["is_custom_mode"], true);
    assert_eq!(settings["work_duration"], 10);

    let report = run_json(home.path(), &["timer", "start"]);
    assert_eq!(report["snapshot"]["total_secs"], 600);
}

#[test]
fn settings_change_stops_running_timer() {
    let home = TempDir::new().unwrap();
    run_json(home.path(), &["timer", "start"]);
    run_cli(home.path(), &["settings", "set", "classic", "false"]);
    let report = run_json(home.path(), &["timer", "status"]);
    assert_eq!(report["snapshot"]["state"], "stopped");
    assert_eq!(report["snapshot"]["is_running"], false);
}

#[test]
fn invalid_setting_is_rejected() {
    let home = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["settings", "set", "work", "0"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("error"), "stderr: {stderr}");

    let (stdout, _, _) = run_cli(home.path(), &["settings", "get", "work"]);
    assert_eq!(stdout.trim(), "25");
}

#[test]
fn config_set_and_get() {
    let home = TempDir::new().unwrap();
    let (_, _, code) = run_cli(home.path(), &["config", "set", "timer.tick_interval_ms", "250"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(home.path(), &["config", "get", "timer.tick_interval_ms"]);
    assert_eq!(stdout.trim(), "250");

    let (_, _, code) = run_cli(home.path(), &["config", "get", "timer.nope"]);
    assert_ne!(code, 0);
}

#[test]
fn config_rejects_malformed_ring_color() {
    let home = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["config", "set", "appearance.primary_color", "red"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("appearance.primary_color"), "stderr: {stderr}");

    let (stdout, _, _) = run_cli(home.path(), &["config", "get", "appearance.primary_color"]);
    assert_eq!(stdout.trim(), "#E53935");
}

#[test]
fn skip_on_idle_timer_starts_work() {
    let home = TempDir::new().unwrap();
    let report = run_json(home.path(), &["timer", "skip"]);
    assert_eq!(report["event"]["type"], "timer_started");
    assert_eq!(report["snapshot"]["state"], "working");
    assert_eq!(report["snapshot"]["completed_pomodoros"], 0);
}

#[test]
fn watch_on_idle_timer_returns_immediately() {
    let home = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["timer", "watch"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("not running"));
}

#[test]
fn watch_running_timer_for_a_few_frames() {
    let home = TempDir::new().unwrap();
    run_cli(home.path(), &["config", "set", "timer.tick_interval_ms", "5"]);
    run_json(home.path(), &["timer", "start"]);
    let (stdout, stderr, code) = run_cli(home.path(), &["timer", "watch", "--frames", "3"]);
    assert_eq!(code, 0, "stderr: {stderr}");
    assert!(stdout.contains("Work"));
}

#[test]
fn completions_are_generated() {
    let home = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["completions", "bash"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("tasodoro"));
}
