//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary with an isolated config directory and
//! verify outputs.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

/// Run a CLI command with `stdin` piped in and return (stdout, stderr, code).
fn run_cli(home: &Path, args: &[&str], stdin: &str) -> (String, String, i32) {
    let mut child = Command::new(env!("CARGO_BIN_EXE_relaxroom-cli"))
        .args(args)
        .env("RELAXROOM_HOME", home)
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to execute CLI command");

    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(stdin.as_bytes())
        .expect("Failed to write stdin");

    let output = child.wait_with_output().expect("Failed to wait for CLI");
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn json_lines(stdout: &str) -> Vec<serde_json::Value> {
    stdout
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).expect("Failed to parse JSON line"))
        .collect()
}

#[test]
fn test_config_list() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["config", "list"], "");
    assert_eq!(code, 0, "Config list failed");
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["session"]["duration_ms"], 3_600_000);
    assert_eq!(parsed["session"]["tick_interval_ms"], 50);
}

#[test]
fn test_config_set_then_get() {
    let home = tempfile::tempdir().unwrap();
    let (_, _, code) = run_cli(
        home.path(),
        &["config", "set", "session.duration_ms", "1500000"],
        "",
    );
    assert_eq!(code, 0, "Config set failed");
    assert!(home.path().join("config.toml").exists());

    let (stdout, _, code) = run_cli(home.path(), &["config", "get", "session.duration_ms"], "");
    assert_eq!(code, 0, "Config get failed");
    assert_eq!(stdout.trim(), "1500000");
}

#[test]
fn test_config_rejects_unknown_key_and_zero_duration() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["config", "get", "session.nope"], "");
    assert_eq!(code, 1);
    assert!(stderr.contains("unknown key"));

    let (_, stderr, code) = run_cli(
        home.path(),
        &["config", "set", "session.duration_ms", "0"],
        "",
    );
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_config_reset() {
    let home = tempfile::tempdir().unwrap();
    run_cli(
        home.path(),
        &["config", "set", "display.show_progress_bar", "false"],
        "",
    );
    let (_, _, code) = run_cli(home.path(), &["config", "reset"], "");
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(
        home.path(),
        &["config", "get", "display.show_progress_bar"],
        "",
    );
    assert_eq!(stdout.trim(), "true");
}

#[test]
fn test_run_rejects_zero_duration() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["run", "--duration-ms", "0"], "quit\n");
    assert_eq!(code, 1);
    assert!(stderr.contains("duration_ms"), "stderr was: {stderr}");
}

#[test]
fn test_run_relax_until_empty() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(
        home.path(),
        &["run", "--minutes", "60"],
        "relax\nrelax\nstatus\nquit\n",
    );
    assert_eq!(code, 0, "Run failed");
    assert!(stdout.contains("session started: one relax token every 60:00"));
    assert!(stdout.contains("RELAX #1"));
    assert!(stdout.contains("no relax tokens left"));
    assert!(stdout.contains("DON'T DO IT 0"));
    assert!(stdout.contains("session stopped after 1 relaxes"));
}

#[test]
fn test_run_json_events() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(
        home.path(),
        &["run", "--duration-ms", "60000", "--json"],
        "r\nr\nstatus\nq\n",
    );
    assert_eq!(code, 0, "Run failed");

    let lines = json_lines(&stdout);
    let types: Vec<&str> = lines.iter().map(|v| v["type"].as_str().unwrap()).collect();
    assert_eq!(
        types,
        vec!["session_started", "relaxed", "relax_refused", "state_snapshot", "session_stopped"]
    );
    assert_eq!(lines[1]["relax"]["sequence_number"], 1);
    assert_eq!(lines[1]["balance"], 0);
    assert_eq!(lines[3]["balance"], 0);
    assert_eq!(lines[3]["running"], true);
    assert_eq!(lines[4]["total_consumed"], 1);
}

#[test]
fn test_run_idle_until_started() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(
        home.path(),
        &["run", "--idle", "--duration-ms", "60000"],
        "relax\nstart\nrelax\nstop\nrecords\nq\n",
    );
    assert_eq!(code, 0, "Run failed");
    assert!(stdout.contains("Start your first relax of the day"));
    assert!(stdout.contains("session is not running"));
    assert!(stdout.contains("RELAX #1"));
    assert!(stdout.contains("You've relaxed 1 times today"));
}

#[test]
fn test_run_uses_configured_duration() {
    let home = tempfile::tempdir().unwrap();
    run_cli(
        home.path(),
        &["config", "set", "session.duration_ms", "90000"],
        "",
    );
    let (stdout, _, code) = run_cli(home.path(), &["run"], "q\n");
    assert_eq!(code, 0);
    assert!(stdout.contains("every 1:30 (1.5 minutes)"));
}

#[test]
fn test_run_every_uses_configured_unit() {
    let home = tempfile::tempdir().unwrap();
    run_cli(
        home.path(),
        &["config", "set", "display.duration_unit", "hours"],
        "",
    );
    let (stdout, _, code) = run_cli(home.path(), &["run", "--every", "2"], "status\nq\n");
    assert_eq!(code, 0, "Run failed");
    assert!(stdout.contains("every 120:00 (2 hours)"));
    assert!(stdout.contains("of 2 hours"));
}

#[test]
fn test_run_stop_shows_daily_summary() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(
        home.path(),
        &["run", "--duration-ms", "60000"],
        "r\ns\nq\n",
    );
    assert_eq!(code, 0, "Run failed");
    let stopped = stdout.find("session stopped after 1 relaxes").unwrap();
    let summary = stdout.find("You've relaxed 1 times today").unwrap();
    assert!(summary > stopped);
}
