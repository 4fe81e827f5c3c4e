//! Statistics display specs

use crate::prelude::*;
use crate::prelude::assert_eq;

const TWO_RUNS: &str = r#"{
  "statistics": [
    {
      "start_time": "2026-03-01T12:00:00Z",
      "end_time": "2026-03-01T12:00:02Z",
      "duration_ms": 2000,
      "command": "make backup",
      "timeout_secs": 30,
      "lock_acquired_at": "2026-03-01T12:00:00.015Z",
      "exit_code": 0
    },
    {
      "start_time": "2026-03-01T13:00:00Z",
      "end_time": "2026-03-01T13:00:01Z",
      "duration_ms": 1000,
      "command": "make report",
      "timeout_secs": 30,
      "lock_acquired_at": null,
      "exit_code": 202
    }
  ]
}"#;

#[test]
fn stats_lists_recorded_runs() {
    let temp = Project::empty();
    let file = temp.file("stats.json", TWO_RUNS);

    temp.sera()
        .args(&["stats", "--file", file.to_str().unwrap()])
        .passes()
        .stdout_has("make backup")
        .stdout_has("exit=202");
}

#[test]
fn stats_limit_keeps_most_recent() {
    let temp = Project::empty();
    let file = temp.file("stats.json", TWO_RUNS);

    let output = temp
        .sera()
        .args(&["stats", "--file", file.to_str().unwrap(), "--limit", "1"])
        .passes();

    assert!(!output.stdout().contains("make backup"));
    assert!(output.stdout().contains("make report"));
}

#[test]
fn stats_as_json() {
    let temp = Project::empty();
    let file = temp.file("stats.json", TWO_RUNS);

    let output = temp
        .sera()
        .args(&["stats", "--file", file.to_str().unwrap(), "--format", "json"])
        .passes();

    let runs: serde_json::Value = serde_json::from_str(&output.stdout()).unwrap();
    assert_eq!(runs.as_array().unwrap().len(), 2);
}

#[test]
fn stats_without_configured_file_is_bad_config() {
    let temp = Project::empty();
    temp.file("sera.json", r#"{"backend": "redis", "servers": ["127.0.0.1:6379"]}"#);

    temp.sera()
        .args(&["stats"])
        .exits_with(code::BAD_CONFIG_FILE)
        .stderr_has("No statistics file configured");
}

#[test]
fn stats_with_no_runs() {
    let temp = Project::empty();
    let file = temp.path().join("absent.json");

    temp.sera()
        .args(&["stats", "--file", file.to_str().unwrap()])
        .passes()
        .stdout_has("No runs recorded");
}
