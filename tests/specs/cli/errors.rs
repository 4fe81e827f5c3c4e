//! Invocation and configuration error specs
//!
//! Verify dedicated exit codes for bad arguments and bad configuration.

use crate::prelude::*;

#[test]
fn run_without_command_is_bad_arguments() {
    let temp = Project::empty();

    temp.sera()
        .args(&["run", "10"])
        .exits_with(code::BAD_ARGUMENTS)
        .stderr_has("Usage");
}

#[test]
fn run_with_non_numeric_timeout_is_bad_arguments() {
    let temp = Project::empty();

    temp.sera()
        .args(&["run", "soon", "--", "true"])
        .exits_with(code::BAD_ARGUMENTS);
}

#[test]
fn run_with_zero_timeout_is_bad_arguments() {
    let temp = Project::empty();

    temp.sera()
        .args(&["run", "0", "--", "true"])
        .exits_with(code::BAD_ARGUMENTS);
}

#[test]
fn unknown_subcommand_is_bad_arguments() {
    let temp = Project::empty();

    temp.sera().args(&["lock"]).exits_with(code::BAD_ARGUMENTS);
}

#[test]
fn missing_config_is_bad_config_file() {
    let temp = Project::empty();

    temp.sera()
        .args(&["--config", "missing.json", "run", "10", "--", "true"])
        .exits_with(code::BAD_CONFIG_FILE)
        .stderr_has("No configuration file found");
}

#[test]
fn malformed_config_is_bad_config_file() {
    let temp = Project::empty();
    temp.file("sera.json", "{ not json");

    temp.sera()
        .args(&["--config", "sera.json", "run", "10", "--", "true"])
        .exits_with(code::BAD_CONFIG_FILE)
        .stderr_has("Invalid configuration");
}

#[test]
fn unknown_backend_is_bad_config_file() {
    let temp = Project::empty();
    temp.file("sera.json", r#"{"backend": "etcd", "servers": ["x"]}"#);

    temp.sera()
        .args(&["--config", "sera.json", "run", "10", "--", "true"])
        .exits_with(code::BAD_CONFIG_FILE)
        .stderr_has("unknown backend 'etcd'");
}

#[test]
fn out_of_range_drift_factor_is_bad_config_file() {
    let temp = Project::empty();
    temp.file("sera.json", r#"{"backend": "redis", "servers": ["127.0.0.1:1"], "drift_factor": 1e30}"#);

    temp.sera()
        .args(&["--config", "sera.json", "run", "10", "--", "true"])
        .exits_with(code::BAD_CONFIG_FILE)
        .stderr_has("drift_factor must be at least 0 and below 1");
}

#[test]
fn zero_expiry_is_bad_config_file() {
    let temp = Project::empty();
    temp.file("sera.json", r#"{"backend": "redis", "servers": ["127.0.0.1:1"], "expiry": "0s"}"#);

    temp.sera()
        .args(&["--config", "sera.json", "run", "10", "--", "true"])
        .exits_with(code::BAD_CONFIG_FILE)
        .stderr_has("expiry must be between 1ms and 24h");
}

#[test]
fn config_is_found_in_home_directory() {
    let temp = Project::empty();
    temp.file("home/.sera/sera.json", r#"{"backend": "etcd", "servers": ["x"]}"#);

    temp.sera()
        .args(&["run", "10", "--", "true"])
        .exits_with(code::BAD_CONFIG_FILE)
        .stderr_has(".sera/sera.json");
}
