//! Lock acquisition specs
//!
//! Without a reachable server the command must never run.

use crate::prelude::*;

#[test]
fn unreachable_servers_fail_without_running_command() {
    let temp = Project::empty();
    let config = temp.unreachable_config();
    let marker = temp.path().join("ran");

    temp.sera()
        .args(&[
            "--config",
            config.to_str().unwrap(),
            "run",
            "5",
            "--",
            "touch",
            marker.to_str().unwrap(),
        ])
        .exits_with(code::LOCK_FAILED)
        .stderr_has("Could not connect to enough lock servers");

    assert!(!marker.exists());
}

#[test]
fn unreachable_servers_in_wait_and_skip_mode_fail_too() {
    let temp = Project::empty();
    let config = temp.unreachable_config();

    temp.sera()
        .args(&[
            "--config",
            config.to_str().unwrap(),
            "run",
            "--wait-and-skip",
            "5",
            "--",
            "true",
        ])
        .exits_with(code::LOCK_FAILED);
}
