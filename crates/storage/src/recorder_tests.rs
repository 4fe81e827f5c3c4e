// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn command() -> Vec<String> {
    vec!["ls".to_string(), "-ltra".to_string()]
}

#[test]
fn records_a_full_run() {
    let mut recorder = StatsRecorder::new();

    recorder.started(&command(), Duration::from_secs(30));
    recorder.lock_acquired();
    recorder.stopped(3);

    let stat = recorder.statistic().unwrap();
    assert_eq!(stat.command, "ls -ltra");
    assert_eq!(stat.timeout_secs, 30);
    assert_eq!(stat.exit_code, 3);
    assert!(stat.lock_acquired_at.is_some());
    assert!(stat.start_time <= stat.end_time);
}

#[test]
fn lock_never_acquired_leaves_it_unset() {
    let mut recorder = StatsRecorder::new();

    recorder.started(&command(), Duration::from_secs(5));
    recorder.stopped(202);

    let stat = recorder.statistic().unwrap();
    assert_eq!(stat.lock_acquired_at, None);
    assert_eq!(stat.exit_code, 202);
}

#[test]
fn unfinished_run_has_no_statistic() {
    let mut recorder = StatsRecorder::new();
    assert!(recorder.statistic().is_none());

    recorder.started(&command(), Duration::from_secs(5));
    assert!(recorder.statistic().is_none());
}
