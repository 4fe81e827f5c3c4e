// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use sera_core::BackendKind;

fn args(no_hash: bool, wait_and_skip: bool) -> RunArgs {
    RunArgs {
        timeout: 30,
        wait_and_skip,
        no_hash,
        command: vec!["ls".to_string(), "-ltra".to_string()],
    }
}

fn config(hash_names: bool) -> Config {
    let mut config = Config::new(BackendKind::Redis, vec!["127.0.0.1:6379".to_string()]);
    config.hash_names = hash_names;
    config
}

#[test]
fn lock_name_is_a_stable_digest_by_default() {
    let first = args(false, false).lock_name(&config(true));
    let second = args(false, false).lock_name(&config(true));

    assert_eq!(first, second);
    assert_eq!(first.as_str().len(), 64);
    assert_eq!(first, LockName::from_command(&["ls -ltra".to_string()], true));
}

#[test]
fn lock_name_can_be_plain() {
    assert_eq!(args(true, false).lock_name(&config(true)).as_str(), "ls -ltra");
    assert_eq!(args(false, false).lock_name(&config(false)).as_str(), "ls -ltra");
}

#[test]
fn mode_follows_flag() {
    assert_eq!(args(false, false).mode(), ExecutionMode::EveryoneExecutes);
    assert_eq!(args(false, true).mode(), ExecutionMode::WaitAndSkip);
}

#[tokio::test]
async fn unreachable_servers_fail_with_lock_failed() {
    let mut config = Config::new(BackendKind::Redis, vec!["127.0.0.1:1".to_string()]);
    config.connect_timeout = Duration::from_millis(200);

    let err = run(args(false, false), config).await.unwrap_err();

    let err = err.downcast::<SeraError>().unwrap();
    assert_eq!(err.exit_code, sera_core::exit::LOCK_FAILED);
}
