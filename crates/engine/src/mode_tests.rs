// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::driver::Backend;
use crate::error::SupervisorError;
use crate::observer::NoopObserver;
use crate::supervisor::{SharedBuffer, Sink};
use sera_adapters::{FakeTokenNode, FakeTokenStore, TokenNode};
use sera_core::{FakeClock, LockName, RetryPolicy};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

fn name() -> LockName {
    LockName::new("deploy")
}

fn patient() -> RetryPolicy {
    RetryPolicy::default()
        .with_tries(1000)
        .with_delay(Duration::from_millis(10))
}

fn mutex_on(store: &FakeTokenStore, policy: RetryPolicy) -> DistributedMutex<FakeClock> {
    let node: Arc<dyn TokenNode> = Arc::new(FakeTokenNode::connected_to("cache:6379", store.clone()));
    DistributedMutex::new(
        name(),
        Backend::token_nodes(vec![node], Duration::from_millis(200)),
        policy,
        FakeClock::new(),
    )
    .unwrap()
}

fn quiet() -> Coordinator {
    Coordinator::new(CommandSupervisor::with_sinks(
        Sink::Buffer(SharedBuffer::new()),
        Sink::Buffer(SharedBuffer::new()),
    ))
}

fn sh(script: String) -> Vec<String> {
    vec!["sh".to_string(), "-c".to_string(), script]
}

fn marker_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn command_exit_code_is_passed_through() {
    let store = FakeTokenStore::new();
    let mutex = mutex_on(&store, patient());

    let outcome = quiet()
        .run(
            ExecutionMode::EveryoneExecutes,
            &mutex,
            &sh("exit 3".to_string()),
            &mut NoopObserver,
        )
        .await;

    assert_eq!(outcome.exit_code, 3);
    assert!(outcome.ran_command);
    assert!(outcome.error.is_none());
    assert!(!mutex.is_held().await);
    assert_eq!(store.value(&name()), None);
}

#[tokio::test]
async fn lock_failure_skips_the_command() {
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("marker");
    let store = FakeTokenStore::new();
    store.insert(&name(), "other-holder");
    let mutex = mutex_on(
        &store,
        RetryPolicy::default()
            .with_tries(2)
            .with_delay(Duration::from_millis(1)),
    );

    let outcome = quiet()
        .run(
            ExecutionMode::EveryoneExecutes,
            &mutex,
            &sh(format!("echo ran >> {}", marker.display())),
            &mut NoopObserver,
        )
        .await;

    assert_eq!(outcome.exit_code, exit::LOCK_FAILED);
    assert!(!outcome.ran_command);
    assert!(matches!(outcome.error, Some(RunError::Lock(MutexError::Failed { .. }))));
    assert!(!marker.exists());
}

#[tokio::test]
async fn lock_timeout_has_its_own_exit_code() {
    let clock = FakeClock::new();
    let store = FakeTokenStore::new();
    store.insert(&name(), "other-holder");
    let node: Arc<dyn TokenNode> = Arc::new(
        FakeTokenNode::connected_to("cache:6379", store.clone())
            .with_latency(clock.clone(), Duration::from_millis(700)),
    );
    let mutex = DistributedMutex::new(
        name(),
        Backend::token_nodes(vec![node], Duration::from_millis(200)),
        patient().with_wait(Some(Duration::from_secs(1))),
        clock,
    )
    .unwrap();

    let outcome = quiet()
        .run(
            ExecutionMode::EveryoneExecutes,
            &mutex,
            &sh("true".to_string()),
            &mut NoopObserver,
        )
        .await;

    assert_eq!(outcome.exit_code, exit::LOCK_TIMED_OUT);
}

#[tokio::test]
async fn launch_failure_releases_the_lock() {
    let store = FakeTokenStore::new();
    let mutex = mutex_on(&store, patient());

    let outcome = quiet()
        .run(
            ExecutionMode::EveryoneExecutes,
            &mutex,
            &["/nonexistent/sera-test-binary".to_string()],
            &mut NoopObserver,
        )
        .await;

    assert_eq!(outcome.exit_code, exit::COMMAND_RUN_FAILED);
    assert!(matches!(
        outcome.error,
        Some(RunError::Command(SupervisorError::Launch { .. }))
    ));
    assert_eq!(store.value(&name()), None);
}

#[tokio::test]
async fn everyone_executes_serializes_runs() {
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("marker");
    let store = FakeTokenStore::new();
    let first = mutex_on(&store, patient());
    let second = mutex_on(&store, patient());
    let command = sh(format!(
        "echo start >> {m}; sleep 0.2; echo end >> {m}",
        m = marker.display()
    ));

    let coordinator = quiet();
    let (mut first_observer, mut second_observer) = (NoopObserver, NoopObserver);
    let (a, b) = tokio::join!(
        coordinator.run(ExecutionMode::EveryoneExecutes, &first, &command, &mut first_observer),
        coordinator.run(ExecutionMode::EveryoneExecutes, &second, &command, &mut second_observer),
    );

    assert_eq!((a.exit_code, b.exit_code), (0, 0));
    assert!(a.ran_command && b.ran_command);
    assert_eq!(marker_lines(&marker), vec!["start", "end", "start", "end"]);
}

// Wait-and-skip is best effort: this only checks the overlapping case,
// where the follower tries the lock while the leader is still running.
#[tokio::test]
async fn wait_and_skip_runs_the_command_once() {
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("marker");
    let store = FakeTokenStore::new();
    let first = mutex_on(&store, patient());
    let second = mutex_on(&store, patient());
    let command = sh(format!("echo ran >> {}; sleep 0.3", marker.display()));

    let coordinator = quiet();
    let (mut first_observer, mut second_observer) = (NoopObserver, NoopObserver);
    let (a, b) = tokio::join!(
        coordinator.run(ExecutionMode::WaitAndSkip, &first, &command, &mut first_observer),
        coordinator.run(ExecutionMode::WaitAndSkip, &second, &command, &mut second_observer),
    );

    assert_eq!((a.exit_code, b.exit_code), (0, 0));
    assert!(a.ran_command ^ b.ran_command);
    assert_eq!(marker_lines(&marker), vec!["ran"]);
    assert_eq!(store.value(&name()), None);
}

#[tokio::test]
async fn wait_and_skip_leader_reports_command_code() {
    let store = FakeTokenStore::new();
    let mutex = mutex_on(&store, patient());

    let outcome = quiet()
        .run(
            ExecutionMode::WaitAndSkip,
            &mutex,
            &sh("exit 7".to_string()),
            &mut NoopObserver,
        )
        .await;

    assert_eq!(outcome.exit_code, 7);
    assert!(outcome.ran_command);
}

#[tokio::test]
async fn wait_and_skip_follower_gives_up_with_lock_failure() {
    let store = FakeTokenStore::new();
    store.insert(&name(), "stuck-holder");
    let mutex = mutex_on(
        &store,
        RetryPolicy::default()
            .with_tries(2)
            .with_delay(Duration::from_millis(1)),
    );

    let outcome = quiet()
        .run(
            ExecutionMode::WaitAndSkip,
            &mutex,
            &sh("true".to_string()),
            &mut NoopObserver,
        )
        .await;

    assert_eq!(outcome.exit_code, exit::LOCK_FAILED);
    assert!(!outcome.ran_command);
}

#[derive(Default)]
struct Recording {
    events: Vec<String>,
}

impl RunObserver for Recording {
    fn started(&mut self, command: &[String], timeout: Duration) {
        self.events
            .push(format!("started {} {:?}", command.join(" "), timeout));
    }

    fn lock_acquired(&mut self) {
        self.events.push("acquired".to_string());
    }

    fn stopped(&mut self, exit_code: i32) {
        self.events.push(format!("stopped {exit_code}"));
    }
}

#[tokio::test]
async fn observer_sees_each_milestone() {
    let store = FakeTokenStore::new();
    let mutex = mutex_on(&store, patient().with_wait(Some(Duration::from_secs(5))));
    let mut observer = Recording::default();

    quiet()
        .run(
            ExecutionMode::EveryoneExecutes,
            &mutex,
            &sh("exit 2".to_string()),
            &mut observer,
        )
        .await;

    assert_eq!(
        observer.events,
        vec!["started sh -c exit 2 5s", "acquired", "stopped 2"]
    );
}

#[test]
fn mode_names() {
    assert_eq!(ExecutionMode::default(), ExecutionMode::EveryoneExecutes);
    assert_eq!(ExecutionMode::WaitAndSkip.to_string(), "wait-and-skip");
}
