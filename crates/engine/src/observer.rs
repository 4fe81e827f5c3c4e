// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Hooks notified over the course of one supervised run

use std::time::Duration;

/// Receives run milestones, e.g. to persist statistics
pub trait RunObserver: Send {
    /// The run began; `timeout` is the lock wait budget
    fn started(&mut self, command: &[String], timeout: Duration);

    /// This process now holds the lock
    fn lock_acquired(&mut self);

    /// The run finished with `exit_code`
    fn stopped(&mut self, exit_code: i32);
}

/// Observer that ignores every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl RunObserver for NoopObserver {
    fn started(&mut self, _command: &[String], _timeout: Duration) {}

    fn lock_acquired(&mut self) {}

    fn stopped(&mut self, _exit_code: i32) {}
}
