// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Builds a [`Statistic`] from run milestones

use crate::stats::Statistic;
use chrono::{DateTime, Utc};
use sera_engine::RunObserver;
use std::time::Duration;

/// Observer that timestamps each milestone of a run
#[derive(Debug, Default)]
pub struct StatsRecorder {
    command: String,
    timeout: Duration,
    start_time: Option<DateTime<Utc>>,
    lock_acquired_at: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
    exit_code: Option<i32>,
}

impl StatsRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The finished record, once the run both started and stopped
    pub fn statistic(&self) -> Option<Statistic> {
        let start_time = self.start_time?;
        let end_time = self.end_time?;
        let duration_ms = (end_time - start_time)
            .num_milliseconds()
            .try_into()
            .unwrap_or(0);
        Some(Statistic {
            start_time,
            end_time,
            duration_ms,
            command: self.command.clone(),
            timeout_secs: self.timeout.as_secs(),
            lock_acquired_at: self.lock_acquired_at,
            exit_code: self.exit_code?,
        })
    }
}

impl RunObserver for StatsRecorder {
    fn started(&mut self, command: &[String], timeout: Duration) {
        self.command = command.join(" ");
        self.timeout = timeout;
        self.start_time = Some(Utc::now());
    }

    fn lock_acquired(&mut self) {
        self.lock_acquired_at = Some(Utc::now());
    }

    fn stopped(&mut self, exit_code: i32) {
        self.end_time = Some(Utc::now());
        self.exit_code = Some(exit_code);
    }
}

#[cfg(test)]
#[path = "recorder_tests.rs"]
mod tests;
