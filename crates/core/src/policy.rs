// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Retry policy and drift-compensated validity windows

use std::time::{Duration, Instant};

pub const DEFAULT_EXPIRY: Duration = Duration::from_secs(8);
pub const DEFAULT_TRIES: u32 = 16;
pub const DEFAULT_DELAY: Duration = Duration::from_millis(512);
pub const DEFAULT_DRIFT_FACTOR: f64 = 0.01;

/// Fixed allowance added to the proportional drift margin
pub const CLOCK_SLOP: Duration = Duration::from_millis(2);

/// How a mutex retries and how long each lease lasts
#[derive(Clone, Debug, PartialEq)]
pub struct RetryPolicy {
    /// Lease requested from every node on each attempt
    pub expiry: Duration,
    /// Maximum number of attempts per `lock()`
    pub tries: u32,
    /// Pause between failed attempts
    pub delay: Duration,
    /// Fraction of `expiry` reserved for clock drift
    pub drift_factor: f64,
    /// Optional overall budget for one `lock()` call
    pub wait: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            expiry: DEFAULT_EXPIRY,
            tries: DEFAULT_TRIES,
            delay: DEFAULT_DELAY,
            drift_factor: DEFAULT_DRIFT_FACTOR,
            wait: None,
        }
    }
}

impl RetryPolicy {
    pub fn with_expiry(mut self, expiry: Duration) -> Self {
        self.expiry = expiry;
        self
    }

    pub fn with_tries(mut self, tries: u32) -> Self {
        self.tries = tries;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_drift_factor(mut self, factor: f64) -> Self {
        self.drift_factor = factor;
        self
    }

    pub fn with_wait(mut self, wait: Option<Duration>) -> Self {
        self.wait = wait;
        self
    }

    /// `expiry * drift_factor + CLOCK_SLOP`
    ///
    /// A factor too large to represent reserves the whole lease.
    pub fn drift_margin(&self) -> Duration {
        let factor = if self.drift_factor.is_finite() && self.drift_factor > 0.0 {
            self.drift_factor
        } else {
            0.0
        };
        let proportional = Duration::try_from_secs_f64(self.expiry.as_secs_f64() * factor)
            .unwrap_or(self.expiry);
        proportional.saturating_add(CLOCK_SLOP)
    }
}

impl std::fmt::Display for RetryPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "expiry={} tries={} delay={} drift_factor={}",
            humantime::format_duration(self.expiry),
            self.tries,
            humantime::format_duration(self.delay),
            self.drift_factor
        )?;
        if let Some(wait) = self.wait {
            write!(f, " wait={}", humantime::format_duration(wait))?;
        }
        Ok(())
    }
}

/// Interval during which an acquired lock may be trusted
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ValidityWindow {
    until: Option<Instant>,
}

impl ValidityWindow {
    /// Window for a lease requested at `start` and confirmed at `end`:
    /// `until = start + expiry - (end - start) - drift_margin`.
    ///
    /// Saturates at `start` when acquisition consumed the whole lease, which
    /// yields a window that is already closed. A deadline past the end of the
    /// clock's range is treated as unbounded.
    pub fn compute(start: Instant, end: Instant, policy: &RetryPolicy) -> Self {
        let elapsed = end.saturating_duration_since(start);
        let remaining = policy
            .expiry
            .saturating_sub(elapsed)
            .saturating_sub(policy.drift_margin());
        Self {
            until: start.checked_add(remaining),
        }
    }

    /// Window for session-scoped locks that last until released
    pub fn unbounded() -> Self {
        Self { until: None }
    }

    pub fn until(&self) -> Option<Instant> {
        self.until
    }

    pub fn is_valid_at(&self, now: Instant) -> bool {
        match self.until {
            Some(until) => now < until,
            None => true,
        }
    }

    /// Time left at `now`; `None` for unbounded windows
    pub fn remaining_at(&self, now: Instant) -> Option<Duration> {
        self.until.map(|until| until.saturating_duration_since(now))
    }
}

#[cfg(test)]
#[path = "policy_tests.rs"]
mod tests;
