// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Distributed mutex: quorum acquisition with retry and drift compensation
//!
//! One attempt asks every node for the lock with a fresh token, then accepts
//! the result only when a quorum granted it and the drift-compensated validity
//! window is still open. A missed attempt releases whatever it got on every
//! node (compare-and-delete, so later holders are never disturbed) before the
//! next try.

use crate::driver::{Backend, Tally};
use crate::error::MutexError;
use sera_core::{quorum, Clock, LockName, LockToken, RetryPolicy, SystemClock, ValidityWindow};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

#[derive(Debug, Clone)]
struct Held {
    token: LockToken,
    validity: ValidityWindow,
}

enum Attempt {
    Acquired(Held),
    Missed { granted: usize, responded: usize },
}

/// A named lock held across a quorum of independent backend nodes
pub struct DistributedMutex<C: Clock = SystemClock> {
    name: LockName,
    backend: Backend,
    policy: RetryPolicy,
    quorum: usize,
    clock: C,
    held: Mutex<Option<Held>>,
}

impl<C: Clock> DistributedMutex<C> {
    /// Bind a mutex to the live nodes of `backend`.
    ///
    /// The quorum is fixed here from the node count.
    pub fn new(
        name: LockName,
        backend: Backend,
        policy: RetryPolicy,
        clock: C,
    ) -> Result<Self, MutexError> {
        let nodes = backend.node_count();
        if nodes == 0 {
            return Err(MutexError::NoConnect);
        }
        Ok(Self {
            name,
            backend,
            policy,
            quorum: quorum(nodes),
            clock,
            held: Mutex::new(None),
        })
    }

    pub fn name(&self) -> &LockName {
        &self.name
    }

    pub fn quorum(&self) -> usize {
        self.quorum
    }

    pub fn node_count(&self) -> usize {
        self.backend.node_count()
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn set_expiry(&mut self, expiry: Duration) {
        self.policy.expiry = expiry;
    }

    pub fn set_tries(&mut self, tries: u32) {
        self.policy.tries = tries;
    }

    pub fn set_delay(&mut self, delay: Duration) {
        self.policy.delay = delay;
    }

    pub fn set_factor(&mut self, factor: f64) {
        self.policy.drift_factor = factor;
    }

    pub fn set_wait(&mut self, wait: Option<Duration>) {
        self.policy.wait = wait;
    }

    pub async fn is_held(&self) -> bool {
        self.held.lock().await.is_some()
    }

    /// Validity window of the current hold, if any
    pub async fn validity(&self) -> Option<ValidityWindow> {
        self.held.lock().await.as_ref().map(|h| h.validity)
    }

    /// Whether the current hold can still be trusted right now
    pub async fn still_valid(&self) -> bool {
        let now = self.clock.now();
        self.held
            .lock()
            .await
            .as_ref()
            .is_some_and(|h| h.validity.is_valid_at(now))
    }

    /// Acquire the lock, retrying up to the policy's tries and wait budget
    pub async fn lock(&self) -> Result<(), MutexError> {
        let mut held = self.held.lock().await;
        if held.is_some() {
            return Err(MutexError::AlreadyHeld {
                name: self.name.clone(),
            });
        }

        let tries = self.policy.tries.max(1);
        let started = self.clock.now();

        for attempt in 1..=tries {
            let wait = match self.policy.wait {
                Some(budget) => self.budget_left(budget, started),
                None => self.policy.expiry,
            };

            match self.attempt(wait).await {
                Attempt::Acquired(acquired) => {
                    tracing::info!(
                        lock = %self.name,
                        attempt,
                        quorum = self.quorum,
                        valid_for = ?acquired.validity.remaining_at(self.clock.now()),
                        "lock acquired"
                    );
                    *held = Some(acquired);
                    return Ok(());
                }
                Attempt::Missed { granted, responded } => {
                    tracing::debug!(
                        lock = %self.name,
                        attempt,
                        granted,
                        responded,
                        quorum = self.quorum,
                        "attempt missed quorum"
                    );
                }
            }

            if attempt == tries {
                break;
            }

            let mut pause = self.policy.delay;
            if let Some(budget) = self.policy.wait {
                let left = self.budget_left(budget, started);
                if left.is_zero() {
                    tracing::info!(lock = %self.name, attempt, "gave up waiting for lock");
                    return Err(MutexError::Timeout {
                        name: self.name.clone(),
                        waited: budget,
                    });
                }
                pause = pause.min(left);
            }
            tracing::debug!(lock = %self.name, pause_ms = pause.as_millis() as u64, "retrying");
            tokio::time::sleep(pause).await;
        }

        if let Some(budget) = self.policy.wait {
            if self.budget_left(budget, started).is_zero() {
                return Err(MutexError::Timeout {
                    name: self.name.clone(),
                    waited: budget,
                });
            }
        }

        tracing::info!(lock = %self.name, tries, "failed to acquire lock");
        Err(MutexError::Failed {
            name: self.name.clone(),
            attempts: tries,
        })
    }

    /// Try once without waiting.
    ///
    /// `Ok(false)` means another holder has it. Errors when fewer than a quorum
    /// of nodes answered at all, since then the lock state is unknown.
    pub async fn try_lock(&self) -> Result<bool, MutexError> {
        let mut held = self.held.lock().await;
        if held.is_some() {
            return Err(MutexError::AlreadyHeld {
                name: self.name.clone(),
            });
        }

        match self.attempt(Duration::ZERO).await {
            Attempt::Acquired(acquired) => {
                tracing::info!(lock = %self.name, quorum = self.quorum, "lock acquired");
                *held = Some(acquired);
                Ok(true)
            }
            Attempt::Missed { responded, .. } if responded < self.quorum => {
                Err(MutexError::QuorumUnreachable {
                    name: self.name.clone(),
                    responded,
                    quorum: self.quorum,
                })
            }
            Attempt::Missed { granted, .. } => {
                tracing::debug!(lock = %self.name, granted, "lock is taken");
                Ok(false)
            }
        }
    }

    /// Release the lock on every node still holding this mutex's token.
    ///
    /// Unlocking a mutex that is not held is a caller bug and reported as
    /// [`MutexError::NotHeld`].
    pub async fn unlock(&self) -> Result<(), MutexError> {
        let mut held = self.held.lock().await;
        let Some(current) = held.take() else {
            return Err(MutexError::NotHeld {
                name: self.name.clone(),
            });
        };

        let tally = self.backend.release_all(&self.name, &current.token).await;
        tracing::info!(
            lock = %self.name,
            released = tally.granted(),
            unreachable = tally.failed(),
            "lock released"
        );
        Ok(())
    }

    async fn attempt(&self, wait: Duration) -> Attempt {
        let token = LockToken::generate();
        let start = self.clock.now();
        let tally = self
            .backend
            .acquire_all(&self.name, &token, self.policy.expiry, wait)
            .await;
        let end = self.clock.now();

        let validity = if self.backend.lease_expires() {
            ValidityWindow::compute(start, end, &self.policy)
        } else {
            ValidityWindow::unbounded()
        };

        let granted = tally.granted();
        if granted >= self.quorum && validity.is_valid_at(self.clock.now()) {
            return Attempt::Acquired(Held { token, validity });
        }

        if granted >= self.quorum {
            tracing::debug!(
                lock = %self.name,
                elapsed_ms = end.saturating_duration_since(start).as_millis() as u64,
                "quorum reached too late, lease already unsafe"
            );
        }
        self.clean_up(&token, &tally).await;

        Attempt::Missed {
            granted,
            responded: tally.responded(),
        }
    }

    async fn clean_up(&self, token: &LockToken, tally: &Tally) {
        if tally.granted() == 0 && tally.failed() == 0 {
            return;
        }
        // Release everywhere: a node that timed out may still have applied the grant
        let released = self.backend.release_all(&self.name, token).await;
        tracing::debug!(lock = %self.name, released = released.granted(), "cleaned up attempt");
    }

    fn budget_left(&self, budget: Duration, started: Instant) -> Duration {
        budget.saturating_sub(self.clock.elapsed_since(started))
    }
}

#[cfg(test)]
#[path = "mutex_tests.rs"]
mod tests;
