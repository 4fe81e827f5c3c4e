// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Execution modes: how a run uses the mutex around its command

use crate::error::{MutexError, RunError};
use crate::mutex::DistributedMutex;
use crate::observer::RunObserver;
use crate::supervisor::CommandSupervisor;
use sera_core::{exit, Clock};
use std::fmt;

/// Policy for concurrent invocations of the same command
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Every invocation runs the command, one at a time
    #[default]
    EveryoneExecutes,
    /// The first invocation runs the command; the rest wait for it to finish
    /// and exit without running it.
    ///
    /// Best effort only: a follower that starts probing after the leader
    /// already released becomes a leader itself and runs the command again.
    WaitAndSkip,
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EveryoneExecutes => write!(f, "everyone-executes"),
            Self::WaitAndSkip => write!(f, "wait-and-skip"),
        }
    }
}

/// Result of one coordinated run
#[derive(Debug)]
pub struct RunOutcome {
    /// Process exit code to report
    pub exit_code: i32,
    /// Whether this invocation ran the command
    pub ran_command: bool,
    /// What went wrong, for logging
    pub error: Option<RunError>,
}

impl RunOutcome {
    fn skipped() -> Self {
        Self {
            exit_code: exit::SUCCESS,
            ran_command: false,
            error: None,
        }
    }

    fn lock_failed(error: MutexError) -> Self {
        Self {
            exit_code: error.exit_code(),
            ran_command: false,
            error: Some(error.into()),
        }
    }
}

/// Drives the supervisor under the mutex according to an [`ExecutionMode`]
#[derive(Clone, Debug, Default)]
pub struct Coordinator {
    supervisor: CommandSupervisor,
}

impl Coordinator {
    pub fn new(supervisor: CommandSupervisor) -> Self {
        Self { supervisor }
    }

    pub async fn run<C: Clock>(
        &self,
        mode: ExecutionMode,
        mutex: &DistributedMutex<C>,
        argv: &[String],
        observer: &mut dyn RunObserver,
    ) -> RunOutcome {
        observer.started(argv, mutex.policy().wait.unwrap_or_default());
        tracing::debug!(%mode, lock = %mutex.name(), "coordinating run");

        let outcome = match mode {
            ExecutionMode::EveryoneExecutes => match mutex.lock().await {
                Ok(()) => self.run_locked(mutex, argv, observer).await,
                Err(e) => RunOutcome::lock_failed(e),
            },
            ExecutionMode::WaitAndSkip => self.lead_or_follow(mutex, argv, observer).await,
        };

        observer.stopped(outcome.exit_code);
        outcome
    }

    async fn lead_or_follow<C: Clock>(
        &self,
        mutex: &DistributedMutex<C>,
        argv: &[String],
        observer: &mut dyn RunObserver,
    ) -> RunOutcome {
        match mutex.try_lock().await {
            Ok(true) => {
                tracing::info!(lock = %mutex.name(), "leading, running command");
                self.run_locked(mutex, argv, observer).await
            }
            Ok(false) => {
                tracing::info!(lock = %mutex.name(), "another run holds the lock, waiting for it");
                // Holding the lock proves the leader is done; give it straight back
                if let Err(e) = mutex.lock().await {
                    return RunOutcome::lock_failed(e);
                }
                if let Err(e) = mutex.unlock().await {
                    tracing::warn!(error = %e, "failed to hand back lock");
                }
                tracing::info!(lock = %mutex.name(), "leader finished, skipping command");
                RunOutcome::skipped()
            }
            Err(e) => RunOutcome::lock_failed(e),
        }
    }

    async fn run_locked<C: Clock>(
        &self,
        mutex: &DistributedMutex<C>,
        argv: &[String],
        observer: &mut dyn RunObserver,
    ) -> RunOutcome {
        observer.lock_acquired();

        let outcome = match self.supervisor.run(argv).await {
            Ok(code) => RunOutcome {
                exit_code: code,
                ran_command: true,
                error: None,
            },
            Err(e) => RunOutcome {
                exit_code: exit::COMMAND_RUN_FAILED,
                ran_command: false,
                error: Some(e.into()),
            },
        };

        if !mutex.still_valid().await {
            tracing::warn!(
                lock = %mutex.name(),
                "lock lease ran out while the command was running"
            );
        }
        if let Err(e) = mutex.unlock().await {
            tracing::warn!(error = %e, "failed to release lock");
        }
        outcome
    }
}

#[cfg(test)]
#[path = "mode_tests.rs"]
mod tests;
