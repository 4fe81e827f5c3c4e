// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for locking and supervised runs

use sera_core::{exit, LockName};
use std::time::Duration;
use thiserror::Error;

/// Errors from the distributed mutex
#[derive(Debug, Error)]
pub enum MutexError {
    #[error("failed to connect to any lock node")]
    NoConnect,
    #[error("failed to acquire lock '{name}' after {attempts} attempts")]
    Failed { name: LockName, attempts: u32 },
    #[error("timed out after {waited:?} waiting for lock '{name}'")]
    Timeout { name: LockName, waited: Duration },
    #[error("only {responded} nodes answered for lock '{name}', {quorum} needed")]
    QuorumUnreachable {
        name: LockName,
        responded: usize,
        quorum: usize,
    },
    #[error("unlock of unlocked mutex '{name}'")]
    NotHeld { name: LockName },
    #[error("lock '{name}' is already held by this mutex")]
    AlreadyHeld { name: LockName },
}

impl MutexError {
    /// Contract violations by the caller; never retry these
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::NotHeld { .. } | Self::AlreadyHeld { .. })
    }

    /// Process exit code reported when locking fails this way
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Timeout { .. } => exit::LOCK_TIMED_OUT,
            _ => exit::LOCK_FAILED,
        }
    }
}

/// Errors from launching the wrapped command
#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("no command given")]
    EmptyCommand,
    #[error("failed to start '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed waiting for '{program}': {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors surfaced by a supervised run, for logging
#[derive(Debug, Error)]
pub enum RunError {
    #[error("lock error: {0}")]
    Lock(#[from] MutexError),
    #[error("command error: {0}")]
    Command(#[from] SupervisorError),
}
