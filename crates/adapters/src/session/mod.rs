// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Advisory-session nodes: locks owned by one database session

mod mysql;

pub use self::mysql::MysqlNode;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeSessionNode, FakeSessionStore, SessionCall};

use crate::NodeError;
use async_trait::async_trait;
use sera_core::LockName;
use std::time::Duration;

/// One relational node offering session-scoped exclusive locks.
///
/// The node serializes holders itself and may block up to `wait` before
/// answering; a lock lives until released or until the session ends.
#[async_trait]
pub trait SessionNode: Send + Sync + 'static {
    /// Address used in logs
    fn addr(&self) -> &str;

    /// Take `name` for this session, waiting at most `wait` for the holder.
    /// Returns whether the lock was granted.
    async fn try_acquire(&self, name: &LockName, wait: Duration) -> Result<bool, NodeError>;

    /// Release `name` if this session holds it. Returns whether it did.
    async fn release(&self, name: &LockName) -> Result<bool, NodeError>;
}
