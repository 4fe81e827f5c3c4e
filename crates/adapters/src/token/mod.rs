// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Quorum-token nodes: set-if-absent with expiry, compare-and-delete release

mod redis;

pub use self::redis::RedisNode;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeTokenNode, FakeTokenStore, TokenCall};

use crate::NodeError;
use async_trait::async_trait;
use sera_core::{LockName, LockToken};
use std::time::Duration;

/// One cache-style node holding lock entries with an expiry.
///
/// Both operations must be atomic on the node side.
#[async_trait]
pub trait TokenNode: Send + Sync + 'static {
    /// Address used in logs
    fn addr(&self) -> &str;

    /// Store `token` under `name` for `ttl` unless the name is already set.
    /// Returns whether this call created the entry.
    async fn try_acquire(
        &self,
        name: &LockName,
        token: &LockToken,
        ttl: Duration,
    ) -> Result<bool, NodeError>;

    /// Delete `name` only while it still holds `token`.
    /// Returns whether an entry was deleted.
    async fn release_if_owned(&self, name: &LockName, token: &LockToken)
        -> Result<bool, NodeError>;
}
