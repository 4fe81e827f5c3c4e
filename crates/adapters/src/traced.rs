// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced node wrappers for consistent observability

use crate::session::SessionNode;
use crate::token::TokenNode;
use crate::NodeError;
use async_trait::async_trait;
use sera_core::{LockName, LockToken};
use std::time::{Duration, Instant};
use tracing::Instrument;

/// Wrapper that adds tracing to any TokenNode
#[derive(Clone)]
pub struct TracedTokenNode<N> {
    inner: N,
}

impl<N> TracedTokenNode<N> {
    pub fn new(inner: N) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<N: TokenNode> TokenNode for TracedTokenNode<N> {
    fn addr(&self) -> &str {
        self.inner.addr()
    }

    async fn try_acquire(
        &self,
        name: &LockName,
        token: &LockToken,
        ttl: Duration,
    ) -> Result<bool, NodeError> {
        let span = tracing::debug_span!("node.acquire", node = self.addr(), lock = %name);

        async {
            // Precondition: a zero lease would be rejected by the node anyway
            if ttl.is_zero() {
                tracing::error!("lease must be positive");
                return Err(NodeError::Protocol {
                    addr: self.addr().to_string(),
                    message: "lease must be positive".to_string(),
                });
            }

            let start = Instant::now();
            let result = self.inner.try_acquire(name, token, ttl).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match &result {
                Ok(true) => tracing::debug!(elapsed_ms, "lock acquired"),
                Ok(false) => tracing::debug!(elapsed_ms, "lock already taken"),
                Err(e) => tracing::debug!(elapsed_ms, error = %e, "acquire failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn release_if_owned(
        &self,
        name: &LockName,
        token: &LockToken,
    ) -> Result<bool, NodeError> {
        let span = tracing::debug_span!("node.release", node = self.addr(), lock = %name);

        async {
            let result = self.inner.release_if_owned(name, token).await;
            // Not owning the entry any more is normal after a lease expired
            match &result {
                Ok(true) => tracing::debug!("released"),
                Ok(false) => tracing::debug!("not owned, left in place"),
                Err(e) => tracing::debug!(error = %e, "release failed"),
            }
            result
        }
        .instrument(span)
        .await
    }
}

/// Wrapper that adds tracing to any SessionNode
#[derive(Clone)]
pub struct TracedSessionNode<N> {
    inner: N,
}

impl<N> TracedSessionNode<N> {
    pub fn new(inner: N) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<N: SessionNode> SessionNode for TracedSessionNode<N> {
    fn addr(&self) -> &str {
        self.inner.addr()
    }

    async fn try_acquire(&self, name: &LockName, wait: Duration) -> Result<bool, NodeError> {
        let span = tracing::debug_span!("node.acquire", node = self.addr(), lock = %name);

        async {
            tracing::debug!(wait_ms = wait.as_millis() as u64, "waiting for session lock");

            let start = Instant::now();
            let result = self.inner.try_acquire(name, wait).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match &result {
                Ok(true) => tracing::debug!(elapsed_ms, "lock acquired"),
                Ok(false) => tracing::debug!(elapsed_ms, "lock held by another session"),
                Err(e) => tracing::debug!(elapsed_ms, error = %e, "acquire failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn release(&self, name: &LockName) -> Result<bool, NodeError> {
        let span = tracing::debug_span!("node.release", node = self.addr(), lock = %name);

        async {
            let result = self.inner.release(name).await;
            match &result {
                Ok(true) => tracing::debug!("released"),
                Ok(false) => tracing::debug!("not held by this session"),
                Err(e) => tracing::debug!(error = %e, "release failed"),
            }
            result
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
