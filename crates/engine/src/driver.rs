// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Backend drivers: one lock primitive applied across a node set
//!
//! Every node is contacted concurrently so a slow or dead node costs at most
//! one `op_timeout`, never the sum of all of them.

use sera_adapters::{NodeError, SessionNode, TokenNode};
use sera_core::{BackendKind, LockName, LockToken};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::Instrument;

/// Answer of one node to one primitive call
#[derive(Debug)]
pub enum NodeOutcome {
    Granted,
    Refused,
    Failed(NodeError),
}

impl NodeOutcome {
    fn from_result(result: Result<bool, NodeError>) -> Self {
        match result {
            Ok(true) => Self::Granted,
            Ok(false) => Self::Refused,
            Err(e) => Self::Failed(e),
        }
    }
}

/// Per-node outcomes of one fan-out, in node order
#[derive(Debug, Default)]
pub struct Tally {
    pub outcomes: Vec<NodeOutcome>,
}

impl Tally {
    pub fn granted(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, NodeOutcome::Granted))
            .count()
    }

    /// Nodes that answered at all, granted or refused
    pub fn responded(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| !matches!(o, NodeOutcome::Failed(_)))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.responded()
    }
}

/// Quorum-token driver over cache-style nodes
pub struct QuorumTokenDriver {
    nodes: Vec<Arc<dyn TokenNode>>,
    op_timeout: Duration,
}

impl QuorumTokenDriver {
    pub fn new(nodes: Vec<Arc<dyn TokenNode>>, op_timeout: Duration) -> Self {
        Self { nodes, op_timeout }
    }

    async fn acquire(&self, name: &LockName, token: &LockToken, lease: Duration) -> Tally {
        let calls = self.nodes.iter().map(|node| {
            let node = Arc::clone(node);
            let name = name.clone();
            let token = token.clone();
            let addr = node.addr().to_string();
            (addr, async move { node.try_acquire(&name, &token, lease).await })
        });
        fan_out(calls.collect(), self.op_timeout).await
    }

    async fn release(&self, name: &LockName, token: &LockToken) -> Tally {
        let calls = self.nodes.iter().map(|node| {
            let node = Arc::clone(node);
            let name = name.clone();
            let token = token.clone();
            let addr = node.addr().to_string();
            (addr, async move { node.release_if_owned(&name, &token).await })
        });
        fan_out(calls.collect(), self.op_timeout).await
    }
}

/// Advisory-session driver over relational nodes
pub struct AdvisorySessionDriver {
    nodes: Vec<Arc<dyn SessionNode>>,
    op_timeout: Duration,
}

impl AdvisorySessionDriver {
    pub fn new(nodes: Vec<Arc<dyn SessionNode>>, op_timeout: Duration) -> Self {
        Self { nodes, op_timeout }
    }

    async fn acquire(&self, name: &LockName, wait: Duration) -> Tally {
        let calls = self.nodes.iter().map(|node| {
            let node = Arc::clone(node);
            let name = name.clone();
            let addr = node.addr().to_string();
            (addr, async move { node.try_acquire(&name, wait).await })
        });
        // The node itself blocks up to `wait`; only the round trip is bounded
        fan_out(calls.collect(), self.op_timeout.saturating_add(wait)).await
    }

    async fn release(&self, name: &LockName) -> Tally {
        let calls = self.nodes.iter().map(|node| {
            let node = Arc::clone(node);
            let name = name.clone();
            let addr = node.addr().to_string();
            (addr, async move { node.release(&name).await })
        });
        fan_out(calls.collect(), self.op_timeout).await
    }
}

/// The lock primitive a mutex drives, selected from configuration
pub enum Backend {
    QuorumToken(QuorumTokenDriver),
    AdvisorySession(AdvisorySessionDriver),
}

impl Backend {
    pub fn token_nodes(nodes: Vec<Arc<dyn TokenNode>>, op_timeout: Duration) -> Self {
        Self::QuorumToken(QuorumTokenDriver::new(nodes, op_timeout))
    }

    pub fn session_nodes(nodes: Vec<Arc<dyn SessionNode>>, op_timeout: Duration) -> Self {
        Self::AdvisorySession(AdvisorySessionDriver::new(nodes, op_timeout))
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            Self::QuorumToken(_) => BackendKind::Redis,
            Self::AdvisorySession(_) => BackendKind::Mysql,
        }
    }

    pub fn node_count(&self) -> usize {
        match self {
            Self::QuorumToken(d) => d.nodes.len(),
            Self::AdvisorySession(d) => d.nodes.len(),
        }
    }

    /// Whether held locks expire on the nodes by themselves
    pub fn lease_expires(&self) -> bool {
        matches!(self, Self::QuorumToken(_))
    }

    /// Ask every node for the lock.
    ///
    /// Token nodes get `lease` as their expiry; session nodes may block up to
    /// `wait`.
    pub async fn acquire_all(
        &self,
        name: &LockName,
        token: &LockToken,
        lease: Duration,
        wait: Duration,
    ) -> Tally {
        match self {
            Self::QuorumToken(d) => d.acquire(name, token, lease).await,
            Self::AdvisorySession(d) => d.acquire(name, wait).await,
        }
    }

    /// Release on every node, only where `token` (or this session) still owns it
    pub async fn release_all(&self, name: &LockName, token: &LockToken) -> Tally {
        match self {
            Self::QuorumToken(d) => d.release(name, token).await,
            Self::AdvisorySession(d) => d.release(name).await,
        }
    }
}

async fn fan_out<F>(calls: Vec<(String, F)>, limit: Duration) -> Tally
where
    F: Future<Output = Result<bool, NodeError>> + Send + 'static,
{
    let addrs: Vec<String> = calls.iter().map(|(addr, _)| addr.clone()).collect();
    let mut tasks = JoinSet::new();

    for (index, (addr, call)) in calls.into_iter().enumerate() {
        tasks.spawn(
            async move {
                let result = match tokio::time::timeout(limit, call).await {
                    Ok(result) => result,
                    Err(_) => Err(NodeError::Timeout {
                        addr,
                        timeout: limit,
                    }),
                };
                (index, NodeOutcome::from_result(result))
            }
            .instrument(tracing::Span::current()),
        );
    }

    let mut slots: Vec<Option<NodeOutcome>> = addrs.iter().map(|_| None).collect();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, outcome)) => {
                if let NodeOutcome::Failed(e) = &outcome {
                    tracing::debug!(error = %e, "node counted as not acquired");
                }
                slots[index] = Some(outcome);
            }
            Err(e) => tracing::warn!(error = %e, "node task aborted"),
        }
    }

    let outcomes = slots
        .into_iter()
        .zip(addrs)
        .map(|(slot, addr)| {
            slot.unwrap_or_else(|| {
                NodeOutcome::Failed(NodeError::Protocol {
                    addr,
                    message: "node task aborted".to_string(),
                })
            })
        })
        .collect();

    Tally { outcomes }
}

#[cfg(test)]
#[path = "driver_tests.rs"]
mod tests;
