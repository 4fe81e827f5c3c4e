// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Builds a distributed mutex for the backend named in configuration

use crate::driver::Backend;
use crate::error::MutexError;
use crate::mutex::DistributedMutex;
use sera_adapters::error::redact;
use sera_adapters::{
    MysqlNode, NodeError, RedisNode, SessionNode, TokenNode, TracedSessionNode, TracedTokenNode,
};
use sera_core::{quorum, BackendKind, Config, LockName, RetryPolicy, SystemClock};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

/// Connects the configured nodes and binds them to a named mutex
pub struct MutexFactory {
    config: Config,
    policy: RetryPolicy,
}

impl MutexFactory {
    pub fn new(config: Config) -> Self {
        let policy = config.retry_policy();
        Self { config, policy }
    }

    /// Bound every `lock()` of built mutexes by `wait`
    pub fn with_wait(mut self, wait: Duration) -> Self {
        self.policy.wait = Some(wait);
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Connect every configured server and build a mutex over the ones that
    /// answered.
    ///
    /// Fails with [`MutexError::NoConnect`] unless a majority of the configured
    /// servers connect.
    pub async fn build(&self, name: LockName) -> Result<DistributedMutex, MutexError> {
        let timeout = self.config.connect_timeout;
        let backend = match self.config.backend {
            BackendKind::Redis => {
                self.token_backend(move |addr| async move {
                    let node = RedisNode::connect(&addr, timeout).await?;
                    Ok(Arc::new(TracedTokenNode::new(node)) as Arc<dyn TokenNode>)
                })
                .await?
            }
            BackendKind::Mysql => {
                self.session_backend(move |addr| async move {
                    let node = MysqlNode::connect(&addr, timeout).await?;
                    Ok(Arc::new(TracedSessionNode::new(node)) as Arc<dyn SessionNode>)
                })
                .await?
            }
        };
        self.finish(name, backend)
    }

    async fn token_backend<F, Fut>(&self, connect: F) -> Result<Backend, MutexError>
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = Result<Arc<dyn TokenNode>, NodeError>> + Send + 'static,
    {
        let nodes = connect_all(&self.config.servers, connect).await;
        self.check_reachable(nodes.len())?;
        Ok(Backend::token_nodes(nodes, self.config.op_timeout))
    }

    async fn session_backend<F, Fut>(&self, connect: F) -> Result<Backend, MutexError>
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = Result<Arc<dyn SessionNode>, NodeError>> + Send + 'static,
    {
        let nodes = connect_all(&self.config.servers, connect).await;
        self.check_reachable(nodes.len())?;
        Ok(Backend::session_nodes(nodes, self.config.op_timeout))
    }

    fn finish(&self, name: LockName, backend: Backend) -> Result<DistributedMutex, MutexError> {
        tracing::info!(
            lock = %name,
            backend = %backend.kind(),
            nodes = backend.node_count(),
            configured = self.config.servers.len(),
            policy = %self.policy,
            "mutex ready"
        );
        DistributedMutex::new(name, backend, self.policy.clone(), SystemClock)
    }

    fn check_reachable(&self, live: usize) -> Result<(), MutexError> {
        let needed = quorum(self.config.servers.len());
        if live < needed {
            tracing::warn!(
                live,
                needed,
                configured = self.config.servers.len(),
                "not enough lock nodes reachable"
            );
            return Err(MutexError::NoConnect);
        }
        Ok(())
    }
}

/// Connect to every address concurrently, keeping configuration order and
/// dropping the ones that fail
async fn connect_all<T, F, Fut>(servers: &[String], connect: F) -> Vec<T>
where
    T: Send + 'static,
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<T, NodeError>> + Send + 'static,
{
    let mut tasks = JoinSet::new();
    for (index, addr) in servers.iter().enumerate() {
        let pending = connect(addr.clone());
        tasks.spawn(async move { (index, pending.await) });
    }

    let mut connected = Vec::with_capacity(servers.len());
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, Ok(node))) => connected.push((index, node)),
            Ok((index, Err(e))) => {
                let addr = servers.get(index).map(|a| redact(a)).unwrap_or_default();
                tracing::debug!(node = %addr, error = %e, "can't connect, node excluded");
            }
            Err(e) => tracing::warn!(error = %e, "connect task aborted"),
        }
    }

    connected.sort_by_key(|(index, _)| *index);
    connected.into_iter().map(|(_, node)| node).collect()
}

#[cfg(test)]
#[path = "factory_tests.rs"]
mod tests;
