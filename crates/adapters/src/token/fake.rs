// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake token node for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::TokenNode;
use crate::NodeError;
use async_trait::async_trait;
use sera_core::{FakeClock, LockName, LockToken};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Recorded token node call
#[derive(Debug, Clone, PartialEq)]
pub enum TokenCall {
    Acquire {
        name: String,
        token: String,
        ttl: Duration,
    },
    Release {
        name: String,
        token: String,
    },
}

#[derive(Default)]
struct StoreState {
    entries: HashMap<String, String>,
    down: bool,
}

/// Server-side state of one fake node, shared by every client connected to it
#[derive(Clone, Default)]
pub struct FakeTokenStore {
    state: Arc<Mutex<StoreState>>,
}

impl FakeTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current token stored under `name`
    pub fn value(&self, name: &LockName) -> Option<String> {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entries
            .get(name.as_str())
            .cloned()
    }

    /// Put a foreign holder's token in place
    pub fn insert(&self, name: &LockName, token: &str) {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entries
            .insert(name.as_str().to_string(), token.to_string());
    }

    /// Drop an entry as if its lease ran out
    pub fn expire(&self, name: &LockName) {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entries
            .remove(name.as_str());
    }

    /// Make every call to this node fail
    pub fn set_down(&self, down: bool) {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).down = down;
    }
}

/// Client handle to a [`FakeTokenStore`]
#[derive(Clone)]
pub struct FakeTokenNode {
    addr: String,
    store: FakeTokenStore,
    calls: Arc<Mutex<Vec<TokenCall>>>,
    latency: Option<(FakeClock, Duration)>,
}

impl FakeTokenNode {
    /// A node with its own fresh store
    pub fn new(addr: impl Into<String>) -> Self {
        Self::connected_to(addr, FakeTokenStore::new())
    }

    /// Another client of an existing store
    pub fn connected_to(addr: impl Into<String>, store: FakeTokenStore) -> Self {
        Self {
            addr: addr.into(),
            store,
            calls: Arc::new(Mutex::new(Vec::new())),
            latency: None,
        }
    }

    /// Advance `clock` by `by` on every acquire, modelling a slow round trip
    pub fn with_latency(mut self, clock: FakeClock, by: Duration) -> Self {
        self.latency = Some((clock, by));
        self
    }

    pub fn store(&self) -> &FakeTokenStore {
        &self.store
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<TokenCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn record(&self, call: TokenCall) {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
    }
}

#[async_trait]
impl TokenNode for FakeTokenNode {
    fn addr(&self) -> &str {
        &self.addr
    }

    async fn try_acquire(
        &self,
        name: &LockName,
        token: &LockToken,
        ttl: Duration,
    ) -> Result<bool, NodeError> {
        self.record(TokenCall::Acquire {
            name: name.as_str().to_string(),
            token: token.as_str().to_string(),
            ttl,
        });

        if let Some((clock, by)) = &self.latency {
            clock.advance(*by);
        }

        let mut state = self.store.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.down {
            return Err(NodeError::Unreachable {
                addr: self.addr.clone(),
            });
        }
        if state.entries.contains_key(name.as_str()) {
            return Ok(false);
        }
        state
            .entries
            .insert(name.as_str().to_string(), token.as_str().to_string());
        Ok(true)
    }

    async fn release_if_owned(
        &self,
        name: &LockName,
        token: &LockToken,
    ) -> Result<bool, NodeError> {
        self.record(TokenCall::Release {
            name: name.as_str().to_string(),
            token: token.as_str().to_string(),
        });

        let mut state = self.store.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.down {
            return Err(NodeError::Unreachable {
                addr: self.addr.clone(),
            });
        }
        if state.entries.get(name.as_str()).map(String::as_str) == Some(token.as_str()) {
            state.entries.remove(name.as_str());
            return Ok(true);
        }
        Ok(false)
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
