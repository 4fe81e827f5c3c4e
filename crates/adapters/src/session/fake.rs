// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake advisory-session node for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::SessionNode;
use crate::NodeError;
use async_trait::async_trait;
use sera_core::LockName;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Recorded session node call
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCall {
    Acquire { name: String, wait: Duration },
    Release { name: String },
}

#[derive(Default)]
struct ServerState {
    /// name -> (session id, nesting count)
    holders: HashMap<String, (u64, u32)>,
    next_session: u64,
    down: bool,
}

/// Server-side lock table of one fake database
#[derive(Clone, Default)]
pub struct FakeSessionStore {
    state: Arc<Mutex<ServerState>>,
}

impl FakeSessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any session currently holds `name`
    pub fn is_locked(&self, name: &LockName) -> bool {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .holders
            .contains_key(name.as_str())
    }

    /// Make every call to this database fail
    pub fn set_down(&self, down: bool) {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).down = down;
    }

    fn open_session(&self) -> u64 {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.next_session += 1;
        state.next_session
    }
}

/// One session (connection) against a [`FakeSessionStore`].
///
/// Like MySQL, locks are re-entrant per session and never block: a contended
/// acquire answers `false` immediately instead of waiting.
#[derive(Clone)]
pub struct FakeSessionNode {
    addr: String,
    session: u64,
    store: FakeSessionStore,
    calls: Arc<Mutex<Vec<SessionCall>>>,
}

impl FakeSessionNode {
    /// A session on a fresh database
    pub fn new(addr: impl Into<String>) -> Self {
        Self::connected_to(addr, FakeSessionStore::new())
    }

    /// A new session on an existing database
    pub fn connected_to(addr: impl Into<String>, store: FakeSessionStore) -> Self {
        let session = store.open_session();
        Self {
            addr: addr.into(),
            session,
            store,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn store(&self) -> &FakeSessionStore {
        &self.store
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<SessionCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn record(&self, call: SessionCall) {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
    }
}

#[async_trait]
impl SessionNode for FakeSessionNode {
    fn addr(&self) -> &str {
        &self.addr
    }

    async fn try_acquire(&self, name: &LockName, wait: Duration) -> Result<bool, NodeError> {
        self.record(SessionCall::Acquire {
            name: name.as_str().to_string(),
            wait,
        });

        let mut state = self.store.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.down {
            return Err(NodeError::Unreachable {
                addr: self.addr.clone(),
            });
        }
        let entry = state
            .holders
            .entry(name.as_str().to_string())
            .or_insert((self.session, 0));
        if entry.0 != self.session {
            return Ok(false);
        }
        entry.1 += 1;
        Ok(true)
    }

    async fn release(&self, name: &LockName) -> Result<bool, NodeError> {
        self.record(SessionCall::Release {
            name: name.as_str().to_string(),
        });

        let mut state = self.store.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.down {
            return Err(NodeError::Unreachable {
                addr: self.addr.clone(),
            });
        }
        let remaining = match state.holders.get_mut(name.as_str()) {
            Some((session, count)) if *session == self.session => {
                *count -= 1;
                *count
            }
            _ => return Ok(false),
        };
        if remaining == 0 {
            state.holders.remove(name.as_str());
        }
        Ok(true)
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
