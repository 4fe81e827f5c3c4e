// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Lock node clients: one connection to one backend server each

pub mod error;
pub mod session;
pub mod token;
pub mod traced;

pub use error::NodeError;
pub use session::{MysqlNode, SessionNode};
pub use token::{RedisNode, TokenNode};
pub use traced::{TracedSessionNode, TracedTokenNode};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use session::{FakeSessionNode, FakeSessionStore, SessionCall};
#[cfg(any(test, feature = "test-support"))]
pub use token::{FakeTokenNode, FakeTokenStore, TokenCall};
