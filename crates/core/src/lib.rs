// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! sera-core: shared types for the sera quorum lock
//!
//! This crate provides:
//! - Lock names, ownership tokens and quorum arithmetic
//! - Retry policy and drift-compensated validity windows
//! - The decoded configuration handed to the mutex factory
//! - A clock abstraction and the process exit codes

pub mod clock;
pub mod config;
pub mod exit;
pub mod lock;
pub mod policy;

pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{BackendKind, Config, ConfigError, RawConfig};
pub use lock::{quorum, LockName, LockToken};
pub use policy::{RetryPolicy, ValidityWindow};
