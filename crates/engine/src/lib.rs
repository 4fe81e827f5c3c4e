// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! sera locking engine
//!
//! Backend drivers, the quorum mutex built on them, and the supervised run
//! that executes a command while the mutex is held.

mod driver;
mod error;
mod factory;
mod mode;
mod mutex;
mod observer;
mod supervisor;

pub use driver::{AdvisorySessionDriver, Backend, NodeOutcome, QuorumTokenDriver, Tally};
pub use error::{MutexError, RunError, SupervisorError};
pub use factory::MutexFactory;
pub use mode::{Coordinator, ExecutionMode, RunOutcome};
pub use mutex::DistributedMutex;
pub use observer::{NoopObserver, RunObserver};
pub use supervisor::{CommandSupervisor, SharedBuffer, Sink};
