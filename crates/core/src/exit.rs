// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process exit codes
//!
//! Allocated above the range commands normally use so a wrapped command's own
//! exit code can be passed through unchanged.

pub const SUCCESS: i32 = 0;
pub const BAD_CONFIG_FILE: i32 = 200;
pub const BAD_ARGUMENTS: i32 = 201;
pub const LOCK_FAILED: i32 = 202;
pub const COMMAND_RUN_FAILED: i32 = 203;
pub const LOCK_TIMED_OUT: i32 = 204;
