// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lock identity: names, ownership tokens and quorum size

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Name of the mutually exclusive resource shared by every node
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LockName(String);

impl LockName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Derive a name from a wrapped command line.
    ///
    /// Arguments are joined with single spaces. With `hashed` the result is the
    /// SHA-256 hex digest of that line, which always fits the 64 character
    /// limit of MySQL lock names.
    pub fn from_command(argv: &[String], hashed: bool) -> Self {
        let line = argv.join(" ");
        if hashed {
            Self::digest_of(&line)
        } else {
            Self(line)
        }
    }

    /// Fixed-width digest of arbitrary text
    pub fn digest_of(text: &str) -> Self {
        let digest = Sha256::digest(text.as_bytes());
        Self(hex_encode(&digest))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LockName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Random value proving which acquisition attempt owns a lock entry
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LockToken(String);

impl LockToken {
    /// A fresh token; every attempt must use a new one
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for LockToken {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl std::fmt::Display for LockToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Majority of `nodes`: `nodes / 2 + 1`
pub fn quorum(nodes: usize) -> usize {
    nodes / 2 + 1
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;
