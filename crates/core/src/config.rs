// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Decoded sera configuration
//!
//! Reading and parsing the file is left to the caller; this module only
//! describes the shape and validates it.

use crate::policy::{RetryPolicy, DEFAULT_DELAY, DEFAULT_DRIFT_FACTOR, DEFAULT_EXPIRY, DEFAULT_TRIES};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(500);
pub const DEFAULT_OP_TIMEOUT: Duration = Duration::from_millis(500);

/// Longest lease a configuration may request
pub const MAX_EXPIRY: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("no backend configured")]
    MissingBackend,
    #[error("unknown backend '{0}' (expected 'redis' or 'mysql')")]
    UnknownBackend(String),
    #[error("no servers configured for backend '{0}'")]
    NoServers(BackendKind),
    #[error("expiry must be between 1ms and 24h, got {0:?}")]
    InvalidExpiry(Duration),
    #[error("drift_factor must be at least 0 and below 1, got {0}")]
    InvalidDriftFactor(f64),
}

/// Family of lock storage nodes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Cache-style nodes offering set-if-absent with expiry
    Redis,
    /// Relational nodes offering session advisory locks
    Mysql,
}

impl BackendKind {
    pub fn parse(name: &str) -> Result<Self, ConfigError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "redis" => Ok(Self::Redis),
            "mysql" => Ok(Self::Mysql),
            "" => Err(ConfigError::MissingBackend),
            other => Err(ConfigError::UnknownBackend(other.to_string())),
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Redis => write!(f, "redis"),
            Self::Mysql => write!(f, "mysql"),
        }
    }
}

/// Configuration file as written on disk
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    pub backend: Option<String>,
    pub servers: Vec<String>,
    /// Single-server form kept for older config files
    pub server: Option<String>,
    pub verbose: bool,
    pub syslog: bool,
    #[serde(with = "humantime_serde")]
    pub expiry: Option<Duration>,
    pub tries: Option<u32>,
    #[serde(with = "humantime_serde")]
    pub delay: Option<Duration>,
    pub drift_factor: Option<f64>,
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Option<Duration>,
    #[serde(with = "humantime_serde")]
    pub op_timeout: Option<Duration>,
    pub hash_names: Option<bool>,
    pub stats_file: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
}

/// Validated configuration handed to the mutex factory
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub backend: BackendKind,
    /// Node addresses in configured order
    pub servers: Vec<String>,
    pub verbose: bool,
    pub syslog: bool,
    pub policy: RetryPolicy,
    /// Bound on establishing each node connection
    pub connect_timeout: Duration,
    /// Bound on each primitive call to a node
    pub op_timeout: Duration,
    pub hash_names: bool,
    pub stats_file: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
}

impl Config {
    /// Configuration for `backend` with defaults for everything else
    pub fn new(backend: BackendKind, servers: Vec<String>) -> Self {
        Self {
            backend,
            servers,
            verbose: false,
            syslog: false,
            policy: RetryPolicy::default(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            op_timeout: DEFAULT_OP_TIMEOUT,
            hash_names: true,
            stats_file: None,
            log_file: None,
        }
    }

    /// Retry policy with the configured overrides applied
    pub fn retry_policy(&self) -> RetryPolicy {
        self.policy.clone()
    }
}

impl TryFrom<RawConfig> for Config {
    type Error = ConfigError;

    fn try_from(raw: RawConfig) -> Result<Self, Self::Error> {
        let backend = BackendKind::parse(raw.backend.as_deref().unwrap_or_default())?;

        let mut servers: Vec<String> = raw
            .servers
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if servers.is_empty() {
            if let Some(server) = raw.server.filter(|s| !s.trim().is_empty()) {
                servers.push(server.trim().to_string());
            }
        }
        if servers.is_empty() {
            return Err(ConfigError::NoServers(backend));
        }

        let expiry = raw.expiry.unwrap_or(DEFAULT_EXPIRY);
        if expiry < Duration::from_millis(1) || expiry > MAX_EXPIRY {
            return Err(ConfigError::InvalidExpiry(expiry));
        }
        let drift_factor = raw.drift_factor.unwrap_or(DEFAULT_DRIFT_FACTOR);
        if !(0.0..1.0).contains(&drift_factor) {
            return Err(ConfigError::InvalidDriftFactor(drift_factor));
        }

        let policy = RetryPolicy {
            expiry,
            tries: raw.tries.unwrap_or(DEFAULT_TRIES),
            delay: raw.delay.unwrap_or(DEFAULT_DELAY),
            drift_factor,
            wait: None,
        };

        Ok(Self {
            backend,
            servers,
            verbose: raw.verbose,
            syslog: raw.syslog,
            policy,
            connect_timeout: raw.connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT),
            op_timeout: raw.op_timeout.unwrap_or(DEFAULT_OP_TIMEOUT),
            hash_names: raw.hash_names.unwrap_or(true),
            stats_file: raw.stats_file,
            log_file: raw.log_file,
        })
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
