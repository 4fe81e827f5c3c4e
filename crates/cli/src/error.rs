// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User-friendly error display with context and suggestions.
//!
//! Each error also carries the process exit code it maps to.

use sera_adapters::error::redact;
use sera_core::exit;
use std::fmt;
use std::path::{Path, PathBuf};

/// Error with context and recovery suggestions for user-friendly display.
#[derive(Debug)]
pub struct SeraError {
    /// What went wrong
    pub message: String,
    /// Why it might have happened
    pub context: Vec<String>,
    /// How to fix it
    pub suggestions: Vec<String>,
    /// Exit code reported for this error
    pub exit_code: i32,
    /// Original error if any
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl SeraError {
    pub fn new(message: impl Into<String>, exit_code: i32) -> Self {
        Self {
            message: message.into(),
            context: Vec::new(),
            suggestions: Vec::new(),
            exit_code,
            source: None,
        }
    }

    /// Add context about why this error might have happened.
    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        self.context.push(ctx.into());
        self
    }

    /// Add a suggestion for how to fix this error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Set the source error that caused this error.
    pub fn with_source<E: std::error::Error + Send + Sync + 'static>(mut self, source: E) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

impl fmt::Display for SeraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "error: {}", self.message)?;

        if !self.context.is_empty() {
            writeln!(f)?;
            for ctx in &self.context {
                writeln!(f, "  -> {}", ctx)?;
            }
        }

        if !self.suggestions.is_empty() {
            writeln!(f)?;
            writeln!(f, "suggestions:")?;
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                writeln!(f, "  {}. {}", i + 1, suggestion)?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for SeraError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Common error builders for typical failure scenarios.
impl SeraError {
    /// No configuration file in any searched location.
    pub fn config_not_found(searched: &[PathBuf]) -> Self {
        let mut err = SeraError::new("No configuration file found", exit::BAD_CONFIG_FILE);
        for path in searched {
            err = err.with_context(format!("Looked for {}", path.display()));
        }
        err.with_suggestion("Create /etc/sera.json with a backend and its servers")
            .with_suggestion("Point at a file explicitly: sera --config <path> run ...")
    }

    /// The configuration file exists but cannot be used.
    pub fn config_invalid(
        path: &Path,
        reason: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        SeraError::new(
            format!("Invalid configuration in {}", path.display()),
            exit::BAD_CONFIG_FILE,
        )
        .with_context(reason.to_string())
        .with_suggestion(r#"A minimal file: {"backend": "redis", "servers": ["127.0.0.1:6379"]}"#)
        .with_source(reason)
    }

    /// Statistics were requested but no file is configured.
    pub fn no_stats_file() -> Self {
        SeraError::new("No statistics file configured", exit::BAD_CONFIG_FILE)
            .with_suggestion(r#"Set "stats_file" in the configuration"#)
            .with_suggestion("Or pass one explicitly: sera stats --file <path>")
    }

    /// None of the lock servers answered.
    pub fn no_connect(servers: &[String]) -> Self {
        let mut err = SeraError::new(
            "Could not connect to enough lock servers",
            exit::LOCK_FAILED,
        );
        for server in servers {
            err = err.with_context(format!("Configured: {}", redact(server)));
        }
        err.with_suggestion("Check that the servers are running and reachable")
            .with_suggestion("Raise connect_timeout in the configuration for slow networks")
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
