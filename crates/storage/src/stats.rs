// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Statistics file: one JSON document holding every recorded run

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur reading or writing the statistics file
#[derive(Debug, Error)]
pub enum StatsError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("statistics file {path} is not valid: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One supervised run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistic {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_ms: u64,
    pub command: String,
    pub timeout_secs: u64,
    /// Unset when the lock was never acquired
    #[serde(default)]
    pub lock_acquired_at: Option<DateTime<Utc>>,
    pub exit_code: i32,
}

impl std::fmt::Display for Statistic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}  exit={:<3}  {:>8}ms  {}",
            self.start_time.format("%Y-%m-%d %H:%M:%S"),
            self.exit_code,
            self.duration_ms,
            self.command
        )
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Document {
    statistics: Vec<Statistic>,
}

/// Handle to a statistics file on disk
#[derive(Debug, Clone)]
pub struct StatsFile {
    path: PathBuf,
}

impl StatsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All recorded runs, oldest first; a missing file has none
    pub fn load(&self) -> Result<Vec<Statistic>, StatsError> {
        Ok(self.read_document()?.statistics)
    }

    /// Add `stat` to the file.
    ///
    /// Concurrent writers serialize on a sidecar lock file, and the document
    /// is replaced by rename so readers never see a partial write. A file that
    /// fails to parse is left untouched.
    pub fn append(&self, stat: &Statistic) -> Result<(), StatsError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io(e))?;
        }

        let lock_path = self.sidecar("lock");
        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(|e| self.io(e))?;
        lock.lock_exclusive().map_err(|e| self.io(e))?;

        let mut document = self.read_document()?;
        document.statistics.push(stat.clone());
        let result = self.replace(&document);

        if let Err(e) = lock.unlock() {
            tracing::debug!(error = %e, path = %lock_path.display(), "failed to unlock stats file");
        }
        result
    }

    fn read_document(&self) -> Result<Document, StatsError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Document::default()),
            Err(e) => return Err(self.io(e)),
        };
        if contents.trim().is_empty() {
            return Ok(Document::default());
        }
        serde_json::from_str(&contents).map_err(|source| StatsError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn replace(&self, document: &Document) -> Result<(), StatsError> {
        let json = serde_json::to_vec_pretty(document)?;
        let tmp = self.sidecar("tmp");

        let mut file = File::create(&tmp).map_err(|e| self.io(e))?;
        file.write_all(&json).map_err(|e| self.io(e))?;
        file.sync_all().map_err(|e| self.io(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.io(e))
    }

    fn sidecar(&self, extension: &str) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".");
        name.push(extension);
        PathBuf::from(name)
    }

    fn io(&self, source: io::Error) -> StatsError {
        StatsError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
#[path = "stats_tests.rs"]
mod tests;
