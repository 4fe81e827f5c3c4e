// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration file discovery and decoding

use crate::error::SeraError;
use sera_core::{Config, ConfigError, RawConfig};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_FILE_NAME: &str = "sera.json";

/// Locations searched when no `--config` is given, in order
pub fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("/etc").join(CONFIG_FILE_NAME)];
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".sera").join(CONFIG_FILE_NAME));
    }
    paths.push(PathBuf::from(".").join(CONFIG_FILE_NAME));
    paths
}

/// Load the explicit file, or the first one found on the search path
pub fn load(explicit: Option<&Path>) -> Result<(PathBuf, Config), SeraError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let candidates = search_paths();
            candidates
                .iter()
                .find(|p| p.is_file())
                .cloned()
                .ok_or_else(|| SeraError::config_not_found(&candidates))?
        }
    };

    let contents = std::fs::read_to_string(&path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            SeraError::config_not_found(std::slice::from_ref(&path))
        } else {
            SeraError::config_invalid(&path, e)
        }
    })?;
    let config = parse(&contents).map_err(|e| SeraError::config_invalid(&path, e))?;

    tracing::debug!(path = %path.display(), backend = %config.backend, "loaded configuration");
    Ok((path, config))
}

/// Decode a JSON configuration document
pub fn parse(contents: &str) -> Result<Config, ParseError> {
    let raw: RawConfig = serde_json::from_str(contents)?;
    Ok(Config::try_from(raw)?)
}

/// Why a configuration document was rejected
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Invalid(#[from] ConfigError),
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
