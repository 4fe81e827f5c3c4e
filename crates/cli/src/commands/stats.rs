// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `sera stats` - Show recorded runs

use crate::error::SeraError;
use crate::output::{self, OutputFormat};
use anyhow::Result;
use clap::Args;
use sera_core::exit;
use sera_storage::StatsFile;
use std::path::{Path, PathBuf};

#[derive(Args)]
pub struct StatsArgs {
    /// Output format
    #[arg(long, value_enum, default_value_t)]
    pub format: OutputFormat,

    /// Show only the most recent N runs
    #[arg(long)]
    pub limit: Option<usize>,

    /// Statistics file to read instead of the configured one
    #[arg(long)]
    pub file: Option<PathBuf>,
}

pub fn stats(args: StatsArgs, config_path: Option<&Path>) -> Result<i32> {
    let path = match args.file {
        Some(file) => file,
        None => {
            let (_, config) = crate::config::load(config_path)?;
            config.stats_file.ok_or_else(SeraError::no_stats_file)?
        }
    };

    let mut runs = StatsFile::new(&path)
        .load()
        .map_err(|e| SeraError::new(e.to_string(), exit::BAD_CONFIG_FILE).with_source(e))?;
    if let Some(limit) = args.limit {
        let skip = runs.len().saturating_sub(limit);
        runs.drain(..skip);
    }

    if runs.is_empty() && matches!(args.format, OutputFormat::Text) {
        println!("No runs recorded");
    } else {
        output::print_list(&runs, args.format);
    }
    Ok(exit::SUCCESS)
}
