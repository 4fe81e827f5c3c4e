// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `sera run <timeout> -- <command>...` - Run a command under the lock

use crate::error::SeraError;
use anyhow::Result;
use clap::Args;
use sera_core::{Config, LockName};
use sera_engine::{
    Coordinator, ExecutionMode, MutexError, MutexFactory, NoopObserver, RunObserver,
};
use sera_storage::{StatsFile, StatsRecorder};
use std::time::Duration;

#[derive(Args)]
pub struct RunArgs {
    /// Seconds to wait for the lock before giving up
    #[arg(value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: u64,

    /// Only the first invocation runs the command; the others wait for it to
    /// finish and exit 0 without running it (best effort)
    #[arg(long)]
    pub wait_and_skip: bool,

    /// Use the command line itself as the lock name instead of its digest
    #[arg(long)]
    pub no_hash: bool,

    /// Command to run, with its arguments
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
    pub command: Vec<String>,
}

impl RunArgs {
    pub fn mode(&self) -> ExecutionMode {
        if self.wait_and_skip {
            ExecutionMode::WaitAndSkip
        } else {
            ExecutionMode::EveryoneExecutes
        }
    }

    pub fn lock_name(&self, config: &Config) -> LockName {
        LockName::from_command(&self.command, config.hash_names && !self.no_hash)
    }
}

pub async fn run(args: RunArgs, config: Config) -> Result<i32> {
    let name = args.lock_name(&config);
    let wait = Duration::from_secs(args.timeout);
    tracing::info!(lock = %name, command = %args.command.join(" "), mode = %args.mode(), "run requested");

    let factory = MutexFactory::new(config.clone()).with_wait(wait);
    let mutex = match factory.build(name).await {
        Ok(mutex) => mutex,
        Err(MutexError::NoConnect) => return Err(SeraError::no_connect(&config.servers).into()),
        Err(e) => {
            let code = e.exit_code();
            return Err(SeraError::new(e.to_string(), code).with_source(e).into());
        }
    };

    let mut recorder = StatsRecorder::new();
    let mut noop = NoopObserver;
    let observer: &mut dyn RunObserver = if config.stats_file.is_some() {
        &mut recorder
    } else {
        &mut noop
    };

    let outcome = Coordinator::default()
        .run(args.mode(), &mutex, &args.command, observer)
        .await;

    if let Some(error) = &outcome.error {
        tracing::error!(error = %error, exit_code = outcome.exit_code, "run failed");
        eprintln!("error: {}", error);
    }

    if let (Some(path), Some(stat)) = (&config.stats_file, recorder.statistic()) {
        if let Err(e) = StatsFile::new(path).append(&stat) {
            tracing::warn!(error = %e, "failed to record statistics");
        }
    }

    Ok(outcome.exit_code)
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
