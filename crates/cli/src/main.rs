// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! sera - run a command under a distributed lock

mod commands;
mod config;
mod error;
mod logging;
mod output;

use clap::{ArgAction, Parser, Subcommand};
use commands::{run, stats};
use error::SeraError;
use sera_core::exit;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "sera",
    version,
    about = "Sera - run a command on one machine of a fleet at a time"
)]
struct Cli {
    /// Configuration file (default: /etc/sera.json, ~/.sera/sera.json, ./sera.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More logging on stderr; repeat for debug output
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a command while holding the lock named after it
    Run(run::RunArgs),
    /// Show statistics from previous runs
    Stats(stats::StatsArgs),
    /// Print the version
    Version,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() {
                exit::BAD_ARGUMENTS
            } else {
                exit::SUCCESS
            };
            let _ = e.print();
            return exit_code(code);
        }
    };

    let code = match dispatch(cli).await {
        Ok(code) => code,
        Err(e) => match e.downcast::<SeraError>() {
            Ok(err) => {
                eprint!("{}", err);
                err.exit_code
            }
            Err(e) => {
                eprintln!("error: {:#}", e);
                exit::COMMAND_RUN_FAILED
            }
        },
    };
    exit_code(code)
}

async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.command {
        Commands::Version => {
            println!("sera {}", env!("CARGO_PKG_VERSION"));
            Ok(exit::SUCCESS)
        }
        Commands::Stats(args) => stats::stats(args, cli.config.as_deref()),
        Commands::Run(args) => {
            let (_, config) = config::load(cli.config.as_deref())?;
            let verbosity = cli.verbose.max(u8::from(config.verbose));
            // Held until the run ends so the log file is flushed
            let _guard = logging::init(verbosity, config.log_file.as_deref()).map_err(|e| {
                SeraError::new("Failed to open log file", exit::BAD_CONFIG_FILE).with_source(e)
            })?;
            if config.syslog {
                tracing::debug!("syslog output is not supported, logging to stderr");
            }
            run::run(args, config).await
        }
    }
}

/// Exit codes outside 0..=255 cannot be reported by the OS
fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}
