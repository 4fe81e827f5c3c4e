// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runs the wrapped command and relays its output
//!
//! Stdout and stderr are copied by two tasks for the lifetime of the child.
//! Completion is detected on the child itself, so a grandchild that keeps a
//! pipe open cannot hold the run hostage: relays get a short grace period after
//! exit and are then dropped.

use crate::error::SupervisorError;
use std::process::{ExitStatus, Stdio};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;
use tokio::task::JoinHandle;

/// How long relays may keep draining after the child exited
const RELAY_GRACE: Duration = Duration::from_secs(1);

/// Exit code reported for a child that vanished without a status
const UNKNOWN_EXIT: i32 = 1;

/// Byte buffer shared between a relay task and a test
#[derive(Clone, Debug, Default)]
pub struct SharedBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        let bytes = self.bytes.lock().unwrap_or_else(|e| e.into_inner());
        String::from_utf8_lossy(&bytes).to_string()
    }

    fn extend(&self, chunk: &[u8]) {
        self.bytes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend_from_slice(chunk);
    }
}

/// Destination for one of the child's output streams
#[derive(Clone, Debug)]
pub enum Sink {
    Stdout,
    Stderr,
    Buffer(SharedBuffer),
}

/// Launches commands with their output relayed to this process
#[derive(Clone, Debug)]
pub struct CommandSupervisor {
    stdout: Sink,
    stderr: Sink,
}

impl Default for CommandSupervisor {
    fn default() -> Self {
        Self {
            stdout: Sink::Stdout,
            stderr: Sink::Stderr,
        }
    }
}

impl CommandSupervisor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Send the child's output somewhere other than this process's streams
    pub fn with_sinks(stdout: Sink, stderr: Sink) -> Self {
        Self { stdout, stderr }
    }

    /// Run `argv` to completion and return its exit code.
    ///
    /// A non-zero exit is not an error here; only failing to start or to reap
    /// the child is.
    pub async fn run(&self, argv: &[String]) -> Result<i32, SupervisorError> {
        let (program, args) = argv.split_first().ok_or(SupervisorError::EmptyCommand)?;

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| SupervisorError::Launch {
                program: program.clone(),
                source,
            })?;
        tracing::info!(command = %argv.join(" "), pid = child.id(), "command started");

        let relays: Vec<JoinHandle<()>> = [
            child
                .stdout
                .take()
                .map(|pipe| tokio::spawn(relay(pipe, self.stdout.clone()))),
            child
                .stderr
                .take()
                .map(|pipe| tokio::spawn(relay(pipe, self.stderr.clone()))),
        ]
        .into_iter()
        .flatten()
        .collect();

        let status = child.wait().await.map_err(|source| SupervisorError::Wait {
            program: program.clone(),
            source,
        })?;

        for mut relay in relays {
            if tokio::time::timeout(RELAY_GRACE, &mut relay).await.is_err() {
                tracing::debug!("output pipe still open after exit, detaching");
                relay.abort();
            }
        }

        let code = exit_code(status);
        tracing::info!(command = %argv.join(" "), exit_code = code, "command finished");
        Ok(code)
    }
}

async fn relay<R: AsyncRead + Unpin>(mut pipe: R, sink: Sink) {
    let result = match sink {
        Sink::Stdout => copy_flushed(&mut pipe, &mut tokio::io::stdout()).await,
        Sink::Stderr => copy_flushed(&mut pipe, &mut tokio::io::stderr()).await,
        Sink::Buffer(buffer) => {
            let mut chunk = [0u8; 8192];
            loop {
                match pipe.read(&mut chunk).await {
                    Ok(0) => break Ok(()),
                    Ok(n) => buffer.extend(&chunk[..n]),
                    Err(e) => break Err(e),
                }
            }
        }
    };
    if let Err(e) = result {
        tracing::debug!(error = %e, "output relay stopped");
    }
}

async fn copy_flushed<R, W>(pipe: &mut R, out: &mut W) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
    W: tokio::io::AsyncWrite + Unpin,
{
    tokio::io::copy(pipe, out).await?;
    out.flush().await
}

/// The child's exit code, or `128 + signal` when it was killed
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    UNKNOWN_EXIT
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
