//! Shared helpers for CLI specs

use assert_cmd::assert::Assert;
use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub use similar_asserts::assert_eq;

/// Exit codes the binary reports
pub mod code {
    pub const BAD_CONFIG_FILE: i32 = 200;
    pub const BAD_ARGUMENTS: i32 = 201;
    pub const LOCK_FAILED: i32 = 202;
}

/// A scratch directory to run sera in
pub struct Project {
    dir: TempDir,
}

impl Project {
    pub fn empty() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `contents` to `rel` under the project
    pub fn file(&self, rel: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, contents).unwrap();
        path
    }

    /// A config whose only server refuses connections
    pub fn unreachable_config(&self) -> PathBuf {
        self.file(
            "sera.json",
            r#"{"backend": "redis", "servers": ["127.0.0.1:1"], "connect_timeout": "200ms"}"#,
        )
    }

    /// `sera` running inside the project with an isolated home directory
    pub fn sera(&self) -> Cmd {
        let mut cmd = Command::cargo_bin("sera").unwrap();
        cmd.current_dir(self.path())
            .env("HOME", self.path().join("home"))
            .env_remove("RUST_LOG");
        Cmd { cmd }
    }
}

pub struct Cmd {
    cmd: Command,
}

impl Cmd {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn passes(mut self) -> Output {
        Output {
            assert: self.cmd.assert().success(),
        }
    }

    pub fn exits_with(mut self, code: i32) -> Output {
        Output {
            assert: self.cmd.assert().code(code),
        }
    }
}

pub struct Output {
    assert: Assert,
}

impl Output {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.assert.get_output().stdout).to_string()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.assert.get_output().stderr).to_string()
    }

    pub fn stdout_has(self, needle: &str) -> Self {
        Self {
            assert: self.assert.stdout(predicate::str::contains(needle)),
        }
    }

    pub fn stderr_has(self, needle: &str) -> Self {
        Self {
            assert: self.assert.stderr(predicate::str::contains(needle)),
        }
    }
}
