//! Help and version specs

use crate::prelude::*;
use crate::prelude::assert_eq;

#[test]
fn help_lists_subcommands() {
    let temp = Project::empty();

    temp.sera()
        .args(&["--help"])
        .passes()
        .stdout_has("run")
        .stdout_has("stats")
        .stdout_has("version");
}

#[test]
fn version_prints_crate_version() {
    let temp = Project::empty();

    let output = temp.sera().args(&["version"]).passes();

    assert_eq!(output.stdout(), format!("sera {}\n", env!("CARGO_PKG_VERSION")));
}

#[test]
fn run_help_mentions_wait_and_skip() {
    let temp = Project::empty();

    temp.sera()
        .args(&["run", "--help"])
        .passes()
        .stdout_has("--wait-and-skip")
        .stdout_has("--no-hash");
}
