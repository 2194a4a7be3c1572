//! CLI help specs

use crate::prelude::*;

#[test]
fn no_arguments_prints_help() {
    cli()
        .passes()
        .stdout_has("Usage:")
        .stdout_has("run")
        .stdout_has("kinds");
}

#[test]
fn run_help_lists_job_options() {
    cli()
        .args(&["run", "--help"])
        .passes()
        .stdout_has("--kind")
        .stdout_has("--subtype")
        .stdout_has("--repo")
        .stdout_has("--branch")
        .stdout_has("--wait-timeout")
        .stdout_lacks("--poll-interval-ms");
}

#[test]
fn version_flag() {
    cli().args(&["--version"]).passes().stdout_has("tsuite ");
}
