//! CLI error handling specs
//!
//! Requests the engine rejects must fail before any clone happens.

use crate::prelude::*;

#[test]
fn unsupported_subtype_lists_supported_ones() {
    let fixture = Fixture::new().commit();
    fixture
        .run("r1", "test", "mocha")
        .exits(1)
        .stderr_has("unsupported test subtype 'mocha' (supported: jest, pytest)");
    assert!(fixture.leftover_workspaces().is_empty());
}

#[test]
fn unknown_kind_is_a_usage_error() {
    Fixture::new()
        .commit()
        .run("r1", "lint", "eslint")
        .fails()
        .stderr_has("lint");
}

#[test]
fn blank_repository_is_rejected() {
    Fixture::new()
        .tsuite()
        .args(&["run", "--id", "r1", "--kind", "test", "--subtype", "jest", "--repo", " "])
        .exits(1)
        .stderr_has("invalid request");
}

#[test]
fn malformed_env_pair_is_a_usage_error() {
    let fixture = Fixture::new().commit();
    fixture
        .run("r1", "test", "jest")
        .args(&["--env", "NOVALUE"])
        .fails()
        .stderr_has("expected KEY=VALUE");
}

#[test]
fn missing_branch_fails_the_job_with_git_diagnostics() {
    let fixture = Fixture::new().file("README", "fixture\n").commit();
    fixture
        .run("r1", "test", "jest")
        .args(&["--branch", "no-such-branch"])
        .exits(EXIT_JOB_FAILED)
        .stdout_has("r1 failed")
        .stdout_has("git clone failed");
    assert!(fixture.leftover_workspaces().is_empty());
}
