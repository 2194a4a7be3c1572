//! `tsuite health` specs

use crate::prelude::*;

#[test]
fn reports_ok_with_pool_size() {
    Fixture::new()
        .tsuite()
        .args(&["health"])
        .env("TSUITE_MAX_CONCURRENT", "2")
        .passes()
        .stdout_has(": ok\n")
        .stdout_has("(max 2 concurrent)");
}

#[test]
fn json_output_has_status_and_counts() {
    let run = Fixture::new().tsuite().args(&["health", "-o", "json"]).passes();
    let docs = run.json_lines();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0]["status"], "ok");
    assert_eq!(docs[0]["queued"], 0);
}

#[test]
fn unusable_workspace_root_fails() {
    let fixture = Fixture::new();
    let blocker = fixture.workspace_root().join("blocker");
    std::fs::write(&blocker, "").unwrap();
    fixture
        .tsuite()
        .env("TSUITE_WORKSPACE_DIR", blocker.join("ws"))
        .args(&["health"])
        .exits(1)
        .stdout_has("degraded")
        .stdout_has("error: ");
}
