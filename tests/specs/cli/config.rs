//! `tsuite config` specs

use crate::prelude::*;

#[test]
fn prints_defaults_with_environment_overrides() {
    let fixture = Fixture::new();
    fixture
        .tsuite()
        .args(&["config"])
        .env("TSUITE_MAX_CONCURRENT", "3")
        .passes()
        .stdout_has("max_concurrent_jobs = 3")
        .stdout_has("[timeouts]")
        .stdout_has("run_secs = 30");
}

#[test]
fn reads_an_explicit_config_file() {
    let fixture = Fixture::new();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tsuite.toml");
    std::fs::write(&path, "max_concurrent_jobs = 7\n\n[timeouts]\nscan_secs = 42\n").unwrap();

    let run = fixture
        .tsuite()
        .args(&["config", "-o", "json", "--config", path.to_str().unwrap()])
        .passes();
    let config = &run.json_lines()[0];
    assert_eq!(config["max_concurrent_jobs"], 7);
    assert_eq!(config["timeouts"]["scan_secs"], 42);
}

#[test]
fn unknown_config_key_is_an_error() {
    let fixture = Fixture::new();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tsuite.toml");
    std::fs::write(&path, "max_jobs = 7\n").unwrap();

    fixture
        .tsuite()
        .args(&["config", "--config", path.to_str().unwrap()])
        .exits(1)
        .stderr_has("max_jobs");
}

#[test]
fn invalid_environment_override_is_an_error() {
    Fixture::new()
        .tsuite()
        .args(&["config"])
        .env("TSUITE_MAX_CONCURRENT", "lots")
        .exits(1)
        .stderr_has("TSUITE_MAX_CONCURRENT");
}
