// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::normalize::normalize;
use tempfile::TempDir;
use tsuite_adapters::{FakeProcessRunner, FakeReply, FakeRule};

const JEST_JSON: &str = r#"{"numTotalTests":3,"numPassedTests":2,"numFailedTests":1,
    "numPendingTests":0,"numTodoTests":0,"success":false}"#;

fn executor(fake: &FakeProcessRunner) -> JestExecutor<FakeProcessRunner> {
    JestExecutor::new(fake.clone(), ExecutorTimeouts::default())
}

#[tokio::test]
async fn installs_then_runs_with_ci_set() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("package.json"), "{}").unwrap();
    let fake = FakeProcessRunner::new();
    fake.push(FakeRule::new("npm").matching(&["test"]).output(JEST_JSON, "", 1));

    let raw = executor(&fake)
        .execute(dir.path(), &ExecOptions::default())
        .await
        .unwrap();

    assert_eq!(
        fake.command_lines(),
        vec!["npm install", "npm test -- --json --coverage"]
    );
    let run = &fake.calls()[1];
    assert_eq!(run.env.get("CI").map(String::as_str), Some("true"));
    assert_eq!(run.timeout, ExecutorTimeouts::default().run);

    let report = normalize(raw);
    let test = report.as_test().unwrap();
    assert_eq!((test.passed, test.failed), (2, 1));
    assert!(!report.success());
}

#[tokio::test]
async fn skips_install_without_package_json() {
    let dir = TempDir::new().unwrap();
    let fake = FakeProcessRunner::new();
    executor(&fake)
        .execute(dir.path(), &ExecOptions::default())
        .await
        .unwrap();
    assert_eq!(fake.command_lines(), vec!["npm test -- --json --coverage"]);
}

#[tokio::test]
async fn custom_command_and_env_overlay() {
    let dir = TempDir::new().unwrap();
    let fake = FakeProcessRunner::new();
    let mut options = ExecOptions {
        command: Some("yarn jest --json".into()),
        ..Default::default()
    };
    options.env.insert("NODE_ENV".into(), "test".into());
    options.env.insert("CI".into(), "false".into());

    executor(&fake).execute(dir.path(), &options).await.unwrap();

    let calls = fake.calls_to("yarn");
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].args, vec!["jest", "--json"]);
    assert_eq!(calls[0].env.get("NODE_ENV").map(String::as_str), Some("test"));
    assert_eq!(calls[0].env.get("CI").map(String::as_str), Some("true"));
}

#[tokio::test]
async fn failed_install_still_runs_tests() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("package.json"), "{}").unwrap();
    let fake = FakeProcessRunner::new();
    fake.push(FakeRule::new("npm").matching(&["install"]).output("", "ERESOLVE", 1));
    executor(&fake)
        .execute(dir.path(), &ExecOptions::default())
        .await
        .unwrap();
    assert_eq!(fake.command_lines().len(), 2);
}

#[tokio::test]
async fn run_timeout_fails_the_job() {
    let dir = TempDir::new().unwrap();
    let fake = FakeProcessRunner::new();
    fake.push(FakeRule::new("npm").matching(&["test"]).reply(FakeReply::Timeout));
    let err = executor(&fake)
        .execute(dir.path(), &ExecOptions::default())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("timed out"), "{err}");
}
