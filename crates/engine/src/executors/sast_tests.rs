// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::normalize::normalize;
use std::time::Duration;
use tempfile::TempDir;
use tsuite_adapters::{FakeProcessRunner, FakeRule};
use tsuite_core::Severity;

const SEMGREP: &str = r#"{"results":[
  {"check_id":"python.lang.security.eval","path":"app.py","start":{"line":12},
   "extra":{"severity":"ERROR","message":"eval of untrusted input","metadata":{"category":"security"}}},
  {"check_id":"python.lang.best-practice.open","path":"io.py","start":{"line":3},
   "extra":{"severity":"WARNING","message":"file not closed"}}
],"errors":[]}"#;

#[tokio::test]
async fn runs_semgrep_over_the_workspace() {
    let dir = TempDir::new().unwrap();
    let fake = FakeProcessRunner::new();
    fake.push(FakeRule::new("semgrep").output(SEMGREP, "", 1));

    let scanner = SastScanner::new(fake.clone(), ExecutorTimeouts::default());
    let raw = scanner
        .execute(dir.path(), &ExecOptions::default())
        .await
        .unwrap();

    assert_eq!(fake.command_lines(), vec!["semgrep --config=auto --json ."]);
    let report = normalize(raw);
    let security = report.as_security().unwrap();
    assert_eq!(security.count(Severity::Critical), 1);
    assert_eq!(security.count(Severity::High), 1);
    assert_eq!(security.findings[0].line, Some(12));
}

#[tokio::test]
async fn scan_timeout_is_applied() {
    let dir = TempDir::new().unwrap();
    let fake = FakeProcessRunner::new();
    fake.push(FakeRule::new("semgrep").delay(Duration::from_secs(60)));
    let timeouts = ExecutorTimeouts {
        scan: Duration::from_millis(20),
        ..Default::default()
    };
    let err = SastScanner::new(fake.clone(), timeouts)
        .execute(dir.path(), &ExecOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, JobError::Process(ref e) if e.is_timeout()));
}

#[tokio::test]
async fn bootstrap_and_ignored_command() {
    let dir = TempDir::new().unwrap();
    let fake = FakeProcessRunner::new();
    let options = ExecOptions {
        command: Some("semgrep --config p/ci".into()),
        ..Default::default()
    };
    SastScanner::new(fake.clone(), ExecutorTimeouts::default())
        .with_bootstrap(true)
        .execute(dir.path(), &options)
        .await
        .unwrap();
    assert_eq!(
        fake.command_lines(),
        vec!["pip install semgrep", "semgrep --config=auto --json ."]
    );
}
