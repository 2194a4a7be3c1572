// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::report::{SecurityReport, TestCounts, TestReport};
use crate::test_support::{jest_request, sast_request};

fn queued_job() -> Job {
    Job::queued(&jest_request("t1"), 1_000)
}

fn passing_report() -> Report {
    Report::Test(TestReport::new(TestCounts::default(), 0.5, 0))
}

fn failing_report() -> Report {
    Report::Test(TestReport::new(TestCounts::default(), 0.5, 1))
}

#[test]
fn queued_job_has_only_queue_timestamp() {
    let job = queued_job();
    assert_eq!(job.status, JobStatus::Queued);
    assert_eq!(job.queued_at_ms, 1_000);
    assert!(job.started_at_ms.is_none());
    assert!(job.completed_at_ms.is_none());
    assert!(job.report.is_none());
    assert!(job.error.is_none());
}

#[test]
fn subtype_is_normalized() {
    let mut request = jest_request("t1");
    request.subtype = "  Jest ".to_string();
    let job = Job::queued(&request, 0);
    assert_eq!(job.subtype, "jest");
}

#[test]
fn successful_report_completes_job() {
    let mut job = queued_job();
    job.start(2_000).unwrap();
    job.finish(passing_report(), 3_000).unwrap();
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.started_at_ms, Some(2_000));
    assert_eq!(job.completed_at_ms, Some(3_000));
    assert_eq!(job.run_duration_ms(), Some(1_000));
}

#[test]
fn failing_report_fails_job_but_keeps_report() {
    let mut job = queued_job();
    job.start(2_000).unwrap();
    job.finish(failing_report(), 3_000).unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert!(job.report.is_some());
    assert!(job.error.is_none());
}

#[test]
fn infrastructure_failure_has_error_and_no_report() {
    let mut job = queued_job();
    job.start(2_000).unwrap();
    job.fail("git clone failed", 3_000).unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert!(job.report.is_none());
    assert_eq!(job.error.as_deref(), Some("git clone failed"));
}

#[test]
fn cannot_skip_running() {
    let mut job = queued_job();
    let err = job.finish(passing_report(), 2_000).unwrap_err();
    assert_eq!(err.from, JobStatus::Queued);
    assert_eq!(err.to, JobStatus::Completed);
    assert_eq!(job.status, JobStatus::Queued);
    assert!(job.report.is_none(), "rejected transition leaves job untouched");
}

#[test]
fn terminal_state_is_never_reentered() {
    let mut job = queued_job();
    job.start(2_000).unwrap();
    job.fail("boom", 3_000).unwrap();
    assert!(job.fail("again", 4_000).is_err());
    assert!(job.start(4_000).is_err());
    assert_eq!(job.error.as_deref(), Some("boom"));
    assert_eq!(job.completed_at_ms, Some(3_000));
}

#[test]
fn timestamps_are_monotonic_even_with_clock_skew() {
    let mut job = queued_job();
    job.start(500).unwrap();
    job.fail("boom", 100).unwrap();
    let started = job.started_at_ms.unwrap();
    let completed = job.completed_at_ms.unwrap();
    assert!(job.queued_at_ms <= started);
    assert!(started <= completed);
}

#[yare::parameterized(
    queued_to_running     = { JobStatus::Queued,    JobStatus::Running,   true },
    running_to_completed  = { JobStatus::Running,   JobStatus::Completed, true },
    running_to_failed     = { JobStatus::Running,   JobStatus::Failed,    true },
    queued_to_completed   = { JobStatus::Queued,    JobStatus::Completed, false },
    queued_to_failed      = { JobStatus::Queued,    JobStatus::Failed,    false },
    running_to_queued     = { JobStatus::Running,   JobStatus::Queued,    false },
    completed_to_failed   = { JobStatus::Completed, JobStatus::Failed,    false },
    failed_to_running     = { JobStatus::Failed,    JobStatus::Running,   false },
    running_to_running    = { JobStatus::Running,   JobStatus::Running,   false },
)]
fn transition_table(from: JobStatus, to: JobStatus, allowed: bool) {
    assert_eq!(from.can_transition_to(to), allowed);
}

#[yare::parameterized(
    test           = { "test",          JobKind::Test },
    tests_plural   = { "tests",         JobKind::Test },
    security_scan  = { "security-scan", JobKind::SecurityScan },
    underscore     = { "security_scan", JobKind::SecurityScan },
    mixed_case     = { "Security-Scan", JobKind::SecurityScan },
)]
fn parse_kind(raw: &str, expected: JobKind) {
    assert_eq!(raw.parse::<JobKind>().unwrap(), expected);
}

#[test]
fn parse_kind_rejects_unknown() {
    let err = "lint".parse::<JobKind>().unwrap_err();
    assert!(err.to_string().contains("lint"));
}

#[test]
fn key_display_includes_kind_namespace() {
    let job = Job::queued(&sast_request("s1"), 0);
    assert_eq!(job.key().to_string(), "security-scan/s1");
}

#[test]
fn status_serializes_snake_case() {
    let mut job = Job::queued(&sast_request("s1"), 0);
    job.start(1).unwrap();
    job.finish(
        Report::Security(SecurityReport::from_findings(Vec::new(), Vec::new(), true)),
        2,
    )
    .unwrap();
    let json = serde_json::to_value(&job).unwrap();
    assert_eq!(json["status"], "completed");
    assert_eq!(json["kind"], "security-scan");
    assert_eq!(json["report"]["type"], "security");
}
