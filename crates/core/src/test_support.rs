// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::{Finding, JobKind, JobRequest, Severity, SourceTool, TestCounts, TestReport};

pub const TEST_REPO: &str = "https://example.invalid/repo.git";

pub fn jest_request(id: &str) -> JobRequest {
    JobRequest::new(JobKind::Test, id, "jest", TEST_REPO)
}

pub fn pytest_request(id: &str) -> JobRequest {
    JobRequest::new(JobKind::Test, id, "pytest", TEST_REPO)
}

pub fn dependency_request(id: &str) -> JobRequest {
    JobRequest::new(JobKind::SecurityScan, id, "dependency", TEST_REPO)
}

pub fn sast_request(id: &str) -> JobRequest {
    JobRequest::new(JobKind::SecurityScan, id, "sast", TEST_REPO)
}

pub fn test_report(passed: u64, failed: u64, skipped: u64, exit_code: i32) -> TestReport {
    TestReport::new(
        TestCounts {
            reported_total: None,
            passed,
            failed,
            skipped,
        },
        0.0,
        exit_code,
    )
}

pub fn npm_finding(package: &str, severity: Severity) -> Finding {
    let mut finding = Finding::new(
        SourceTool::Npm,
        format!("npm:{package}"),
        severity,
        format!("vulnerable {package}"),
        package,
    );
    finding.package = Some(package.to_string());
    finding
}
