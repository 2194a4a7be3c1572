// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Canonical report schema shared by all executors.
//!
//! Every tool-specific output is normalized into one of two shapes: a
//! [`TestReport`] for test suites and a [`SecurityReport`] for scans. Both
//! carry a `success` flag that the orchestrator uses to pick the terminal
//! job status.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical four-bucket severity scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scanner that produced a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceTool {
    Npm,
    Safety,
    Semgrep,
}

impl SourceTool {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceTool::Npm => "npm",
            SourceTool::Safety => "safety",
            SourceTool::Semgrep => "semgrep",
        }
    }
}

impl fmt::Display for SourceTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a single test case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestOutcome {
    Passed,
    Failed,
    Skipped,
}

/// Per-test detail row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    pub name: String,
    pub outcome: TestOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Counters extracted from a test tool before totals are reconciled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TestCounts {
    /// Total as reported by the tool, if it reported one.
    pub reported_total: Option<u64>,
    pub passed: u64,
    pub failed: u64,
    pub skipped: u64,
}

impl TestCounts {
    /// The tool's own total wins when present; otherwise the sum of buckets.
    pub fn total(&self) -> u64 {
        self.reported_total
            .unwrap_or(self.passed + self.failed + self.skipped)
    }
}

/// Canonical report for a test-suite run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestReport {
    pub total: u64,
    pub passed: u64,
    pub failed: u64,
    pub skipped: u64,
    pub duration_secs: f64,
    pub success: bool,
    /// Exit code of the run command.
    pub exit_code: i32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tests: Vec<TestCase>,
    /// Structured output was missing or malformed and counters came from text scanning.
    #[serde(default)]
    pub degraded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_output: Option<String>,
    /// Present when the run collected code coverage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coverage: Option<CoverageSummary>,
}

impl TestReport {
    pub fn new(counts: TestCounts, duration_secs: f64, exit_code: i32) -> Self {
        Self {
            total: counts.total(),
            passed: counts.passed,
            failed: counts.failed,
            skipped: counts.skipped,
            duration_secs: duration_secs.max(0.0),
            success: exit_code == 0,
            exit_code,
            tests: Vec::new(),
            degraded: false,
            raw_output: None,
            coverage: None,
        }
    }
}

/// Covered and total counts for one coverage metric.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageMetric {
    pub covered: u64,
    pub total: u64,
}

impl CoverageMetric {
    pub fn new(covered: u64, total: u64) -> Self {
        Self {
            covered: covered.min(total),
            total,
        }
    }

    /// Percentage covered; an empty metric counts as fully covered.
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            self.covered as f64 * 100.0 / self.total as f64
        }
    }
}

/// Code coverage collected alongside a test run.
///
/// Tools report different metrics; only `percent` is always present.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CoverageSummary {
    /// Headline figure: line coverage when known, else statement coverage.
    pub percent: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lines: Option<CoverageMetric>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statements: Option<CoverageMetric>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub functions: Option<CoverageMetric>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branches: Option<CoverageMetric>,
}

/// A single security finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub identifier: String,
    pub severity: Severity,
    pub description: String,
    pub location: String,
    pub source: SourceTool,
    /// Severity label exactly as the tool reported it.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub raw_severity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affected_versions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_versions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Finding {
    pub fn new(
        source: SourceTool,
        identifier: impl Into<String>,
        severity: Severity,
        description: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            severity,
            description: description.into(),
            location: location.into(),
            source,
            raw_severity: String::new(),
            package: None,
            affected_versions: None,
            fixed_versions: None,
            line: None,
            category: None,
        }
    }
}

/// Summary of one scanner invocation inside a security scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannerRun {
    pub tool: SourceTool,
    pub exit_code: i32,
    pub findings: u64,
    #[serde(default)]
    pub degraded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_output: Option<String>,
}

/// Canonical report for a security scan.
///
/// Bucket counts are always derived from `findings`, so
/// `critical + high + medium + low == total`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityReport {
    pub total: u64,
    pub critical: u64,
    pub high: u64,
    pub medium: u64,
    pub low: u64,
    pub findings: Vec<Finding>,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scanners: Vec<ScannerRun>,
}

impl SecurityReport {
    pub fn from_findings(findings: Vec<Finding>, scanners: Vec<ScannerRun>, success: bool) -> Self {
        let mut report = Self {
            total: findings.len() as u64,
            critical: 0,
            high: 0,
            medium: 0,
            low: 0,
            findings,
            success,
            scanners,
        };
        for finding in &report.findings {
            match finding.severity {
                Severity::Critical => report.critical += 1,
                Severity::High => report.high += 1,
                Severity::Medium => report.medium += 1,
                Severity::Low => report.low += 1,
            }
        }
        report
    }

    pub fn count(&self, severity: Severity) -> u64 {
        match severity {
            Severity::Critical => self.critical,
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
        }
    }

    /// True when any scanner's output had to be degraded.
    pub fn degraded(&self) -> bool {
        self.scanners.iter().any(|s| s.degraded)
    }
}

/// Report attached to a terminal job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Report {
    Test(TestReport),
    Security(SecurityReport),
}

impl Report {
    pub fn success(&self) -> bool {
        match self {
            Report::Test(r) => r.success,
            Report::Security(r) => r.success,
        }
    }

    pub fn as_test(&self) -> Option<&TestReport> {
        match self {
            Report::Test(r) => Some(r),
            Report::Security(_) => None,
        }
    }

    pub fn as_security(&self) -> Option<&SecurityReport> {
        match self {
            Report::Security(r) => Some(r),
            Report::Test(_) => None,
        }
    }
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
