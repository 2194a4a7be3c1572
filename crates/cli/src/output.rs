// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Text and JSON rendering of engine records

use clap::ValueEnum;
use serde::Serialize;
use std::fmt::Write as _;
use tsuite_core::{
    Report, ResultsRecord, SecurityReport, Severity, StatusRecord, SubmitAck, TestOutcome,
    TestReport,
};

/// Findings listed in text output before the rest are summarized.
const MAX_LISTED_FINDINGS: usize = 20;

#[derive(Clone, Copy, Debug, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// One JSON document per line so the stream stays machine-readable.
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}

pub fn format_ack(ack: &SubmitAck) -> String {
    format!("{} {}: {}", ack.id, ack.status, ack.message)
}

pub fn format_status(status: &StatusRecord) -> String {
    match &status.error {
        Some(error) => format!("{} {}: {}", status.id, status.status, error),
        None => format!("{} {}", status.id, status.status),
    }
}

pub fn format_results(results: &ResultsRecord) -> String {
    let mut out = String::new();
    let _ = write!(out, "{} {} {}: {}", results.kind, results.subtype, results.id, results.status);
    if let Some(ms) = results.duration_ms {
        let _ = write!(out, " in {:.1}s", ms as f64 / 1000.0);
    }
    out.push('\n');

    match &results.report {
        Some(Report::Test(report)) => format_test_report(&mut out, report),
        Some(Report::Security(report)) => format_security_report(&mut out, report),
        None => {}
    }
    if let Some(error) = &results.error {
        let _ = writeln!(out, "error: {error}");
    }
    out
}

fn format_test_report(out: &mut String, report: &TestReport) {
    let _ = writeln!(
        out,
        "tests: {} total, {} passed, {} failed, {} skipped (exit code {})",
        report.total, report.passed, report.failed, report.skipped, report.exit_code
    );
    if let Some(coverage) = &report.coverage {
        let _ = writeln!(out, "coverage: {:.1}%", coverage.percent);
    }
    for case in report.tests.iter().filter(|t| t.outcome == TestOutcome::Failed) {
        let _ = writeln!(out, "  FAIL {}", case.name);
    }
    if report.degraded {
        out.push_str("warning: test output could not be fully parsed\n");
    }
}

fn format_security_report(out: &mut String, report: &SecurityReport) {
    let buckets = Severity::ALL
        .iter()
        .map(|s| format!("{} {}", report.count(*s), s))
        .collect::<Vec<_>>()
        .join(", ");
    let _ = writeln!(out, "findings: {} total ({buckets})", report.total);

    for finding in report.findings.iter().take(MAX_LISTED_FINDINGS) {
        let _ = write!(
            out,
            "  [{}] {} {}: {}",
            finding.severity, finding.source, finding.identifier, finding.description
        );
        if !finding.location.is_empty() {
            let _ = write!(out, " ({}", finding.location);
            if let Some(line) = finding.line {
                let _ = write!(out, ":{line}");
            }
            out.push(')');
        }
        out.push('\n');
    }
    if report.findings.len() > MAX_LISTED_FINDINGS {
        let _ = writeln!(
            out,
            "  ... and {} more",
            report.findings.len() - MAX_LISTED_FINDINGS
        );
    }

    for run in &report.scanners {
        let _ = write!(out, "scanner {}: exit code {}, {} findings", run.tool, run.exit_code, run.findings);
        if run.degraded {
            out.push_str(" (output not parsed)");
        }
        out.push('\n');
    }
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
