// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Jest `--json` output

use super::{coverage, degrade, parse_json_lenient, str_field, u64_field};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use tsuite_adapters::ProcessOutput;
use tsuite_core::{TestCase, TestCounts, TestOutcome, TestReport};

// Allow expect here as the regex is compile-time verified to be valid
#[allow(clippy::expect_used)]
static COUNT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)\s+(passed|failed|skipped|pending|todo|total)")
        .expect("constant regex pattern is valid")
});

#[allow(clippy::expect_used)]
static TIME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*Time:\s+([\d.]+)\s*(ms|s)\b").expect("constant regex pattern is valid")
});

pub(super) fn normalize(output: &ProcessOutput) -> TestReport {
    let json = parse_json_lenient(&output.stdout).filter(|v| v.get("numTotalTests").is_some());
    let mut report = match &json {
        Some(value) => from_json(value, output.exit_code),
        None => degrade(from_text(output), "jest", output),
    };
    report.coverage = json
        .as_ref()
        .and_then(|v| v.get("coverageMap"))
        .and_then(coverage::from_istanbul)
        .or_else(|| coverage::from_jest_text(&output.stdout))
        .or_else(|| coverage::from_jest_text(&output.stderr));
    report
}

fn from_json(value: &Value, exit_code: i32) -> TestReport {
    let counts = TestCounts {
        reported_total: u64_field(value, "numTotalTests"),
        passed: u64_field(value, "numPassedTests").unwrap_or(0),
        failed: u64_field(value, "numFailedTests").unwrap_or(0),
        skipped: u64_field(value, "numPendingTests").unwrap_or(0)
            + u64_field(value, "numTodoTests").unwrap_or(0),
    };
    let mut report = TestReport::new(counts, duration_secs(value), exit_code);
    report.tests = test_cases(value);
    report
}

/// Wall time across all suites: latest end minus earliest start.
fn duration_secs(value: &Value) -> f64 {
    let suites = value
        .get("testResults")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let mut start = u64_field(value, "startTime");
    let mut end: Option<u64> = None;
    for suite in suites {
        let perf = suite.get("perfStats");
        let suite_start = perf
            .and_then(|p| u64_field(p, "start"))
            .or_else(|| u64_field(suite, "startTime"));
        let suite_end = perf
            .and_then(|p| u64_field(p, "end"))
            .or_else(|| u64_field(suite, "endTime"));
        if let Some(s) = suite_start {
            start = Some(start.map_or(s, |cur| cur.min(s)));
        }
        if let Some(e) = suite_end {
            end = Some(end.map_or(e, |cur| cur.max(e)));
        }
    }
    match (start, end) {
        (Some(s), Some(e)) if e >= s => (e - s) as f64 / 1000.0,
        _ => 0.0,
    }
}

fn test_cases(value: &Value) -> Vec<TestCase> {
    let Some(suites) = value.get("testResults").and_then(Value::as_array) else {
        return Vec::new();
    };
    suites
        .iter()
        .filter_map(|suite| suite.get("assertionResults").and_then(Value::as_array))
        .flatten()
        .map(|assertion| {
            let name = str_field(assertion, "fullName")
                .or_else(|| str_field(assertion, "title"))
                .unwrap_or("<unnamed>")
                .to_string();
            let outcome = match str_field(assertion, "status") {
                Some("passed") => TestOutcome::Passed,
                Some("failed") => TestOutcome::Failed,
                _ => TestOutcome::Skipped,
            };
            let message = assertion
                .get("failureMessages")
                .and_then(Value::as_array)
                .and_then(|msgs| msgs.first())
                .and_then(Value::as_str)
                .map(str::to_string);
            TestCase {
                name,
                outcome,
                duration_secs: assertion
                    .get("duration")
                    .and_then(Value::as_f64)
                    .map(|ms| ms / 1000.0),
                message,
            }
        })
        .collect()
}

/// Scan the human summary: `Tests: 1 failed, 2 skipped, 5 passed, 8 total`.
fn from_text(output: &ProcessOutput) -> TestReport {
    let mut counts = TestCounts::default();
    let mut duration = 0.0;

    for line in output.stderr.lines().chain(output.stdout.lines()) {
        let trimmed = line.trim_start();
        if let Some(rest) = trimmed.strip_prefix("Tests:") {
            counts = TestCounts::default();
            for caps in COUNT_PATTERN.captures_iter(rest) {
                let n: u64 = caps[1].parse().unwrap_or(0);
                match &caps[2] {
                    "passed" => counts.passed += n,
                    "failed" => counts.failed += n,
                    "total" => counts.reported_total = Some(n),
                    _ => counts.skipped += n,
                }
            }
        } else if let Some(caps) = TIME_PATTERN.captures(trimmed) {
            let value: f64 = caps[1].parse().unwrap_or(0.0);
            duration = if &caps[2] == "ms" { value / 1000.0 } else { value };
        }
    }

    TestReport::new(counts, duration, output.exit_code)
}

#[cfg(test)]
#[path = "jest_tests.rs"]
mod tests;
