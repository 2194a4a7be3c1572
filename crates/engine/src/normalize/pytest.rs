// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! pytest-json-report output

use super::{coverage, degrade, parse_json_lenient, str_field, u64_field};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use tsuite_adapters::ProcessOutput;
use tsuite_core::{TestCase, TestCounts, TestOutcome, TestReport};

// Allow expect here as the regex is compile-time verified to be valid
#[allow(clippy::expect_used)]
static COUNT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)\s+(passed|failed|skipped|errors?|xfailed|xpassed)\b")
        .expect("constant regex pattern is valid")
});

#[allow(clippy::expect_used)]
static DURATION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bin\s+([\d.]+)s\b").expect("constant regex pattern is valid")
});

pub(super) fn normalize(output: &ProcessOutput, report_json: Option<&str>) -> TestReport {
    let mut report = match report_json
        .and_then(parse_json_lenient)
        .filter(|v| v.get("summary").is_some_and(Value::is_object))
    {
        Some(value) => from_json(&value, output.exit_code),
        None => degrade(from_text(output), "pytest", output),
    };
    report.coverage = coverage::from_pytest_cov(&output.stdout);
    report
}

fn from_json(value: &Value, exit_code: i32) -> TestReport {
    let summary = &value["summary"];
    let count = |key: &str| u64_field(summary, key).unwrap_or(0);
    let counts = TestCounts {
        reported_total: u64_field(summary, "total"),
        passed: count("passed") + count("xpassed"),
        failed: count("failed") + count("error"),
        skipped: count("skipped") + count("xfailed"),
    };
    let duration = value.get("duration").and_then(Value::as_f64).unwrap_or(0.0);
    let mut report = TestReport::new(counts, duration, exit_code);
    report.tests = test_cases(value);
    report
}

fn test_cases(value: &Value) -> Vec<TestCase> {
    let Some(tests) = value.get("tests").and_then(Value::as_array) else {
        return Vec::new();
    };
    tests
        .iter()
        .map(|test| {
            let outcome = match str_field(test, "outcome") {
                Some("passed" | "xpassed") => TestOutcome::Passed,
                Some("failed" | "error") => TestOutcome::Failed,
                _ => TestOutcome::Skipped,
            };
            let call = test.get("call");
            TestCase {
                name: str_field(test, "nodeid").unwrap_or("<unnamed>").to_string(),
                outcome,
                duration_secs: call.and_then(|c| c.get("duration")).and_then(Value::as_f64),
                message: call
                    .and_then(|c| str_field(c, "longrepr"))
                    .map(str::to_string),
            }
        })
        .collect()
}

/// Scan the final summary: `==== 1 failed, 3 passed, 1 skipped in 0.52s ====`.
fn from_text(output: &ProcessOutput) -> TestReport {
    let summary = output
        .stdout
        .lines()
        .chain(output.stderr.lines())
        .filter(|line| DURATION_PATTERN.is_match(line) && COUNT_PATTERN.is_match(line))
        .last();

    let mut counts = TestCounts::default();
    let mut duration = 0.0;
    if let Some(line) = summary {
        for caps in COUNT_PATTERN.captures_iter(line) {
            let n: u64 = caps[1].parse().unwrap_or(0);
            match &caps[2] {
                "passed" | "xpassed" => counts.passed += n,
                "failed" | "error" | "errors" => counts.failed += n,
                _ => counts.skipped += n,
            }
        }
        if let Some(caps) = DURATION_PATTERN.captures(line) {
            duration = caps[1].parse().unwrap_or(0.0);
        }
    }

    TestReport::new(counts, duration, output.exit_code)
}

#[cfg(test)]
#[path = "pytest_tests.rs"]
mod tests;
