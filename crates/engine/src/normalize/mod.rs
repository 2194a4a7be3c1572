// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tool output normalization
//!
//! Each tool's raw output is turned into the canonical report. Parsing never
//! fails: malformed or missing machine-readable output degrades to text
//! scanning (tests) or zero findings (scans), with `degraded` set and a
//! bounded tail of the raw text retained.

mod coverage;
mod jest;
mod npm;
mod pytest;
mod safety;
mod semgrep;
mod severity;

pub use severity::{map_severity, SeverityTable};

use serde_json::Value;
use tsuite_adapters::ProcessOutput;
use tsuite_core::{Finding, Report, ScannerRun, SecurityReport, SourceTool, TestReport};

/// Bytes of raw output kept on degraded reports.
pub const RAW_TAIL_LIMIT: usize = 8 * 1024;

/// Output of a test-suite run.
#[derive(Debug, Clone)]
pub enum TestOutput {
    Jest(ProcessOutput),
    Pytest {
        output: ProcessOutput,
        /// Contents of the JSON report file, if the run produced one.
        report_json: Option<String>,
    },
}

/// Output of one scanner invocation.
#[derive(Debug, Clone)]
pub enum ScanOutput {
    NpmAudit(ProcessOutput),
    Safety(ProcessOutput),
    Semgrep(ProcessOutput),
}

impl ScanOutput {
    pub fn tool(&self) -> SourceTool {
        match self {
            ScanOutput::NpmAudit(_) => SourceTool::Npm,
            ScanOutput::Safety(_) => SourceTool::Safety,
            ScanOutput::Semgrep(_) => SourceTool::Semgrep,
        }
    }

    fn output(&self) -> &ProcessOutput {
        match self {
            ScanOutput::NpmAudit(o) | ScanOutput::Safety(o) | ScanOutput::Semgrep(o) => o,
        }
    }
}

/// Everything an executor collected from a workspace.
#[derive(Debug, Clone)]
pub enum RawOutput {
    Test(TestOutput),
    /// Scanner outputs in invocation order; empty when nothing applied.
    Scan(Vec<ScanOutput>),
}

/// Turn raw executor output into a canonical report.
pub fn normalize(raw: RawOutput) -> Report {
    match raw {
        RawOutput::Test(TestOutput::Jest(output)) => Report::Test(jest::normalize(&output)),
        RawOutput::Test(TestOutput::Pytest {
            output,
            report_json,
        }) => Report::Test(pytest::normalize(&output, report_json.as_deref())),
        RawOutput::Scan(outputs) => Report::Security(normalize_scan(&outputs)),
    }
}

/// Findings from every scanner, concatenated in invocation order.
///
/// A scan whose tools all ran to completion is successful regardless of
/// their exit codes; scanners exit non-zero when they find something.
fn normalize_scan(outputs: &[ScanOutput]) -> SecurityReport {
    let mut findings = Vec::new();
    let mut runs = Vec::with_capacity(outputs.len());
    for scan in outputs {
        let output = scan.output();
        let parsed = match scan {
            ScanOutput::NpmAudit(o) => npm::parse(&o.stdout),
            ScanOutput::Safety(o) => safety::parse(&o.stdout),
            ScanOutput::Semgrep(o) => semgrep::parse(&o.stdout),
        };
        let tool = scan.tool();
        let (tool_findings, degraded) = match parsed {
            Some(found) => (found, false),
            None => {
                tracing::warn!(
                    tool = tool.as_str(),
                    exit_code = output.exit_code,
                    "parse degraded: no usable JSON output, recording zero findings"
                );
                (Vec::new(), true)
            }
        };
        runs.push(ScannerRun {
            tool,
            exit_code: output.exit_code,
            findings: tool_findings.len() as u64,
            degraded,
            raw_output: degraded.then(|| raw_tail(output)),
        });
        findings.extend(tool_findings);
    }
    SecurityReport::from_findings(findings, runs, true)
}

/// Mark a test report degraded and attach the raw tail.
fn degrade(mut report: TestReport, tool: &str, output: &ProcessOutput) -> TestReport {
    tracing::warn!(
        tool,
        exit_code = output.exit_code,
        "parse degraded: falling back to text summary"
    );
    report.degraded = true;
    report.raw_output = Some(raw_tail(output));
    report
}

/// Last [`RAW_TAIL_LIMIT`] bytes of stdout followed by stderr.
pub fn raw_tail(output: &ProcessOutput) -> String {
    let mut combined = String::with_capacity(output.stdout.len() + output.stderr.len() + 1);
    combined.push_str(&output.stdout);
    if !output.stderr.is_empty() {
        if !combined.is_empty() && !combined.ends_with('\n') {
            combined.push('\n');
        }
        combined.push_str(&output.stderr);
    }
    tail(&combined, RAW_TAIL_LIMIT).to_string()
}

/// Suffix of at most `max` bytes, cut on a char boundary.
fn tail(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut start = s.len() - max;
    while !s.is_char_boundary(start) {
        start += 1;
    }
    &s[start..]
}

/// Parse JSON that may be preceded by banner lines (npm lifecycle echo,
/// deprecation notices) or followed by trailing noise.
fn parse_json_lenient(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(value) = serde_json::from_str(trimmed) {
        return Some(value);
    }

    let start = line_start_of_json(trimmed)?;
    let candidate = &trimmed[start..];
    if let Ok(value) = serde_json::from_str(candidate) {
        return Some(value);
    }

    // Trailing noise: stream the first complete value and ignore the rest.
    let mut stream = serde_json::Deserializer::from_str(candidate).into_iter::<Value>();
    match stream.next() {
        Some(Ok(value)) => Some(value),
        _ => None,
    }
}

/// Byte offset of the first line that begins with `{` or `[`.
fn line_start_of_json(text: &str) -> Option<usize> {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        let stripped = line.trim_start();
        if stripped.starts_with('{') || stripped.starts_with('[') {
            return Some(offset + (line.len() - stripped.len()));
        }
        offset += line.len();
    }
    None
}

/// String field, treating JSON null and empty strings as absent.
fn str_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn u64_field(value: &Value, key: &str) -> Option<u64> {
    value.get(key).and_then(|v| {
        v.as_u64()
            .or_else(|| v.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
    })
}

/// Value as a comma-separated string: accepts a string or an array of strings.
fn joined(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Array(items) => {
            let parts: Vec<&str> = items
                .iter()
                .filter_map(Value::as_str)
                .filter(|s| !s.is_empty())
                .collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        _ => None,
    }
}

/// Convenience used by the per-tool parsers.
fn finding(
    source: SourceTool,
    identifier: impl Into<String>,
    raw_severity: &str,
    description: impl Into<String>,
    location: impl Into<String>,
) -> Finding {
    let mut f = Finding::new(
        source,
        identifier,
        map_severity(source, raw_severity),
        description,
        location,
    );
    f.raw_severity = raw_severity.to_string();
    f
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
