// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Code coverage summaries
//!
//! jest reports an istanbul `coverageMap` inside its JSON; pytest-cov and
//! jest's text reporter print a totals row that is scanned instead.

use regex::Regex;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use tsuite_core::{CoverageMetric, CoverageSummary};

// Allow expect here as the regex is compile-time verified to be valid
// `TOTAL    120     30    75%` or, with branches, `TOTAL  120  30  40  5  70%`
#[allow(clippy::expect_used)]
static PYTEST_TOTAL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^TOTAL\s+(\d+)\s+(\d+)(?:\s+(\d+)\s+(\d+))?\s+(\d+(?:\.\d+)?)%\s*$")
        .expect("constant regex pattern is valid")
});

// `All files |   85.71 |       50 |     100 |   85.71 |`
#[allow(clippy::expect_used)]
static JEST_ALL_FILES_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*All files\s*\|\s*([\d.]+)\s*\|\s*([\d.]+)\s*\|\s*([\d.]+)\s*\|\s*([\d.]+)")
        .expect("constant regex pattern is valid")
});

/// Summarize an istanbul coverage map keyed by file path.
///
/// Returns `None` for a missing or empty map.
pub(super) fn from_istanbul(map: &Value) -> Option<CoverageSummary> {
    let files = map.as_object().filter(|m| !m.is_empty())?;

    let mut statements = CoverageMetric::default();
    let mut functions = CoverageMetric::default();
    let mut branches = CoverageMetric::default();
    let mut lines = CoverageMetric::default();
    for file in files.values() {
        // Serialized CoverageMap entries may wrap the data.
        let file = file.get("data").unwrap_or(file);
        tally(&mut statements, file.get("s"));
        tally(&mut functions, file.get("f"));
        if let Some(b) = file.get("b").and_then(Value::as_object) {
            for arms in b.values().filter_map(Value::as_array) {
                tally_counts(&mut branches, arms.iter());
            }
        }
        let file_lines = line_hits(file);
        lines.total += file_lines.len() as u64;
        lines.covered += file_lines.values().filter(|hit| **hit).count() as u64;
    }

    let has_lines = lines.total > 0;
    Some(CoverageSummary {
        percent: if has_lines {
            lines.percent()
        } else {
            statements.percent()
        },
        lines: has_lines.then_some(lines),
        statements: Some(statements),
        functions: Some(functions),
        branches: Some(branches),
    })
}

fn tally(metric: &mut CoverageMetric, hits: Option<&Value>) {
    if let Some(hits) = hits.and_then(Value::as_object) {
        tally_counts(metric, hits.values());
    }
}

fn tally_counts<'a>(metric: &mut CoverageMetric, counts: impl Iterator<Item = &'a Value>) {
    for count in counts {
        metric.total += 1;
        if count.as_u64().is_some_and(|n| n > 0) {
            metric.covered += 1;
        }
    }
}

/// Line number to "any statement on it ran".
fn line_hits(file: &Value) -> BTreeMap<u64, bool> {
    let mut lines = BTreeMap::new();
    let (Some(map), Some(hits)) = (
        file.get("statementMap").and_then(Value::as_object),
        file.get("s").and_then(Value::as_object),
    ) else {
        return lines;
    };
    for (id, location) in map {
        let Some(line) = location.pointer("/start/line").and_then(Value::as_u64) else {
            continue;
        };
        let hit = hits.get(id).and_then(Value::as_u64).is_some_and(|n| n > 0);
        *lines.entry(line).or_insert(false) |= hit;
    }
    lines
}

/// The pytest-cov terminal report's `TOTAL` row.
pub(super) fn from_pytest_cov(text: &str) -> Option<CoverageSummary> {
    let caps = text
        .lines()
        .filter_map(|line| PYTEST_TOTAL_PATTERN.captures(line.trim_end()))
        .last()?;
    let number = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u64>().ok());

    let stmts = number(1)?;
    let missed = number(2)?;
    // With --cov-branch the percentage blends statements and branches, and
    // the row has no count of missed branch arms, so only statements are kept.
    Some(CoverageSummary {
        percent: caps[5].parse().unwrap_or(0.0),
        statements: Some(CoverageMetric::new(stmts.saturating_sub(missed), stmts)),
        ..Default::default()
    })
}

/// jest's text reporter `All files` row; only percentages are known.
pub(super) fn from_jest_text(text: &str) -> Option<CoverageSummary> {
    let caps = text
        .lines()
        .filter_map(|line| JEST_ALL_FILES_PATTERN.captures(line))
        .last()?;
    // Columns: statements, branches, functions, lines.
    caps[4].parse().ok().map(|percent| CoverageSummary {
        percent,
        ..Default::default()
    })
}

#[cfg(test)]
#[path = "coverage_tests.rs"]
mod tests;
