// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-tool severity vocabularies

use tsuite_core::{Severity, SourceTool};

/// Labels mapped to each canonical bucket, lowercase.
#[derive(Debug, Clone, Copy)]
pub struct SeverityTable {
    pub critical: &'static [&'static str],
    pub high: &'static [&'static str],
    pub medium: &'static [&'static str],
    pub low: &'static [&'static str],
}

const NPM: SeverityTable = SeverityTable {
    critical: &["critical"],
    high: &["high"],
    medium: &["moderate", "medium"],
    low: &["low", "info"],
};

const SAFETY: SeverityTable = SeverityTable {
    critical: &["critical"],
    high: &["high"],
    medium: &["medium", "moderate"],
    low: &["low"],
};

const SEMGREP: SeverityTable = SeverityTable {
    critical: &["error", "critical"],
    high: &["warning", "high"],
    medium: &["info", "medium"],
    low: &["low", "inventory", "experiment"],
};

impl SeverityTable {
    pub fn for_tool(tool: SourceTool) -> &'static SeverityTable {
        match tool {
            SourceTool::Npm => &NPM,
            SourceTool::Safety => &SAFETY,
            SourceTool::Semgrep => &SEMGREP,
        }
    }

    /// Case-insensitive lookup; anything unlisted is medium.
    pub fn map(&self, raw: &str) -> Severity {
        let label = raw.trim().to_ascii_lowercase();
        let label = label.as_str();
        if self.critical.contains(&label) {
            Severity::Critical
        } else if self.high.contains(&label) {
            Severity::High
        } else if self.low.contains(&label) {
            Severity::Low
        } else {
            Severity::Medium
        }
    }
}

pub fn map_severity(tool: SourceTool, raw: &str) -> Severity {
    SeverityTable::for_tool(tool).map(raw)
}

#[cfg(test)]
#[path = "severity_tests.rs"]
mod tests;
