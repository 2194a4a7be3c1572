// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `semgrep --json` output

use super::{finding, parse_json_lenient, str_field, u64_field};
use serde_json::Value;
use tsuite_core::{Finding, SourceTool};

pub(super) fn parse(stdout: &str) -> Option<Vec<Finding>> {
    let value = parse_json_lenient(stdout)?;
    let results = value.get("results")?.as_array()?;
    Some(results.iter().map(from_result).collect())
}

fn from_result(result: &Value) -> Finding {
    let extra = result.get("extra");
    let rule = str_field(result, "check_id").unwrap_or("semgrep");
    let path = str_field(result, "path").unwrap_or("");
    let severity = extra.and_then(|e| str_field(e, "severity")).unwrap_or("");
    let message = extra
        .and_then(|e| str_field(e, "message"))
        .unwrap_or(rule)
        .to_string();

    let mut f = finding(SourceTool::Semgrep, rule, severity, message, path);
    f.line = result.get("start").and_then(|s| u64_field(s, "line"));
    f.category = Some(
        extra
            .and_then(|e| e.get("metadata"))
            .and_then(|m| str_field(m, "category"))
            .unwrap_or("security")
            .to_string(),
    );
    f
}

#[cfg(test)]
#[path = "semgrep_tests.rs"]
mod tests;
