// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `npm audit --json` output, both the v7+ and the legacy v6 shape

use super::{finding, joined, parse_json_lenient, str_field};
use serde_json::Value;
use tsuite_core::{Finding, SourceTool};

/// `None` when the output carries neither known shape.
pub(super) fn parse(stdout: &str) -> Option<Vec<Finding>> {
    let value = parse_json_lenient(stdout)?;
    if let Some(vulns) = value.get("vulnerabilities").and_then(Value::as_object) {
        let mut findings: Vec<Finding> = vulns
            .iter()
            .map(|(name, vuln)| from_vulnerability(name, vuln))
            .collect();
        findings.sort_by(|a, b| a.location.cmp(&b.location));
        return Some(findings);
    }
    if let Some(advisories) = value.get("advisories").and_then(Value::as_object) {
        return Some(advisories.values().map(from_advisory).collect());
    }
    None
}

/// v7+: one entry per vulnerable package.
fn from_vulnerability(key: &str, vuln: &Value) -> Finding {
    let package = str_field(vuln, "name").unwrap_or(key);
    let severity = str_field(vuln, "severity").unwrap_or("");

    // `via` mixes advisory objects with names of vulnerable dependencies.
    let advisory = vuln
        .get("via")
        .and_then(Value::as_array)
        .and_then(|via| via.iter().find(|v| v.is_object()));

    let identifier = advisory
        .and_then(|a| {
            joined(a.get("cve"))
                .or_else(|| str_field(a, "url").map(str::to_string))
                .or_else(|| a.get("source").map(|s| format!("npm-advisory-{s}")))
        })
        .unwrap_or_else(|| format!("npm:{package}"));

    let description = advisory
        .and_then(|a| str_field(a, "title"))
        .or_else(|| str_field(vuln, "title"))
        .map(str::to_string)
        .unwrap_or_else(|| {
            let via_names: Vec<&str> = vuln
                .get("via")
                .and_then(Value::as_array)
                .map(|via| via.iter().filter_map(Value::as_str).collect())
                .unwrap_or_default();
            if via_names.is_empty() {
                format!("vulnerable package {package}")
            } else {
                format!("depends on vulnerable {}", via_names.join(", "))
            }
        });

    let mut f = finding(SourceTool::Npm, identifier, severity, description, package);
    f.package = Some(package.to_string());
    f.affected_versions = str_field(vuln, "range").map(str::to_string);
    f.fixed_versions = vuln
        .get("fixAvailable")
        .and_then(|fix| str_field(fix, "version"))
        .map(str::to_string);
    f
}

/// v6: one entry per advisory.
fn from_advisory(advisory: &Value) -> Finding {
    let package = str_field(advisory, "module_name").unwrap_or("unknown");
    let severity = str_field(advisory, "severity").unwrap_or("");
    let identifier = advisory
        .get("cves")
        .and_then(Value::as_array)
        .and_then(|cves| cves.iter().find_map(Value::as_str))
        .map(str::to_string)
        .or_else(|| advisory.get("id").map(|id| format!("npm-advisory-{id}")))
        .unwrap_or_else(|| format!("npm:{package}"));
    let description = str_field(advisory, "title")
        .map(str::to_string)
        .unwrap_or_else(|| format!("vulnerable package {package}"));

    let mut f = finding(SourceTool::Npm, identifier, severity, description, package);
    f.package = Some(package.to_string());
    f.affected_versions = str_field(advisory, "vulnerable_versions").map(str::to_string);
    f.fixed_versions = str_field(advisory, "patched_versions").map(str::to_string);
    f
}

#[cfg(test)]
#[path = "npm_tests.rs"]
mod tests;
