// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `safety check --json` output
//!
//! Three shapes are seen in the wild: a list of objects, the legacy list of
//! positional arrays `[package, spec, installed, advisory, id]`, and the
//! v2+ report object with a `vulnerabilities` list.

use super::{finding, joined, parse_json_lenient, str_field};
use serde_json::Value;
use tsuite_core::{Finding, SourceTool};

pub(super) fn parse(stdout: &str) -> Option<Vec<Finding>> {
    let value = parse_json_lenient(stdout)?;
    let entries = match &value {
        Value::Array(items) => items.as_slice(),
        Value::Object(_) => value.get("vulnerabilities")?.as_array()?.as_slice(),
        _ => return None,
    };
    Some(entries.iter().filter_map(from_entry).collect())
}

fn from_entry(entry: &Value) -> Option<Finding> {
    match entry {
        Value::Object(_) => Some(from_object(entry)),
        Value::Array(fields) => Some(from_positional(fields)),
        _ => None,
    }
}

fn from_object(entry: &Value) -> Finding {
    let package = str_field(entry, "package_name")
        .or_else(|| str_field(entry, "package"))
        .unwrap_or("unknown");
    let identifier = str_field(entry, "CVE")
        .or_else(|| str_field(entry, "cve"))
        .or_else(|| str_field(entry, "vulnerability_id"))
        .or_else(|| str_field(entry, "id"))
        .map(str::to_string)
        .unwrap_or_else(|| format!("safety:{package}"));
    let description = str_field(entry, "advisory")
        .or_else(|| str_field(entry, "vulnerability"))
        .map(str::to_string)
        .unwrap_or_else(|| format!("vulnerable package {package}"));
    let severity = severity_label(entry.get("severity"));

    let mut f = finding(SourceTool::Safety, identifier, &severity, description, package);
    f.package = Some(package.to_string());
    f.affected_versions = joined(entry.get("vulnerable_spec"))
        .or_else(|| joined(entry.get("affected_versions")));
    f.fixed_versions = joined(entry.get("fixed_versions"));
    f
}

fn from_positional(fields: &[Value]) -> Finding {
    let at = |i: usize| fields.get(i).and_then(Value::as_str).unwrap_or("");
    let package = if at(0).is_empty() { "unknown" } else { at(0) };
    let identifier = if at(4).is_empty() {
        format!("safety:{package}")
    } else {
        at(4).to_string()
    };
    let mut f = finding(SourceTool::Safety, identifier, "", at(3), package);
    f.package = Some(package.to_string());
    f.affected_versions = (!at(1).is_empty()).then(|| at(1).to_string());
    f
}

/// Severity may be a plain label, a CVSS object, or absent.
fn severity_label(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(obj @ Value::Object(_)) => ["cvssv3", "cvssv2"]
            .iter()
            .find_map(|k| obj.get(*k).and_then(|c| str_field(c, "base_severity")))
            .or_else(|| str_field(obj, "label"))
            .unwrap_or("")
            .to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
#[path = "safety_tests.rs"]
mod tests;
