// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tsuite health`: can this host run jobs, and what would the engine look like

use crate::config::Config;
use crate::exit_error::ExitError;
use crate::output::{print_json, OutputFormat};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tsuite_adapters::SubprocessRunner;
use tsuite_engine::HealthSummary;

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub workspace_root: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub engine: HealthSummary,
}

impl HealthReport {
    fn healthy(&self) -> bool {
        self.error.is_none()
    }
}

pub async fn handle(config: &Config, format: OutputFormat) -> anyhow::Result<()> {
    let report = collect(config).await;
    match format {
        OutputFormat::Text => print!("{}", format_health(&report)),
        OutputFormat::Json => print_json(&report)?,
    }
    if report.healthy() {
        Ok(())
    } else {
        Err(ExitError::silent(1).into())
    }
}

/// Start an engine from `config`, read its summary, and stop it again.
pub async fn collect(config: &Config) -> HealthReport {
    let orchestrator =
        super::run::build_orchestrator(config, SubprocessRunner::new(config.output_limit_bytes));
    let engine = orchestrator.health();
    orchestrator.shutdown().await;

    let error = check_workspace_root(&config.workspace_root).err();
    if let Some(error) = &error {
        tracing::warn!(%error, "workspace root unusable");
    }
    HealthReport {
        status: if error.is_none() { "ok" } else { "degraded" },
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        workspace_root: config.workspace_root.clone(),
        error,
        engine,
    }
}

/// Workspaces are created under the root, so it must be a writable directory.
fn check_workspace_root(root: &Path) -> Result<(), String> {
    std::fs::create_dir_all(root).map_err(|e| format!("{}: {e}", root.display()))?;
    let metadata = std::fs::metadata(root).map_err(|e| format!("{}: {e}", root.display()))?;
    if metadata.permissions().readonly() {
        return Err(format!("{}: read-only", root.display()));
    }
    Ok(())
}

fn format_health(report: &HealthReport) -> String {
    let mut out = format!("{} {}: {}\n", report.service, report.version, report.status);
    let _ = writeln!(out, "workspace root: {}", report.workspace_root.display());
    let engine = &report.engine;
    let _ = writeln!(
        out,
        "jobs: {} queued, {} running, {} completed, {} failed (max {} concurrent)",
        engine.queued, engine.running, engine.completed, engine.failed, engine.max_concurrent_jobs
    );
    if let Some(error) = &report.error {
        let _ = writeln!(out, "error: {error}");
    }
    out
}

#[cfg(test)]
#[path = "health_tests.rs"]
mod tests;
