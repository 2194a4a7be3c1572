// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pytest runs with the json-report plugin

use super::{has_marker, install_step, resolve_command, ExecOptions, Executor, ExecutorTimeouts};
use crate::error::JobError;
use crate::normalize::{RawOutput, TestOutput};
use async_trait::async_trait;
use std::path::Path;
use tsuite_adapters::{ProcessRunner, ProcessSpec};
use tsuite_core::JobKind;

/// File the json-report plugin writes, relative to the workspace.
pub const REPORT_FILE: &str = "report.json";

pub struct PytestExecutor<P> {
    runner: P,
    timeouts: ExecutorTimeouts,
}

impl<P: ProcessRunner> PytestExecutor<P> {
    pub fn new(runner: P, timeouts: ExecutorTimeouts) -> Self {
        Self { runner, timeouts }
    }
}

#[async_trait]
impl<P: ProcessRunner> Executor for PytestExecutor<P> {
    fn kind(&self) -> JobKind {
        JobKind::Test
    }

    fn subtype(&self) -> &'static str {
        "pytest"
    }

    async fn execute(&self, workspace: &Path, options: &ExecOptions) -> Result<RawOutput, JobError> {
        if has_marker(workspace, "requirements.txt").await {
            let install = ProcessSpec::new("pip", workspace, self.timeouts.install)
                .args(["install", "-r", "requirements.txt"])
                .describe("pip install");
            install_step(&self.runner, install).await?;
        } else {
            tracing::info!("no requirements.txt, skipping pip install");
        }

        // A report committed to the repo must not pass for this run's.
        let report_path = workspace.join(REPORT_FILE);
        if tokio::fs::remove_file(&report_path).await.is_ok() {
            tracing::debug!("removed stale report.json");
        }

        let report_flag = format!("--json-report-file={REPORT_FILE}");
        let (program, args) =
            resolve_command(options, "pytest", &["--json-report", report_flag.as_str()]);
        let run = ProcessSpec::new(program, workspace, self.timeouts.run)
            .args(args)
            .envs(&options.env)
            .env("CI", "true")
            .describe("pytest run");
        let output = self.runner.run(run).await?;

        let report_json = tokio::fs::read_to_string(&report_path).await.ok();
        tracing::info!(
            exit_code = output.exit_code,
            report_file = report_json.is_some(),
            "pytest run finished"
        );

        Ok(RawOutput::Test(TestOutput::Pytest {
            output,
            report_json,
        }))
    }
}

#[cfg(test)]
#[path = "pytest_tests.rs"]
mod tests;
