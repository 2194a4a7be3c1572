// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Jest test runs

use super::{has_marker, install_step, resolve_command, ExecOptions, Executor, ExecutorTimeouts};
use crate::error::JobError;
use crate::normalize::{RawOutput, TestOutput};
use async_trait::async_trait;
use std::path::Path;
use tsuite_adapters::{ProcessRunner, ProcessSpec};
use tsuite_core::JobKind;

pub struct JestExecutor<P> {
    runner: P,
    timeouts: ExecutorTimeouts,
}

impl<P: ProcessRunner> JestExecutor<P> {
    pub fn new(runner: P, timeouts: ExecutorTimeouts) -> Self {
        Self { runner, timeouts }
    }
}

#[async_trait]
impl<P: ProcessRunner> Executor for JestExecutor<P> {
    fn kind(&self) -> JobKind {
        JobKind::Test
    }

    fn subtype(&self) -> &'static str {
        "jest"
    }

    async fn execute(&self, workspace: &Path, options: &ExecOptions) -> Result<RawOutput, JobError> {
        if has_marker(workspace, "package.json").await {
            let install = ProcessSpec::new("npm", workspace, self.timeouts.install)
                .args(["install"])
                .describe("npm install");
            install_step(&self.runner, install).await?;
        } else {
            tracing::info!("no package.json, skipping npm install");
        }

        let (program, args) =
            resolve_command(options, "npm", &["test", "--", "--json", "--coverage"]);
        let run = ProcessSpec::new(program, workspace, self.timeouts.run)
            .args(args)
            .envs(&options.env)
            .env("CI", "true")
            .describe("jest run");
        let output = self.runner.run(run).await?;
        tracing::info!(exit_code = output.exit_code, "jest run finished");

        Ok(RawOutput::Test(TestOutput::Jest(output)))
    }
}

#[cfg(test)]
#[path = "jest_tests.rs"]
mod tests;
