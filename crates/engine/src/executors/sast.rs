// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Static analysis with semgrep

use super::{install_step, ExecOptions, Executor, ExecutorTimeouts};
use crate::error::JobError;
use crate::normalize::{RawOutput, ScanOutput};
use async_trait::async_trait;
use std::path::Path;
use tsuite_adapters::{ProcessRunner, ProcessSpec};
use tsuite_core::JobKind;

pub struct SastScanner<P> {
    runner: P,
    timeouts: ExecutorTimeouts,
    bootstrap: bool,
}

impl<P: ProcessRunner> SastScanner<P> {
    pub fn new(runner: P, timeouts: ExecutorTimeouts) -> Self {
        Self {
            runner,
            timeouts,
            bootstrap: false,
        }
    }

    /// Install semgrep with pip before scanning.
    pub fn with_bootstrap(mut self, bootstrap: bool) -> Self {
        self.bootstrap = bootstrap;
        self
    }
}

#[async_trait]
impl<P: ProcessRunner> Executor for SastScanner<P> {
    fn kind(&self) -> JobKind {
        JobKind::SecurityScan
    }

    fn subtype(&self) -> &'static str {
        "sast"
    }

    async fn execute(&self, workspace: &Path, options: &ExecOptions) -> Result<RawOutput, JobError> {
        if let Some(command) = &options.command {
            tracing::debug!(command, "scanners ignore run commands");
        }
        if self.bootstrap {
            let install = ProcessSpec::new("pip", workspace, self.timeouts.install)
                .args(["install", "semgrep"])
                .describe("semgrep bootstrap");
            install_step(&self.runner, install).await?;
        }

        let scan = ProcessSpec::new("semgrep", workspace, self.timeouts.scan)
            .args(["--config=auto", "--json", "."])
            .envs(&options.env)
            .describe("semgrep scan");
        let output = self.runner.run(scan).await?;
        tracing::info!(exit_code = output.exit_code, "semgrep finished");

        Ok(RawOutput::Scan(vec![ScanOutput::Semgrep(output)]))
    }
}

#[cfg(test)]
#[path = "sast_tests.rs"]
mod tests;
