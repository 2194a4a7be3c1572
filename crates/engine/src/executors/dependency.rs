// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dependency vulnerability scans (npm audit, safety)

use super::{has_marker, install_step, ExecOptions, Executor, ExecutorTimeouts};
use crate::error::JobError;
use crate::normalize::{RawOutput, ScanOutput};
use async_trait::async_trait;
use std::path::Path;
use tsuite_adapters::{ProcessRunner, ProcessSpec};
use tsuite_core::JobKind;

/// Picks scanners from the manifests present in the workspace.
///
/// `package.json` selects npm audit and `requirements.txt` selects safety.
/// When both exist both run, npm first.
pub struct DependencyScanner<P> {
    runner: P,
    timeouts: ExecutorTimeouts,
    bootstrap: bool,
}

impl<P: ProcessRunner> DependencyScanner<P> {
    pub fn new(runner: P, timeouts: ExecutorTimeouts) -> Self {
        Self {
            runner,
            timeouts,
            bootstrap: false,
        }
    }

    /// Install safety with pip before scanning Python manifests.
    pub fn with_bootstrap(mut self, bootstrap: bool) -> Self {
        self.bootstrap = bootstrap;
        self
    }

    async fn npm_audit(&self, workspace: &Path, options: &ExecOptions) -> Result<ScanOutput, JobError> {
        let lock = ProcessSpec::new("npm", workspace, self.timeouts.install)
            .args(["install", "--package-lock-only"])
            .envs(&options.env)
            .describe("npm lockfile install");
        install_step(&self.runner, lock).await?;

        let audit = ProcessSpec::new("npm", workspace, self.timeouts.scan)
            .args(["audit", "--json"])
            .envs(&options.env)
            .describe("npm audit");
        let output = self.runner.run(audit).await?;
        tracing::info!(exit_code = output.exit_code, "npm audit finished");
        Ok(ScanOutput::NpmAudit(output))
    }

    async fn safety(&self, workspace: &Path, options: &ExecOptions) -> Result<ScanOutput, JobError> {
        if self.bootstrap {
            let install = ProcessSpec::new("pip", workspace, self.timeouts.install)
                .args(["install", "safety"])
                .describe("safety bootstrap");
            install_step(&self.runner, install).await?;
        }

        let check = ProcessSpec::new("safety", workspace, self.timeouts.scan)
            .args(["check", "--json", "--file", "requirements.txt"])
            .envs(&options.env)
            .describe("safety check");
        let output = self.runner.run(check).await?;
        tracing::info!(exit_code = output.exit_code, "safety check finished");
        Ok(ScanOutput::Safety(output))
    }
}

#[async_trait]
impl<P: ProcessRunner> Executor for DependencyScanner<P> {
    fn kind(&self) -> JobKind {
        JobKind::SecurityScan
    }

    fn subtype(&self) -> &'static str {
        "dependency"
    }

    async fn execute(&self, workspace: &Path, options: &ExecOptions) -> Result<RawOutput, JobError> {
        if let Some(command) = &options.command {
            tracing::debug!(command, "scanners ignore run commands");
        }

        let mut outputs = Vec::new();
        if has_marker(workspace, "package.json").await {
            outputs.push(self.npm_audit(workspace, options).await?);
        }
        if has_marker(workspace, "requirements.txt").await {
            outputs.push(self.safety(workspace, options).await?);
        }
        if outputs.is_empty() {
            tracing::warn!("no package.json or requirements.txt, nothing to scan");
        }

        Ok(RawOutput::Scan(outputs))
    }
}

#[cfg(test)]
#[path = "dependency_tests.rs"]
mod tests;
