// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-tool executors
//!
//! An executor runs one tool's procedure inside an already-cloned workspace
//! and returns the raw output for normalization. Installation steps are
//! best-effort; the run or scan step itself is not.

mod dependency;
mod jest;
mod pytest;
mod registry;
mod sast;

pub use dependency::DependencyScanner;
pub use jest::JestExecutor;
pub use pytest::PytestExecutor;
pub use registry::{ExecutorRegistry, UnsupportedKind};
pub use sast::SastScanner;

use crate::error::JobError;
use crate::normalize::RawOutput;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use tsuite_adapters::{
    ProcessRunner, ProcessSpec, INSTALL_TIMEOUT, RUN_TIMEOUT, SCAN_TIMEOUT,
};
use tsuite_core::{JobKind, JobRequest};

/// Per-invocation deadlines used by executors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutorTimeouts {
    pub install: Duration,
    pub run: Duration,
    pub scan: Duration,
}

impl Default for ExecutorTimeouts {
    fn default() -> Self {
        Self {
            install: INSTALL_TIMEOUT,
            run: RUN_TIMEOUT,
            scan: SCAN_TIMEOUT,
        }
    }
}

/// Caller-supplied knobs carried from the request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOptions {
    /// Replaces the default run command; split on whitespace.
    pub command: Option<String>,
    pub env: BTreeMap<String, String>,
}

impl From<&JobRequest> for ExecOptions {
    fn from(request: &JobRequest) -> Self {
        Self {
            command: request.command.clone(),
            env: request.env.clone(),
        }
    }
}

/// One tool's run-and-collect procedure.
#[async_trait]
pub trait Executor: Send + Sync + 'static {
    fn kind(&self) -> JobKind;

    /// Lowercase subtype name this executor answers to.
    fn subtype(&self) -> &'static str;

    async fn execute(&self, workspace: &Path, options: &ExecOptions) -> Result<RawOutput, JobError>;
}

/// Split a command line on whitespace into program and arguments.
///
/// Returns `None` for a blank command.
pub fn split_command(command: &str) -> Option<(String, Vec<String>)> {
    let mut parts = command.split_whitespace().map(str::to_string);
    let program = parts.next()?;
    Some((program, parts.collect()))
}

/// The caller's command when given, else the default.
fn resolve_command(
    options: &ExecOptions,
    default_program: &str,
    default_args: &[&str],
) -> (String, Vec<String>) {
    options
        .command
        .as_deref()
        .and_then(split_command)
        .unwrap_or_else(|| {
            (
                default_program.to_string(),
                default_args.iter().map(|a| a.to_string()).collect(),
            )
        })
}

/// Run an installation step. Non-zero exits and launch failures are logged
/// and tolerated; a timeout aborts the job.
async fn install_step<P: ProcessRunner>(runner: &P, spec: ProcessSpec) -> Result<(), JobError> {
    let description = spec.description.clone();
    match runner.run(spec).await {
        Ok(output) if output.success() => Ok(()),
        Ok(output) => {
            let last_line = output.stderr.lines().last().unwrap_or("");
            tracing::warn!(
                step = %description,
                exit_code = output.exit_code,
                stderr = last_line,
                "install step failed, continuing"
            );
            Ok(())
        }
        Err(e) if e.is_timeout() => Err(e.into()),
        Err(e) => {
            tracing::warn!(step = %description, error = %e, "install step could not run, continuing");
            Ok(())
        }
    }
}

/// True when `name` exists in the workspace root.
async fn has_marker(workspace: &Path, name: &str) -> bool {
    tokio::fs::try_exists(workspace.join(name))
        .await
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
