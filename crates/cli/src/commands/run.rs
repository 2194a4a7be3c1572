// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tsuite run`: submit one job to an in-process engine and wait for it

use crate::config::Config;
use crate::exit_error::ExitError;
use crate::output::{format_ack, format_results, format_status, print_json, OutputFormat};
use crate::poll::{Poller, Tick};
use clap::Args;
use std::sync::Arc;
use std::time::Duration;
use tsuite_adapters::{ProcessRunner, SubprocessRunner, TracedProcess, WorkspaceManager};
use tsuite_core::{JobKey, JobKind, JobRequest, JobStatus, SystemClock, DEFAULT_BRANCH};
use tsuite_engine::{Orchestrator, OrchestratorDeps};
use tsuite_storage::MemoryJobRegistry;

/// Exit code when the job finished in `failed`.
pub const EXIT_JOB_FAILED: i32 = 2;
/// Exit code when `--wait-timeout` elapsed first.
pub const EXIT_WAIT_TIMEOUT: i32 = 3;
/// Exit code on Ctrl+C.
pub const EXIT_INTERRUPTED: i32 = 130;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Job id, unique within its kind
    #[arg(long)]
    pub id: String,

    /// Job kind: test or security-scan
    #[arg(long)]
    pub kind: JobKind,

    /// jest or pytest for tests; dependency or sast for scans
    #[arg(long)]
    pub subtype: String,

    /// Repository URL to clone
    #[arg(long)]
    pub repo: String,

    #[arg(long, default_value = DEFAULT_BRANCH)]
    pub branch: String,

    /// Replace the default run command (split on whitespace)
    #[arg(long)]
    pub command: Option<String>,

    /// Extra environment for the run step (repeatable)
    #[arg(long = "env", value_name = "KEY=VALUE", value_parser = parse_env_pair)]
    pub env: Vec<(String, String)>,

    /// Give up waiting after this many seconds
    #[arg(long, value_name = "SECS")]
    pub wait_timeout: Option<u64>,

    #[arg(long, value_name = "MS", default_value_t = 200, hide = true)]
    pub poll_interval_ms: u64,
}

impl RunArgs {
    pub fn to_request(&self) -> JobRequest {
        let mut request = JobRequest::new(self.kind, self.id.as_str(), &self.subtype, &self.repo)
            .with_branch(&self.branch);
        if let Some(command) = &self.command {
            request = request.with_command(command);
        }
        for (key, value) in &self.env {
            request = request.with_env(key, value);
        }
        request
    }
}

fn parse_env_pair(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{s}'")),
    }
}

pub type HostOrchestrator<P> = Orchestrator<MemoryJobRegistry, P, SystemClock>;

/// Wire an engine with the in-memory registry and the wall clock.
pub fn build_orchestrator<P: ProcessRunner>(config: &Config, runner: P) -> HostOrchestrator<P> {
    let deps = OrchestratorDeps {
        registry: Arc::new(MemoryJobRegistry::new()),
        executors: super::executors(config, runner.clone()),
        workspaces: WorkspaceManager::new(config.workspace_root.clone(), runner)
            .with_clone_timeout(config.clone_timeout()),
        clock: SystemClock,
    };
    Orchestrator::new(deps, config.orchestrator())
}

pub async fn handle(args: RunArgs, config: &Config, format: OutputFormat) -> anyhow::Result<()> {
    let runner = TracedProcess::new(SubprocessRunner::new(config.output_limit_bytes));
    let orchestrator = build_orchestrator(config, runner);

    let request = args.to_request();
    let key = JobKey::new(request.kind, request.id.clone());
    let ack = orchestrator
        .submit(request)
        .map_err(|e| ExitError::new(1, e.to_string()))?;
    match format {
        OutputFormat::Text => println!("{}", format_ack(&ack)),
        OutputFormat::Json => print_json(&ack)?,
    }

    let mut poller = Poller::new(
        Duration::from_millis(args.poll_interval_ms),
        args.wait_timeout.map(Duration::from_secs),
    );
    wait_or_abort(&orchestrator, &key, &mut poller, format).await?;

    let results = orchestrator.results(&key)?;
    match format {
        OutputFormat::Text => print!("{}", format_results(&results)),
        OutputFormat::Json => print_json(&results)?,
    }
    orchestrator.shutdown().await;

    match results.status {
        JobStatus::Completed => Ok(()),
        _ => Err(ExitError::silent(EXIT_JOB_FAILED).into()),
    }
}

/// Wait for the job; if waiting stops early, cancel it so its tool is
/// killed and its clone removed before the process exits.
async fn wait_or_abort<P: ProcessRunner>(
    orchestrator: &HostOrchestrator<P>,
    key: &JobKey,
    poller: &mut Poller,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let waited = wait_terminal(orchestrator, key, poller, format).await;
    if waited.is_err() {
        orchestrator.abort().await;
    }
    waited
}

/// Print each newly observed status until the job is terminal.
async fn wait_terminal<P: ProcessRunner>(
    orchestrator: &HostOrchestrator<P>,
    key: &JobKey,
    poller: &mut Poller,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let mut last = JobStatus::Queued;
    loop {
        let status = orchestrator.status(key)?;
        if status.status != last {
            last = status.status;
            match format {
                OutputFormat::Text => println!("{}", format_status(&status)),
                OutputFormat::Json => print_json(&status)?,
            }
        }
        if status.status.is_terminal() {
            return Ok(());
        }

        match poller.tick().await {
            Tick::Ready => {}
            Tick::Timeout => {
                return Err(ExitError::new(
                    EXIT_WAIT_TIMEOUT,
                    format!("timed out waiting for {key} (last status: {last})"),
                )
                .into());
            }
            Tick::Interrupted => {
                return Err(ExitError::new(EXIT_INTERRUPTED, "interrupted").into());
            }
        }
    }
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
