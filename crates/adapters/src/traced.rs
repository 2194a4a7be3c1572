// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::process::{ProcessError, ProcessOutput, ProcessRunner, ProcessSpec};
use async_trait::async_trait;
use tracing::Instrument;

/// Wrapper that adds tracing to any ProcessRunner
#[derive(Clone)]
pub struct TracedProcess<P> {
    inner: P,
}

impl<P> TracedProcess<P> {
    pub fn new(inner: P) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }
}

#[async_trait]
impl<P: ProcessRunner> ProcessRunner for TracedProcess<P> {
    async fn run(&self, spec: ProcessSpec) -> Result<ProcessOutput, ProcessError> {
        let span = tracing::info_span!(
            "process.run",
            program = %spec.program,
            description = %spec.description,
            cwd = %spec.cwd.display(),
        );
        async {
            tracing::info!(
                command = %spec.command_line(),
                env_count = spec.env.len(),
                timeout_ms = spec.timeout.as_millis() as u64,
                "starting"
            );
            let start = std::time::Instant::now();
            let result = self.inner.run(spec).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(out) => tracing::info!(
                    exit_code = out.exit_code,
                    stdout_len = out.stdout.len(),
                    stderr_len = out.stderr.len(),
                    elapsed_ms,
                    "process exited"
                ),
                Err(e) if e.is_timeout() => tracing::warn!(elapsed_ms, error = %e, "timed out"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "run failed"),
            }
            result
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
