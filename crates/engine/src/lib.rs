// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! tsuite execution engine: executors, output normalization, and the
//! orchestrator that ties them to the job registry

mod error;
pub mod executors;
pub mod normalize;
mod orchestrator;

pub use error::{JobError, QueryError, SubmitError};
pub use executors::{
    DependencyScanner, ExecOptions, Executor, ExecutorRegistry, ExecutorTimeouts, JestExecutor,
    PytestExecutor, SastScanner, UnsupportedKind,
};
pub use normalize::{normalize, RawOutput, ScanOutput, TestOutput};
pub use orchestrator::{
    HealthSummary, Orchestrator, OrchestratorConfig, OrchestratorDeps,
    DEFAULT_MAX_CONCURRENT_JOBS, DEFAULT_PRUNE_INTERVAL,
};
