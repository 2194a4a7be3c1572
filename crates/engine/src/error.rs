// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the orchestration engine

use crate::executors::UnsupportedKind;
use thiserror::Error;
use tsuite_adapters::{ProcessError, WorkspaceError};
use tsuite_core::{JobKey, JobStatus, RequestError};
use tsuite_storage::RegistryError;

/// Failure while executing a job; recorded as the job's error message.
#[derive(Debug, Error)]
pub enum JobError {
    #[error(transparent)]
    Workspace(#[from] WorkspaceError),
    #[error(transparent)]
    Process(#[from] ProcessError),
    #[error("job panicked: {0}")]
    Panicked(String),
    #[error("job task was cancelled")]
    Cancelled,
}

/// Synchronous rejection of a submission. No job record exists afterwards.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("invalid request: {0}")]
    Invalid(#[from] RequestError),
    #[error(transparent)]
    Unsupported(#[from] UnsupportedKind),
    #[error("job already exists: {0}")]
    AlreadyExists(JobKey),
    #[error("orchestrator is shutting down")]
    ShuttingDown,
    #[error(transparent)]
    Registry(RegistryError),
}

impl From<RegistryError> for SubmitError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::AlreadyExists(key) => SubmitError::AlreadyExists(key),
            other => SubmitError::Registry(other),
        }
    }
}

/// Errors from status and results queries
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("job not found: {0}")]
    NotFound(JobKey),
    #[error("results not ready for {key}: job is {status}")]
    NotReady { key: JobKey, status: JobStatus },
}
