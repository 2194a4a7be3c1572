// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job registry contract

use thiserror::Error;
use tsuite_core::{Job, JobKey, TransitionError};

/// Errors from registry operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("job not found: {0}")]
    NotFound(JobKey),
    #[error("job already exists: {0}")]
    AlreadyExists(JobKey),
    #[error(transparent)]
    Transition(#[from] TransitionError),
}

/// Holds every known job, keyed by `(kind, id)`.
///
/// Reads return a snapshot of the last committed write and never wait on
/// job execution. Mutations are applied to a copy and committed only when
/// the mutator succeeds.
pub trait JobRegistry: Send + Sync + 'static {
    /// Insert a new job; fails if the key is taken.
    fn create(&self, job: Job) -> Result<(), RegistryError>;

    /// Snapshot of one job.
    fn get(&self, key: &JobKey) -> Result<Job, RegistryError>;

    /// Apply `mutate` to the job under `key`, returning the committed snapshot.
    fn update(
        &self,
        key: &JobKey,
        mutate: &mut dyn FnMut(&mut Job) -> Result<(), TransitionError>,
    ) -> Result<Job, RegistryError>;

    /// Snapshots of all jobs, oldest first.
    fn list(&self) -> Vec<Job>;

    /// Drop terminal jobs that completed at or before `completed_before_ms`.
    /// Returns how many were removed.
    fn prune_terminal(&self, completed_before_ms: u64) -> usize;
}
