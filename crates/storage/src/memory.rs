// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory job registry

use crate::registry::{JobRegistry, RegistryError};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tsuite_core::{Job, JobKey, TransitionError};

/// Process-local registry.
///
/// The outer map lock is only held to find or insert a slot; each job has
/// its own lock so a writer on one key never blocks readers of another.
#[derive(Default)]
pub struct MemoryJobRegistry {
    jobs: RwLock<HashMap<JobKey, Arc<RwLock<Job>>>>,
}

impl MemoryJobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.jobs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.read().is_empty()
    }

    fn slot(&self, key: &JobKey) -> Result<Arc<RwLock<Job>>, RegistryError> {
        self.jobs
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(key.clone()))
    }
}

impl JobRegistry for MemoryJobRegistry {
    fn create(&self, job: Job) -> Result<(), RegistryError> {
        let key = job.key();
        let mut jobs = self.jobs.write();
        if jobs.contains_key(&key) {
            return Err(RegistryError::AlreadyExists(key));
        }
        jobs.insert(key, Arc::new(RwLock::new(job)));
        Ok(())
    }

    fn get(&self, key: &JobKey) -> Result<Job, RegistryError> {
        Ok(self.slot(key)?.read().clone())
    }

    fn update(
        &self,
        key: &JobKey,
        mutate: &mut dyn FnMut(&mut Job) -> Result<(), TransitionError>,
    ) -> Result<Job, RegistryError> {
        let slot = self.slot(key)?;
        let mut guard = slot.write();
        let mut next = guard.clone();
        mutate(&mut next)?;
        *guard = next.clone();
        Ok(next)
    }

    fn list(&self) -> Vec<Job> {
        let slots: Vec<_> = self.jobs.read().values().cloned().collect();
        let mut jobs: Vec<Job> = slots.iter().map(|slot| slot.read().clone()).collect();
        jobs.sort_by(|a, b| {
            a.queued_at_ms
                .cmp(&b.queued_at_ms)
                .then_with(|| a.key().cmp(&b.key()))
        });
        jobs
    }

    fn prune_terminal(&self, completed_before_ms: u64) -> usize {
        let mut jobs = self.jobs.write();
        let before = jobs.len();
        jobs.retain(|_, slot| {
            let job = slot.read();
            !(job.is_terminal()
                && job
                    .completed_at_ms
                    .is_some_and(|done| done <= completed_before_ms))
        });
        let removed = before - jobs.len();
        if removed > 0 {
            tracing::debug!(removed, "pruned terminal jobs");
        }
        removed
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
