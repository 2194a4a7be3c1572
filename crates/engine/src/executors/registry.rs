// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lookup of executors by kind and subtype

use super::{DependencyScanner, Executor, ExecutorTimeouts, JestExecutor, PytestExecutor, SastScanner};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tsuite_adapters::ProcessRunner;
use tsuite_core::JobKind;

/// No executor answers to the requested subtype.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported {kind} subtype '{requested}' (supported: {})", supported.join(", "))]
pub struct UnsupportedKind {
    pub kind: JobKind,
    pub requested: String,
    pub supported: Vec<String>,
}

/// Executors keyed by kind, then lowercase subtype.
#[derive(Default, Clone)]
pub struct ExecutorRegistry {
    executors: BTreeMap<JobKind, BTreeMap<&'static str, Arc<dyn Executor>>>,
}

impl ExecutorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The four built-in executors sharing one process runner.
    pub fn standard<P: ProcessRunner>(runner: P, timeouts: ExecutorTimeouts, bootstrap: bool) -> Self {
        let mut registry = Self::new();
        registry.register(JestExecutor::new(runner.clone(), timeouts));
        registry.register(PytestExecutor::new(runner.clone(), timeouts));
        registry.register(DependencyScanner::new(runner.clone(), timeouts).with_bootstrap(bootstrap));
        registry.register(SastScanner::new(runner, timeouts).with_bootstrap(bootstrap));
        registry
    }

    /// Add an executor, replacing any previous one for the same kind and subtype.
    pub fn register(&mut self, executor: impl Executor) -> &mut Self {
        self.executors
            .entry(executor.kind())
            .or_default()
            .insert(executor.subtype(), Arc::new(executor));
        self
    }

    /// Case-insensitive lookup.
    pub fn lookup(&self, kind: JobKind, subtype: &str) -> Result<Arc<dyn Executor>, UnsupportedKind> {
        let wanted = subtype.trim().to_ascii_lowercase();
        self.executors
            .get(&kind)
            .and_then(|by_subtype| by_subtype.get(wanted.as_str()))
            .cloned()
            .ok_or_else(|| UnsupportedKind {
                kind,
                requested: subtype.to_string(),
                supported: self.supported(kind),
            })
    }

    /// Sorted subtypes registered for `kind`.
    pub fn supported(&self, kind: JobKind) -> Vec<String> {
        self.executors
            .get(&kind)
            .map(|by_subtype| by_subtype.keys().map(|s| s.to_string()).collect())
            .unwrap_or_default()
    }

    /// Kinds with at least one executor.
    pub fn kinds(&self) -> Vec<JobKind> {
        self.executors
            .iter()
            .filter(|(_, by_subtype)| !by_subtype.is_empty())
            .map(|(kind, _)| *kind)
            .collect()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
