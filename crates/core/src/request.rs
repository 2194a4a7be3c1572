// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Inbound job submission record

use crate::job::{JobId, JobKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Branch cloned when the request does not name one.
pub const DEFAULT_BRANCH: &str = "main";

fn default_branch() -> String {
    DEFAULT_BRANCH.to_string()
}

/// Malformed submission, rejected before any resource is used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("job id must not be empty")]
    EmptyId,
    #[error("repository url must not be empty")]
    EmptyRepository,
    #[error("repository url must not start with '-': {0}")]
    RepositoryLooksLikeOption(String),
    #[error("branch must not be empty")]
    EmptyBranch,
    #[error("invalid branch name: {0}")]
    InvalidBranch(String),
    #[error("run command must not be empty when provided")]
    EmptyCommand,
    #[error("invalid environment variable name: {0:?}")]
    InvalidEnvKey(String),
}

/// A request to run a test suite or a security scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRequest {
    pub id: JobId,
    pub kind: JobKind,
    /// Framework (`jest`, `pytest`) or scanner (`dependency`, `sast`).
    pub subtype: String,
    pub repository_url: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    /// Replaces the framework's default run command.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// Overlaid on the inherited environment of the run step.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
}

impl JobRequest {
    pub fn new(
        kind: JobKind,
        id: impl Into<JobId>,
        subtype: impl Into<String>,
        repository_url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            subtype: subtype.into(),
            repository_url: repository_url.into(),
            branch: default_branch(),
            command: None,
            env: BTreeMap::new(),
        }
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Check the fields that are passed on to external tools.
    ///
    /// Repository URLs and branches are handed to `git clone` as positional
    /// arguments, so values starting with `-` are refused.
    pub fn validate(&self) -> Result<(), RequestError> {
        if self.id.is_blank() {
            return Err(RequestError::EmptyId);
        }

        let repo = self.repository_url.trim();
        if repo.is_empty() {
            return Err(RequestError::EmptyRepository);
        }
        if repo.starts_with('-') {
            return Err(RequestError::RepositoryLooksLikeOption(repo.to_string()));
        }

        let branch = self.branch.trim();
        if branch.is_empty() {
            return Err(RequestError::EmptyBranch);
        }
        if branch.starts_with('-') || branch.chars().any(|c| c.is_whitespace() || c.is_control())
        {
            return Err(RequestError::InvalidBranch(self.branch.clone()));
        }

        if let Some(command) = &self.command {
            if command.trim().is_empty() {
                return Err(RequestError::EmptyCommand);
            }
        }

        for key in self.env.keys() {
            if key.is_empty() || key.contains('=') || key.contains('\0') {
                return Err(RequestError::InvalidEnvKey(key.clone()));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
