// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ephemeral per-job clone directories
//!
//! Every job gets a fresh `tsuite-<uuid>` directory under the workspace root.
//! The directory is removed when its [`Workspace`] guard drops, so success,
//! failure, cancellation and panics all release it.

use crate::process::{redact_userinfo, ProcessError, ProcessRunner, ProcessSpec, CLONE_TIMEOUT};
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Prefix of every workspace directory name.
pub const WORKSPACE_PREFIX: &str = "tsuite-";

/// Errors from provisioning a workspace
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("failed to create workspace directory {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("git clone failed (exit code {exit_code}): {stderr}")]
    CloneFailure { stderr: String, exit_code: i32 },
    #[error(transparent)]
    Process(#[from] ProcessError),
}

/// A provisioned directory; removed recursively on drop.
#[derive(Debug)]
pub struct Workspace {
    path: PathBuf,
}

impl Workspace {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        match std::fs::remove_dir_all(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "workspace removed"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to remove workspace")
            }
        }
    }
}

/// Creates and clones workspaces.
#[derive(Debug, Clone)]
pub struct WorkspaceManager<P> {
    root: PathBuf,
    runner: P,
    clone_timeout: Duration,
}

impl<P: ProcessRunner> WorkspaceManager<P> {
    pub fn new(root: impl Into<PathBuf>, runner: P) -> Self {
        Self {
            root: root.into(),
            runner,
            clone_timeout: CLONE_TIMEOUT,
        }
    }

    pub fn with_clone_timeout(mut self, timeout: Duration) -> Self {
        self.clone_timeout = timeout;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create a fresh directory and shallow-clone `branch` of `repository_url` into it.
    pub async fn provision(
        &self,
        repository_url: &str,
        branch: &str,
    ) -> Result<Workspace, WorkspaceError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|source| WorkspaceError::Create {
                path: self.root.clone(),
                source,
            })?;

        let path = self
            .root
            .join(format!("{}{}", WORKSPACE_PREFIX, uuid::Uuid::new_v4()));
        // Synchronous, so cancellation cannot land between creating the
        // directory and arming its guard.
        std::fs::create_dir(&path).map_err(|source| WorkspaceError::Create {
            path: path.clone(),
            source,
        })?;
        // From here on the guard owns removal, including on clone failure.
        let workspace = Workspace { path };

        let spec = ProcessSpec::new("git", workspace.path(), self.clone_timeout)
            .args([
                "clone",
                "--depth",
                "1",
                "--single-branch",
                "--branch",
                branch,
                repository_url,
                ".",
            ])
            .env("GIT_TERMINAL_PROMPT", "0")
            .describe("git clone");
        let output = self.runner.run(spec).await?;
        if !output.success() {
            return Err(WorkspaceError::CloneFailure {
                stderr: redact_userinfo(output.stderr.trim()).into_owned(),
                exit_code: output.exit_code,
            });
        }

        tracing::info!(
            path = %workspace.path().display(),
            repository = %redact_userinfo(repository_url),
            branch,
            "workspace ready"
        );
        Ok(workspace)
    }

    /// Provision a workspace, run `f` inside it, then remove it.
    pub async fn with_workspace<F, Fut, T, E>(
        &self,
        repository_url: &str,
        branch: &str,
        f: F,
    ) -> Result<T, E>
    where
        F: FnOnce(PathBuf) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<WorkspaceError>,
    {
        let workspace = self.provision(repository_url, branch).await?;
        let result = f(workspace.path().to_path_buf()).await;
        drop(workspace);
        result
    }
}

#[cfg(test)]
#[path = "workspace_tests.rs"]
mod tests;
