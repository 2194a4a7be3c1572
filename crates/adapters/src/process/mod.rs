// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! External process execution

mod subprocess;

pub use subprocess::SubprocessRunner;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeProcessRunner, FakeReply, FakeRule, ProcessCall};

use async_trait::async_trait;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Default per-stream capture cap (16 MiB).
pub const DEFAULT_OUTPUT_LIMIT: usize = 16 * 1024 * 1024;

/// Default timeout for `git clone`.
pub const CLONE_TIMEOUT: Duration = Duration::from_secs(300);

/// Default timeout for dependency installation steps.
pub const INSTALL_TIMEOUT: Duration = Duration::from_secs(600);

/// Default timeout for a test run.
pub const RUN_TIMEOUT: Duration = Duration::from_secs(600);

/// Default timeout for a single scanner invocation.
pub const SCAN_TIMEOUT: Duration = Duration::from_secs(300);

/// Errors from running an external process
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("{description} timed out after {timeout:?}")]
    Timeout {
        description: String,
        timeout: Duration,
    },
    #[error("{description} failed to start: {source}")]
    LaunchFailure {
        description: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{description} produced more than {limit} bytes on {stream}")]
    OutputTooLarge {
        description: String,
        stream: &'static str,
        limit: usize,
    },
    #[error("{description} failed: {source}")]
    Io {
        description: String,
        #[source]
        source: std::io::Error,
    },
}

impl ProcessError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ProcessError::Timeout { .. })
    }
}

/// What to run, where, and for how long.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    /// Overlaid on the inherited environment; these keys win.
    pub env: BTreeMap<String, String>,
    pub timeout: Duration,
    /// Human-readable label used in errors and logs.
    pub description: String,
}

impl ProcessSpec {
    pub fn new(program: impl Into<String>, cwd: impl AsRef<Path>, timeout: Duration) -> Self {
        let program = program.into();
        Self {
            description: program.clone(),
            program,
            args: Vec::new(),
            cwd: cwd.as_ref().to_path_buf(),
            env: BTreeMap::new(),
            timeout,
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn envs(mut self, overlay: &BTreeMap<String, String>) -> Self {
        self.env
            .extend(overlay.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// `program arg1 arg2 ...`, for logs. URL credentials are masked.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .map(redact_userinfo)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Mask the `user[:password]` part of every `scheme://` URL in `text`.
pub fn redact_userinfo(text: &str) -> Cow<'_, str> {
    if !text.contains("://") {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(i) = rest.find("://") {
        let (head, tail) = rest.split_at(i + 3);
        out.push_str(head);
        let end = tail
            .find(|c: char| matches!(c, '/' | '?' | '#' | '\'' | '"') || c.is_whitespace())
            .unwrap_or(tail.len());
        let authority = &tail[..end];
        match authority.rfind('@') {
            Some(at) => {
                out.push_str("***");
                out.push_str(&authority[at..]);
            }
            None => out.push_str(authority),
        }
        rest = &tail[end..];
    }
    out.push_str(rest);
    Cow::Owned(out)
}

/// Captured result of a process that ran to completion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    /// `-1` when the process was terminated by a signal.
    pub exit_code: i32,
}

impl ProcessOutput {
    pub fn new(stdout: impl Into<String>, stderr: impl Into<String>, exit_code: i32) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: stderr.into(),
            exit_code,
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Runs external programs with a deadline.
#[async_trait]
pub trait ProcessRunner: Clone + Send + Sync + 'static {
    /// Run to completion, capturing stdout and stderr.
    ///
    /// A non-zero exit is not an error; only failing to start, exceeding the
    /// deadline or the output cap are.
    async fn run(&self, spec: ProcessSpec) -> Result<ProcessOutput, ProcessError>;
}
