// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scripted process runner for testing
#![cfg_attr(coverage_nightly, coverage(off))]
#![allow(clippy::panic)]

use super::{ProcessError, ProcessOutput, ProcessRunner, ProcessSpec};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Recorded invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessCall {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    pub env: BTreeMap<String, String>,
    pub timeout: Duration,
}

impl ProcessCall {
    /// `program arg1 arg2 ...`
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Canned outcome for a matching invocation
#[derive(Debug, Clone)]
pub enum FakeReply {
    Output(ProcessOutput),
    Timeout,
    LaunchFailure(String),
    OutputTooLarge,
    /// Panic inside the runner, for exercising panic isolation upstream.
    Panic(String),
}

/// A scripted response: matches on program name plus argument substrings.
#[derive(Debug, Clone)]
pub struct FakeRule {
    program: String,
    needles: Vec<String>,
    reply: FakeReply,
    delay: Option<Duration>,
    files: Vec<(PathBuf, String)>,
}

impl FakeRule {
    /// Matches any invocation of `program`; replies with empty success.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            needles: Vec::new(),
            reply: FakeReply::Output(ProcessOutput::default()),
            delay: None,
            files: Vec::new(),
        }
    }

    /// Also require each needle to appear in the joined argument list.
    pub fn matching(mut self, needles: &[&str]) -> Self {
        self.needles.extend(needles.iter().map(|s| s.to_string()));
        self
    }

    pub fn reply(mut self, reply: FakeReply) -> Self {
        self.reply = reply;
        self
    }

    pub fn output(self, stdout: &str, stderr: &str, exit_code: i32) -> Self {
        self.reply(FakeReply::Output(ProcessOutput::new(stdout, stderr, exit_code)))
    }

    /// Sleep before replying; if the delay exceeds the invocation's timeout
    /// the reply becomes a timeout.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Write `contents` to `relative` under the working directory before replying.
    pub fn writes(mut self, relative: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        self.files.push((relative.into(), contents.into()));
        self
    }

    fn matches(&self, spec: &ProcessSpec) -> bool {
        if self.program != spec.program {
            return false;
        }
        let joined = spec.args.join(" ");
        self.needles.iter().all(|n| joined.contains(n.as_str()))
    }
}

#[derive(Default)]
struct FakeProcessState {
    rules: Vec<FakeRule>,
    calls: Vec<ProcessCall>,
}

/// Fake process runner for testing.
///
/// The most recently added matching rule wins. Invocations that match no
/// rule succeed with empty output.
#[derive(Clone, Default)]
pub struct FakeProcessRunner {
    inner: Arc<Mutex<FakeProcessState>>,
}

impl FakeProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, rule: FakeRule) -> &Self {
        self.inner.lock().rules.push(rule);
        self
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<ProcessCall> {
        self.inner.lock().calls.clone()
    }

    /// Command lines of all recorded calls, in order
    pub fn command_lines(&self) -> Vec<String> {
        self.inner
            .lock()
            .calls
            .iter()
            .map(ProcessCall::command_line)
            .collect()
    }

    /// Recorded calls to `program`
    pub fn calls_to(&self, program: &str) -> Vec<ProcessCall> {
        self.inner
            .lock()
            .calls
            .iter()
            .filter(|c| c.program == program)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ProcessRunner for FakeProcessRunner {
    async fn run(&self, spec: ProcessSpec) -> Result<ProcessOutput, ProcessError> {
        let rule = {
            let mut inner = self.inner.lock();
            inner.calls.push(ProcessCall {
                program: spec.program.clone(),
                args: spec.args.clone(),
                cwd: spec.cwd.clone(),
                env: spec.env.clone(),
                timeout: spec.timeout,
            });
            inner.rules.iter().rev().find(|r| r.matches(&spec)).cloned()
        };

        let Some(rule) = rule else {
            return Ok(ProcessOutput::default());
        };

        if let Some(delay) = rule.delay {
            if delay > spec.timeout {
                tokio::time::sleep(spec.timeout).await;
                return Err(ProcessError::Timeout {
                    description: spec.description,
                    timeout: spec.timeout,
                });
            }
            tokio::time::sleep(delay).await;
        }

        for (relative, contents) in &rule.files {
            let path = spec.cwd.join(relative);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|source| ProcessError::Io {
                    description: spec.description.clone(),
                    source,
                })?;
            }
            std::fs::write(&path, contents).map_err(|source| ProcessError::Io {
                description: spec.description.clone(),
                source,
            })?;
        }

        match rule.reply {
            FakeReply::Output(output) => Ok(output),
            FakeReply::Timeout => Err(ProcessError::Timeout {
                description: spec.description,
                timeout: spec.timeout,
            }),
            FakeReply::LaunchFailure(message) => Err(ProcessError::LaunchFailure {
                description: spec.description,
                source: std::io::Error::new(std::io::ErrorKind::NotFound, message),
            }),
            FakeReply::OutputTooLarge => Err(ProcessError::OutputTooLarge {
                description: spec.description,
                stream: "stdout",
                limit: 0,
            }),
            FakeReply::Panic(message) => panic!("{message}"),
        }
    }
}
