// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job identity and state machine.
//!
//! A job moves `queued → running → {completed | failed}`. Each timestamp is
//! set exactly once and never goes backwards, and terminal states are never
//! left. Illegal transitions are rejected rather than silently applied.

use crate::report::Report;
use crate::request::JobRequest;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

crate::define_id! {
    /// Caller-supplied identifier for a job.
    ///
    /// Unique within its [`JobKind`] namespace; the same id may be reused
    /// by a test run and a security scan.
    pub struct JobId;
}

/// Top-level job category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobKind {
    Test,
    SecurityScan,
}

impl JobKind {
    pub const ALL: [JobKind; 2] = [JobKind::Test, JobKind::SecurityScan];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobKind::Test => "test",
            JobKind::SecurityScan => "security-scan",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error parsing a [`JobKind`] from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown job kind '{0}' (expected 'test' or 'security-scan')")]
pub struct ParseJobKindError(pub String);

impl FromStr for JobKind {
    type Err = ParseJobKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "test" | "tests" => Ok(JobKind::Test),
            "security-scan" | "security_scan" | "security" | "scan" => Ok(JobKind::SecurityScan),
            _ => Err(ParseJobKindError(s.to_string())),
        }
    }
}

/// Registry key: ids are namespaced by kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobKey {
    pub kind: JobKind,
    pub id: JobId,
}

impl JobKey {
    pub fn new(kind: JobKind, id: impl Into<JobId>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }
}

impl fmt::Display for JobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.id)
    }
}

/// Lifecycle status of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    /// Only single forward steps are legal.
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Queued, JobStatus::Running)
                | (JobStatus::Running, JobStatus::Completed)
                | (JobStatus::Running, JobStatus::Failed)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejected status change.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition for job {key}: {from} -> {to}")]
pub struct TransitionError {
    pub key: JobKey,
    pub from: JobStatus,
    pub to: JobStatus,
}

/// A job instance as held by the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub kind: JobKind,
    /// Framework or scanner name, lowercased.
    pub subtype: String,
    pub repository_url: String,
    pub branch: String,
    pub status: JobStatus,
    pub queued_at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<Report>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Job {
    /// Create a queued job from an accepted request.
    pub fn queued(request: &JobRequest, now_ms: u64) -> Self {
        Self {
            id: request.id.clone(),
            kind: request.kind,
            subtype: request.subtype.trim().to_ascii_lowercase(),
            repository_url: request.repository_url.clone(),
            branch: request.branch.clone(),
            status: JobStatus::Queued,
            queued_at_ms: now_ms,
            started_at_ms: None,
            completed_at_ms: None,
            report: None,
            error: None,
        }
    }

    pub fn key(&self) -> JobKey {
        JobKey::new(self.kind, self.id.clone())
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// `queued → running`.
    pub fn start(&mut self, now_ms: u64) -> Result<(), TransitionError> {
        self.transition(JobStatus::Running)?;
        self.started_at_ms = Some(now_ms.max(self.queued_at_ms));
        Ok(())
    }

    /// `running → completed | failed`, decided by the report's success flag.
    pub fn finish(&mut self, report: Report, now_ms: u64) -> Result<(), TransitionError> {
        let next = if report.success() {
            JobStatus::Completed
        } else {
            JobStatus::Failed
        };
        self.transition(next)?;
        self.report = Some(report);
        self.stamp_completed(now_ms);
        Ok(())
    }

    /// `running → failed` without a report (infrastructure failure).
    pub fn fail(&mut self, error: impl Into<String>, now_ms: u64) -> Result<(), TransitionError> {
        self.transition(JobStatus::Failed)?;
        self.error = Some(error.into());
        self.stamp_completed(now_ms);
        Ok(())
    }

    /// Milliseconds spent running, once terminal.
    pub fn run_duration_ms(&self) -> Option<u64> {
        match (self.started_at_ms, self.completed_at_ms) {
            (Some(start), Some(end)) => Some(end.saturating_sub(start)),
            _ => None,
        }
    }

    fn transition(&mut self, next: JobStatus) -> Result<(), TransitionError> {
        if !self.status.can_transition_to(next) {
            return Err(TransitionError {
                key: self.key(),
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }

    fn stamp_completed(&mut self, now_ms: u64) {
        let floor = self.started_at_ms.unwrap_or(self.queued_at_ms);
        self.completed_at_ms = Some(now_ms.max(floor));
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
