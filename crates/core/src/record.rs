// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Outbound records handed to the transport layer

use crate::job::{Job, JobId, JobKind, JobStatus};
use crate::report::Report;
use serde::{Deserialize, Serialize};

/// Returned synchronously when a submission is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitAck {
    pub id: JobId,
    pub status: JobStatus,
    pub message: String,
}

impl SubmitAck {
    pub fn queued(job: &Job) -> Self {
        Self {
            id: job.id.clone(),
            status: JobStatus::Queued,
            message: format!("{} {} queued successfully", job.subtype, job.kind),
        }
    }
}

/// Current state of a job for status polling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub id: JobId,
    pub kind: JobKind,
    pub subtype: String,
    pub status: JobStatus,
    pub queued_at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&Job> for StatusRecord {
    fn from(job: &Job) -> Self {
        Self {
            id: job.id.clone(),
            kind: job.kind,
            subtype: job.subtype.clone(),
            status: job.status,
            queued_at_ms: job.queued_at_ms,
            started_at_ms: job.started_at_ms,
            completed_at_ms: job.completed_at_ms,
            error: job.error.clone(),
        }
    }
}

/// Terminal outcome of a job: the canonical report, or the error that prevented one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultsRecord {
    pub id: JobId,
    pub kind: JobKind,
    pub subtype: String,
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<Report>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&Job> for ResultsRecord {
    fn from(job: &Job) -> Self {
        Self {
            id: job.id.clone(),
            kind: job.kind,
            subtype: job.subtype.clone(),
            status: job.status,
            duration_ms: job.run_duration_ms(),
            report: job.report.clone(),
            error: job.error.clone(),
        }
    }
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
