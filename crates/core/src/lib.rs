// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! tsuite-core: job model and canonical reports for the tsuite job engine

pub mod clock;
pub mod id;
pub mod job;
pub mod record;
pub mod report;
pub mod request;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use clock::{Clock, SystemClock};
pub use job::{Job, JobId, JobKey, JobKind, JobStatus, ParseJobKindError, TransitionError};
pub use record::{ResultsRecord, StatusRecord, SubmitAck};
pub use report::{
    CoverageMetric, CoverageSummary, Finding, Report, ScannerRun, SecurityReport, Severity, SourceTool, TestCase, TestCounts,
    TestOutcome, TestReport,
};
pub use request::{JobRequest, RequestError, DEFAULT_BRANCH};

#[cfg(any(test, feature = "test-support"))]
pub use clock::FakeClock;
