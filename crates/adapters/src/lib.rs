// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for external I/O: subprocesses and cloned workspaces

pub mod process;
pub mod traced;
pub mod workspace;

pub use process::{
    redact_userinfo, ProcessError, ProcessOutput, ProcessRunner, ProcessSpec, SubprocessRunner,
    CLONE_TIMEOUT, DEFAULT_OUTPUT_LIMIT, INSTALL_TIMEOUT, RUN_TIMEOUT, SCAN_TIMEOUT,
};
pub use traced::TracedProcess;
pub use workspace::{Workspace, WorkspaceError, WorkspaceManager, WORKSPACE_PREFIX};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use process::{FakeProcessRunner, FakeReply, FakeRule, ProcessCall};
