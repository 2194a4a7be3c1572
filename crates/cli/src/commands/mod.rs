// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

pub mod config;
pub mod health;
pub mod kinds;
pub mod run;

use crate::config::Config;
use tsuite_adapters::ProcessRunner;
use tsuite_engine::ExecutorRegistry;

/// The built-in executors wired to `runner` with the configured deadlines.
pub fn executors<P: ProcessRunner>(config: &Config, runner: P) -> ExecutorRegistry {
    ExecutorRegistry::standard(runner, config.executor_timeouts(), config.bootstrap_scanners)
}
