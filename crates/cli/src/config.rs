// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Host configuration
//!
//! Built-in defaults, then an optional TOML file, then `TSUITE_*`
//! environment overrides.

use crate::env;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tsuite_adapters::DEFAULT_OUTPUT_LIMIT;
use tsuite_engine::{ExecutorTimeouts, OrchestratorConfig, DEFAULT_MAX_CONCURRENT_JOBS};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid value for {key}: '{value}' ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// Per-invocation deadlines, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimeoutConfig {
    pub clone_secs: u64,
    pub install_secs: u64,
    pub run_secs: u64,
    pub scan_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            clone_secs: 300,
            install_secs: 600,
            run_secs: 600,
            scan_secs: 300,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub max_concurrent_jobs: usize,
    /// Parent directory for per-job clones.
    pub workspace_root: PathBuf,
    /// Cap on each of stdout and stderr per invocation.
    pub output_limit_bytes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retention_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_path: Option<PathBuf>,
    /// `pip install` safety/semgrep before scanning.
    pub bootstrap_scanners: bool,
    pub timeouts: TimeoutConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: DEFAULT_MAX_CONCURRENT_JOBS,
            workspace_root: std::env::temp_dir(),
            output_limit_bytes: DEFAULT_OUTPUT_LIMIT,
            retention_secs: None,
            log_path: None,
            bootstrap_scanners: false,
            timeouts: TimeoutConfig::default(),
        }
    }
}

impl Config {
    /// Load from `explicit`, else `TSUITE_CONFIG`, else the user config file
    /// if it exists; then apply environment overrides and validate.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(env::config_path)
            .or_else(|| env::default_config_path().filter(|p| p.is_file()));

        let mut config = match path {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_overrides(env::var)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Overlay values from `lookup`, keyed by environment variable name.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(v) = lookup(env::MAX_CONCURRENT) {
            self.max_concurrent_jobs = parse_number(env::MAX_CONCURRENT, &v)?;
        }
        if let Some(v) = lookup(env::WORKSPACE_DIR) {
            self.workspace_root = PathBuf::from(v);
        }
        if let Some(v) = lookup(env::CLONE_TIMEOUT_SECS) {
            self.timeouts.clone_secs = parse_number(env::CLONE_TIMEOUT_SECS, &v)?;
        }
        if let Some(v) = lookup(env::INSTALL_TIMEOUT_SECS) {
            self.timeouts.install_secs = parse_number(env::INSTALL_TIMEOUT_SECS, &v)?;
        }
        if let Some(v) = lookup(env::RUN_TIMEOUT_SECS) {
            self.timeouts.run_secs = parse_number(env::RUN_TIMEOUT_SECS, &v)?;
        }
        if let Some(v) = lookup(env::SCAN_TIMEOUT_SECS) {
            self.timeouts.scan_secs = parse_number(env::SCAN_TIMEOUT_SECS, &v)?;
        }
        if let Some(v) = lookup(env::OUTPUT_LIMIT_BYTES) {
            self.output_limit_bytes = parse_number(env::OUTPUT_LIMIT_BYTES, &v)?;
        }
        if let Some(v) = lookup(env::RETENTION_SECS) {
            self.retention_secs = Some(parse_number(env::RETENTION_SECS, &v)?);
        }
        if let Some(v) = lookup(env::LOG_PATH) {
            self.log_path = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup(env::BOOTSTRAP_SCANNERS) {
            self.bootstrap_scanners = parse_bool(env::BOOTSTRAP_SCANNERS, &v)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrent_jobs == 0 {
            return Err(invalid("max_concurrent_jobs", "0", "must be at least 1"));
        }
        if self.output_limit_bytes == 0 {
            return Err(invalid("output_limit_bytes", "0", "must be positive"));
        }
        let t = &self.timeouts;
        for (key, secs) in [
            ("timeouts.clone_secs", t.clone_secs),
            ("timeouts.install_secs", t.install_secs),
            ("timeouts.run_secs", t.run_secs),
            ("timeouts.scan_secs", t.scan_secs),
        ] {
            if secs == 0 {
                return Err(invalid(key, "0", "must be positive"));
            }
        }
        if self.retention_secs == Some(0) {
            return Err(invalid("retention_secs", "0", "must be positive"));
        }
        Ok(())
    }

    pub fn clone_timeout(&self) -> Duration {
        Duration::from_secs(self.timeouts.clone_secs)
    }

    pub fn executor_timeouts(&self) -> ExecutorTimeouts {
        ExecutorTimeouts {
            install: Duration::from_secs(self.timeouts.install_secs),
            run: Duration::from_secs(self.timeouts.run_secs),
            scan: Duration::from_secs(self.timeouts.scan_secs),
        }
    }

    pub fn orchestrator(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            max_concurrent_jobs: self.max_concurrent_jobs,
            retention: self.retention_secs.map(Duration::from_secs),
            ..Default::default()
        }
    }
}

fn invalid(key: &'static str, value: impl Into<String>, reason: &'static str) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.into(),
        reason,
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| invalid(key, value, "expected a non-negative integer"))
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(key, value, "expected true or false")),
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
