// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the CLI crate.

use std::path::PathBuf;

pub const CONFIG: &str = "TSUITE_CONFIG";
pub const MAX_CONCURRENT: &str = "TSUITE_MAX_CONCURRENT";
pub const WORKSPACE_DIR: &str = "TSUITE_WORKSPACE_DIR";
pub const CLONE_TIMEOUT_SECS: &str = "TSUITE_CLONE_TIMEOUT_SECS";
pub const INSTALL_TIMEOUT_SECS: &str = "TSUITE_INSTALL_TIMEOUT_SECS";
pub const RUN_TIMEOUT_SECS: &str = "TSUITE_RUN_TIMEOUT_SECS";
pub const SCAN_TIMEOUT_SECS: &str = "TSUITE_SCAN_TIMEOUT_SECS";
pub const OUTPUT_LIMIT_BYTES: &str = "TSUITE_OUTPUT_LIMIT_BYTES";
pub const RETENTION_SECS: &str = "TSUITE_RETENTION_SECS";
pub const LOG_PATH: &str = "TSUITE_LOG_PATH";
pub const BOOTSTRAP_SCANNERS: &str = "TSUITE_BOOTSTRAP_SCANNERS";

/// Non-empty value of `name` from the process environment.
pub fn var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Explicit config file from the environment
pub fn config_path() -> Option<PathBuf> {
    var(CONFIG).map(PathBuf::from)
}

/// `$XDG_CONFIG_HOME/tsuite/config.toml` or the platform equivalent.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tsuite").join("config.toml"))
}
