// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tsuite config`

use crate::config::Config;
use crate::output::{print_json, OutputFormat};

pub fn handle(config: &Config, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => print!("{}", toml::to_string_pretty(config)?),
        OutputFormat::Json => print_json(config)?,
    }
    Ok(())
}
