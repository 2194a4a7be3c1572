// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tsuite kinds`

use crate::config::Config;
use crate::output::{print_json, OutputFormat};
use std::collections::BTreeMap;
use tsuite_adapters::SubprocessRunner;
use tsuite_engine::ExecutorRegistry;

pub fn handle(config: &Config, format: OutputFormat) -> anyhow::Result<()> {
    let registry = super::executors(config, SubprocessRunner::default());
    match format {
        OutputFormat::Text => print!("{}", format_kinds(&registry)),
        OutputFormat::Json => {
            let listing: BTreeMap<String, Vec<String>> = registry
                .kinds()
                .into_iter()
                .map(|kind| (kind.to_string(), registry.supported(kind)))
                .collect();
            print_json(&listing)?;
        }
    }
    Ok(())
}

fn format_kinds(registry: &ExecutorRegistry) -> String {
    registry
        .kinds()
        .into_iter()
        .map(|kind| format!("{kind}: {}\n", registry.supported(kind).join(", ")))
        .collect()
}

#[cfg(test)]
#[path = "kinds_tests.rs"]
mod tests;
