// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! tsuite - run repository test suites and security scans

mod commands;
mod config;
mod env;
mod exit_error;
mod logging;
mod output;
mod poll;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{health, kinds, run};
use config::Config;
use output::OutputFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "tsuite",
    version,
    about = "Run repository test suites and security scans"
)]
struct Cli {
    /// Output format
    #[arg(
        short = 'o',
        long = "output",
        value_enum,
        default_value_t,
        global = true
    )]
    output: OutputFormat,

    /// Config file (defaults to $TSUITE_CONFIG, then the user config dir)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a job and wait for its results
    Run(run::RunArgs),
    /// List supported subtypes per job kind
    Kinds,
    /// Print the effective configuration
    Config,
    /// Check the workspace root and report engine capacity
    Health,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        let code = e
            .downcast_ref::<exit_error::ExitError>()
            .map_or(1, |c| c.code);
        let msg = format_error(&e);
        if !msg.is_empty() {
            eprintln!("Error: {}", msg);
        }
        std::process::exit(code);
    }
}

/// Format an anyhow error, deduplicating the chain.
///
/// When every cause's text already appears in the top-level message the
/// chain is dropped; otherwise it is rendered like anyhow's Debug output.
fn format_error(err: &anyhow::Error) -> String {
    let top = err.to_string();

    let chain_redundant = err
        .chain()
        .skip(1)
        .all(|cause| top.contains(&cause.to_string()));
    if chain_redundant {
        return top;
    }

    let mut buf = top;
    for (i, cause) in err.chain().skip(1).enumerate() {
        buf.push_str(&format!("\n\nCaused by:\n    {}: {}", i, cause));
    }
    buf
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let format = cli.output;

    let Some(command) = cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let config = Config::load(cli.config.as_deref())?;

    match command {
        Commands::Run(args) => {
            let _log_guard = logging::init(config.log_path.as_deref())?;
            run::handle(args, &config, format).await?
        }
        Commands::Kinds => kinds::handle(&config, format)?,
        Commands::Config => commands::config::handle(&config, format)?,
        Commands::Health => health::handle(&config, format).await?,
    }
    Ok(())
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
