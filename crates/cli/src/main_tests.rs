// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use clap::error::ErrorKind;

#[test]
fn output_flag_is_global() {
    let cli = Cli::try_parse_from(["tsuite", "kinds", "-o", "json"]).unwrap();
    assert_eq!(cli.output, OutputFormat::Json);
    assert!(matches!(cli.command, Some(Commands::Kinds)));
}

#[test]
fn config_flag_is_global() {
    let cli = Cli::try_parse_from(["tsuite", "config", "--config", "/etc/tsuite.toml"]).unwrap();
    assert_eq!(cli.config, Some(PathBuf::from("/etc/tsuite.toml")));
}

#[test]
fn run_requires_identity_fields() {
    let err = Cli::try_parse_from(["tsuite", "run", "--id", "t1"])
        .err()
        .unwrap();
    assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
}

#[test]
fn version_flag() {
    let err = Cli::try_parse_from(["tsuite", "--version"]).err().unwrap();
    assert_eq!(err.kind(), ErrorKind::DisplayVersion);
}

#[derive(Debug, thiserror::Error)]
#[error("outer: {0}")]
struct Outer(#[source] Inner);

#[derive(Debug, thiserror::Error)]
#[error("inner detail")]
struct Inner;

#[derive(Debug, thiserror::Error)]
#[error("request rejected")]
struct Opaque(#[source] Inner);

#[test]
fn redundant_chain_is_collapsed() {
    let err = anyhow::Error::new(Outer(Inner));
    assert_eq!(format_error(&err), "outer: inner detail");
}

#[test]
fn informative_chain_is_kept() {
    let err = anyhow::Error::new(Opaque(Inner));
    assert_eq!(
        format_error(&err),
        "request rejected\n\nCaused by:\n    0: inner detail"
    );
}

#[test]
fn silent_exit_error_has_no_message() {
    let err: anyhow::Error = exit_error::ExitError::silent(2).into();
    assert_eq!(format_error(&err), "");
    assert_eq!(err.downcast_ref::<exit_error::ExitError>().unwrap().code, 2);
}
