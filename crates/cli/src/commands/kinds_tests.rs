// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn lists_each_kind_on_its_own_line() {
    let registry = crate::commands::executors(&Config::default(), SubprocessRunner::default());
    assert_eq!(
        format_kinds(&registry),
        "test: jest, pytest\nsecurity-scan: dependency, sast\n"
    );
}
