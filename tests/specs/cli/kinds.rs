//! `tsuite kinds` specs

use crate::prelude::*;

#[test]
fn lists_subtypes_per_kind() {
    Fixture::new()
        .tsuite()
        .args(&["kinds"])
        .passes()
        .stdout_eq("test: jest, pytest\nsecurity-scan: dependency, sast\n");
}

#[test]
fn json_output_is_a_kind_map() {
    let run = Fixture::new().tsuite().args(&["kinds", "-o", "json"]).passes();
    let docs = run.json_lines();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0]["test"], serde_json::json!(["jest", "pytest"]));
    assert_eq!(
        docs[0]["security-scan"],
        serde_json::json!(["dependency", "sast"])
    );
}
