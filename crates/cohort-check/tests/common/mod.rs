//! Shared helpers for the facade tests

use std::path::{Path, PathBuf};

/// A defect-free cohort expression
pub const CLEAN: &str = include_str!("../../../cohort-check-engine/tests/fixtures/clean.json");

/// An unused concept set, an inverted date range and no exit strategy
pub const DEFECTIVE: &str = r#"{
    "ConceptSets": [
        {"id": 0, "name": "Type 2 diabetes mellitus", "expression": {"items": [
            {"concept": {"CONCEPT_ID": 201826, "DOMAIN_ID": "Condition"}}
        ]}},
        {"id": 7, "name": "Insulin", "expression": {"items": [
            {"concept": {"CONCEPT_ID": 1503297, "DOMAIN_ID": "Drug"}}
        ]}}
    ],
    "PrimaryCriteria": {
        "CriteriaList": [{"ConditionOccurrence": {
            "CodesetId": 0,
            "OccurrenceStartDate": {"Value": "2023-01-01", "Op": "bt", "Extent": "2020-01-01"}
        }}],
        "PrimaryCriteriaLimit": {"Type": "All"}
    }
}"#;

/// Write `content` to `name` inside `dir`
pub fn write_input(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}
