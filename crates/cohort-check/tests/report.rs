//! Reports produced by the facade and the validate command

mod common;

use cohort_check::cli::output::{OutputFormat, format_text};
use cohort_check::cli::validate::{ValidateConfig, validate};
use cohort_check::{FindingKind, Severity, validate_document};
use common::{CLEAN, DEFECTIVE, write_input};
use pretty_assertions::assert_eq;
use rstest::rstest;

#[test]
fn test_clean_document() {
    let report = validate_document(CLEAN);
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    assert!(report.errors.is_empty(), "{:?}", report.errors);
    assert!(report.is_valid());
}

#[test]
fn test_defective_document() {
    let report = validate_document(DEFECTIVE);
    let warnings: Vec<FindingKind> = report.warnings.iter().map(|f| f.kind).collect();
    let errors: Vec<FindingKind> = report.errors.iter().map(|f| f.kind).collect();
    assert_eq!(
        warnings,
        vec![FindingKind::UnusedConceptSet, FindingKind::MissingExitCriteria]
    );
    assert_eq!(errors, vec![FindingKind::ContradictoryRange]);
    assert!(!report.is_valid());
}

#[rstest]
#[case::not_json("[1, 2", FindingKind::ParseError)]
#[case::empty("", FindingKind::ParseError)]
#[case::wrong_shape(r#"{"PrimaryCriteria": 5}"#, FindingKind::ValidationError)]
#[case::duplicate_ids(
    r#"{"ConceptSets": [{"id": 1}, {"id": 1}], "PrimaryCriteria": {"CriteriaList": []}}"#,
    FindingKind::ValidationError
)]
fn test_ingestion_failure_short_circuits(#[case] input: &str, #[case] kind: FindingKind) {
    let report = validate_document(input);
    assert!(report.warnings.is_empty());
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].kind, kind);
    assert_eq!(report.errors[0].severity, Severity::Critical);
}

#[test]
fn test_text_report() {
    colored::control::set_override(false);
    let report = validate_document(DEFECTIVE);
    insta::assert_snapshot!(format_text(&report, "cohort.json"), @r#"
    Cohort expression check: cohort.json
    ============================================================
    Warnings: 2
    Errors: 1
    Valid: No

    WARNINGS
      1. [WARNING] Concept set "Insulin" (id 7) is not used
      2. [WARNING] All events are selected and no cohort exit criteria is specified

    ERRORS
      1. [ERROR] ConditionOccurrence criteria at primary criteria > criterion 1: OccurrenceStartDate start date 2023-01-01 is greater than end date 2020-01-01
    "#);
}

#[test]
fn test_json_report_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "cohort.json", DEFECTIVE);
    let output = dir.path().join("report.json");
    let config = ValidateConfig {
        input: input.clone(),
        output: Some(output.clone()),
        format: OutputFormat::Json,
        ..ValidateConfig::default()
    };

    let outcome = validate(&config).unwrap();
    assert!(!outcome.passed);

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(written["input_file"], input.display().to_string());
    assert_eq!(written["summary"]["total_warnings"], 2);
    assert_eq!(written["summary"]["total_errors"], 1);
    assert_eq!(written["summary"]["is_valid"], false);
    assert_eq!(written["warnings"][0]["type"], "UNUSED_CONCEPT_SET");
    assert_eq!(written["errors"][0]["type"], "CONTRADICTORY_RANGE");
}

#[test]
fn test_config_file_and_overrides() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "cohort.json", DEFECTIVE);
    let config_file = write_input(
        dir.path(),
        "config.json",
        r#"{"severity": {"CONTRADICTORY_RANGE": "WARNING"}}"#,
    );
    let mut config = ValidateConfig {
        input,
        output: Some(dir.path().join("report.txt")),
        format: OutputFormat::Text,
        config_file: Some(config_file),
        ..ValidateConfig::default()
    };

    let outcome = validate(&config).unwrap();
    assert!(outcome.passed);
    assert_eq!(outcome.report.warnings.len(), 3);

    config.strict = true;
    assert!(!validate(&config).unwrap().passed);

    config.strict = false;
    config.overrides.push("UNUSED_CONCEPT_SET=CRITICAL".into());
    assert!(!validate(&config).unwrap().passed);
}
