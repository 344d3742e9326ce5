//! JSON ingestion
//!
//! Turns an external JSON document into a [`CohortExpression`]. Failures are
//! split into text that is not JSON at all (`Syntax`) and JSON that does not
//! describe a cohort expression (`Structure`, duplicate concept set ids).

use std::collections::HashSet;
use std::io::Read;

use cohort_check_diagnostics::{Finding, FindingKind};
use serde_json::error::Category;

use crate::CohortExpression;

/// Errors that can occur while reading a cohort expression
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Malformed JSON text
    #[error("{0}")]
    Syntax(#[source] serde_json::Error),

    /// Well-formed JSON that does not fit the expression schema
    #[error("{0}")]
    Structure(#[source] serde_json::Error),

    /// Two concept sets share an id
    #[error("concept set id {0} is declared more than once")]
    DuplicateConceptSetId(i64),
}

impl ParseError {
    /// Finding kind reported for this failure
    pub fn kind(&self) -> FindingKind {
        match self {
            ParseError::Syntax(_) => FindingKind::ParseError,
            ParseError::Structure(_) | ParseError::DuplicateConceptSetId(_) => {
                FindingKind::ValidationError
            }
        }
    }

    /// The single critical finding reported instead of running any checks
    pub fn to_finding(&self) -> Finding {
        let message = match self {
            ParseError::Syntax(e) => format!("Invalid JSON: {e}"),
            _ => format!("Validation error: {self}"),
        };
        Finding::critical(self.kind(), message)
    }
}

impl From<serde_json::Error> for ParseError {
    fn from(error: serde_json::Error) -> Self {
        match error.classify() {
            Category::Data => ParseError::Structure(error),
            Category::Syntax | Category::Eof | Category::Io => ParseError::Syntax(error),
        }
    }
}

/// Parse a cohort expression from JSON text
pub fn parse(input: &str) -> Result<CohortExpression, ParseError> {
    let expression: CohortExpression = serde_json::from_str(input)?;
    check_concept_set_ids(expression)
}

/// Parse a cohort expression from a reader
pub fn parse_reader<R: Read>(reader: R) -> Result<CohortExpression, ParseError> {
    let expression: CohortExpression = serde_json::from_reader(reader)?;
    check_concept_set_ids(expression)
}

/// Convert an already parsed JSON value into a cohort expression
pub fn parse_value(value: serde_json::Value) -> Result<CohortExpression, ParseError> {
    let expression: CohortExpression = serde_json::from_value(value)?;
    check_concept_set_ids(expression)
}

fn check_concept_set_ids(expression: CohortExpression) -> Result<CohortExpression, ParseError> {
    let mut seen = HashSet::with_capacity(expression.concept_sets.len());
    for set in &expression.concept_sets {
        if !seen.insert(set.id) {
            return Err(ParseError::DuplicateConceptSetId(set.id));
        }
    }
    Ok(expression)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cohort_check_diagnostics::Severity;

    const MINIMAL: &str = r#"{
        "ConceptSets": [{"id": 0, "name": "Diabetes", "expression": {"items": []}}],
        "PrimaryCriteria": {
            "CriteriaList": [{"ConditionOccurrence": {"CodesetId": 0}}],
            "ObservationWindow": {"PriorDays": 0, "PostDays": 0},
            "PrimaryCriteriaLimit": {"Type": "First"}
        }
    }"#;

    #[test]
    fn test_parse_minimal() {
        let expression = parse(MINIMAL).unwrap();
        assert_eq!(expression.concept_sets.len(), 1);
        assert_eq!(expression.primary_criteria.criteria_list.len(), 1);
        assert!(expression.inclusion_rules.is_empty());
        assert!(expression.end_strategy.is_none());
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let expression = parse(
            r#"{"PrimaryCriteria": {"CriteriaList": []}, "Title": "x", "cdmVersionRange": ">=5.0.0"}"#,
        )
        .unwrap();
        assert_eq!(expression.cdm_version_range.as_deref(), Some(">=5.0.0"));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let error = parse("{\"PrimaryCriteria\": ").unwrap_err();
        assert!(matches!(error, ParseError::Syntax(_)));

        let finding = error.to_finding();
        assert_eq!(finding.kind, FindingKind::ParseError);
        assert_eq!(finding.severity, Severity::Critical);
        assert!(finding.message.starts_with("Invalid JSON: "));
    }

    #[test]
    fn test_missing_primary_criteria_is_validation_error() {
        let error = parse(r#"{"ConceptSets": []}"#).unwrap_err();
        assert!(matches!(error, ParseError::Structure(_)));

        let finding = error.to_finding();
        assert_eq!(finding.kind, FindingKind::ValidationError);
        assert!(finding.message.contains("PrimaryCriteria"));
    }

    #[test]
    fn test_duplicate_concept_set_ids() {
        let error = parse(
            r#"{
                "ConceptSets": [{"id": 1, "name": "a"}, {"id": 1, "name": "b"}],
                "PrimaryCriteria": {"CriteriaList": []}
            }"#,
        )
        .unwrap_err();
        assert!(matches!(error, ParseError::DuplicateConceptSetId(1)));
        assert_eq!(error.kind(), FindingKind::ValidationError);
    }

    #[test]
    fn test_parse_reader_and_value() {
        assert!(parse_reader(MINIMAL.as_bytes()).is_ok());
        let value: serde_json::Value = serde_json::from_str(MINIMAL).unwrap();
        assert_eq!(parse_value(value).unwrap(), parse(MINIMAL).unwrap());
    }
}
