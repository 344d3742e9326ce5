//! Static checks for OHDSI cohort expressions
//!
//! This crate ties the workspace together:
//! - Reading CIRCE cohort expression JSON
//! - Running the rule catalog over the parsed expression
//! - Classifying findings into warnings and errors
//!
//! # Example
//!
//! ```ignore
//! use cohort_check::validate_document;
//!
//! let report = validate_document(&std::fs::read_to_string("cohort.json")?);
//! if !report.is_valid() {
//!     for error in &report.errors {
//!         eprintln!("{error}");
//!     }
//! }
//! ```

// Re-export all public APIs from internal crates
pub use cohort_check_diagnostics as diagnostics;
pub use cohort_check_engine as engine;
pub use cohort_check_model as model;

// Convenience re-exports
pub use cohort_check_diagnostics::{Finding, FindingKind, Report, Severity, SeverityPolicy, classify};
pub use cohort_check_engine::{Checker, ConceptLookup, InMemoryConceptLookup, validate, validate_with};
pub use cohort_check_model::{CohortExpression, ParseError, parse};

pub mod config;

pub use config::{CheckerConfig, ConfigError};

/// Parse and check a JSON document with default settings
///
/// A document that cannot be read as a cohort expression yields a report
/// holding only the ingestion failure; no rule runs in that case.
pub fn validate_document(input: &str) -> Report {
    validate_document_with(&Checker::new(), input)
}

/// Parse and check a JSON document with a configured checker
pub fn validate_document_with(checker: &Checker, input: &str) -> Report {
    match parse(input) {
        Ok(expression) => Report::from_findings(checker.check(&expression)),
        Err(e) => {
            log::debug!("ingestion failed: {e}");
            Report::from_findings([e.to_finding()])
        }
    }
}

// CLI module (only available with cli feature)
#[cfg(feature = "cli")]
pub mod cli;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_document() {
        let report = validate_document("{ not json");
        assert!(report.warnings.is_empty());
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].kind, FindingKind::ParseError);
        assert_eq!(report.errors[0].severity, Severity::Critical);
        assert!(report.errors[0].message.starts_with("Invalid JSON:"));
    }

    #[test]
    fn test_missing_primary_criteria() {
        let report = validate_document(r#"{"ConceptSets": []}"#);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].kind, FindingKind::ValidationError);
        assert!(!report.is_valid());
    }

    #[test]
    fn test_well_formed_document() {
        let report = validate_document(
            r#"{"PrimaryCriteria": {"CriteriaList": [{"Death": {}}]},
                "EndStrategy": {"DateOffset": {"DateField": "EndDate", "Offset": 1}}}"#,
        );
        assert!(report.is_clean(), "{report:?}");
    }
}
