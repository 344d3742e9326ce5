//! Classification of findings into warnings and errors

use crate::Finding;
use serde::{Deserialize, Serialize};

/// Partition findings into `(warnings, errors)`
///
/// `ERROR` and `CRITICAL` findings are errors, `INFO` and `WARNING` findings
/// are warnings. Relative order is preserved within each side.
pub fn classify(findings: impl IntoIterator<Item = Finding>) -> (Vec<Finding>, Vec<Finding>) {
    findings.into_iter().partition(|finding| !finding.is_error())
}

/// Classified findings with a validity verdict
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// INFO and WARNING findings
    pub warnings: Vec<Finding>,
    /// ERROR and CRITICAL findings
    pub errors: Vec<Finding>,
}

impl Report {
    /// Classify a sequence of findings
    pub fn from_findings(findings: impl IntoIterator<Item = Finding>) -> Self {
        let (warnings, errors) = classify(findings);
        Self { warnings, errors }
    }

    /// An expression is valid when it has no errors
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Whether nothing at all was found
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty() && self.errors.is_empty()
    }

    /// Summary counts
    pub fn summary(&self) -> Summary {
        Summary {
            total_warnings: self.warnings.len(),
            total_errors: self.errors.len(),
            is_valid: self.is_valid(),
        }
    }

    /// Iterate over all findings, warnings first
    pub fn iter(&self) -> impl Iterator<Item = &Finding> {
        self.warnings.iter().chain(self.errors.iter())
    }
}

/// Counts reported alongside the findings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total_warnings: usize,
    pub total_errors: usize,
    pub is_valid: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FindingKind, Severity};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_classify_by_severity() {
        let findings = vec![
            Finding::info(FindingKind::MissingRequiredSection, "a"),
            Finding::error(FindingKind::EmptyValue, "b"),
            Finding::warning(FindingKind::UnusedConceptSet, "c"),
            Finding::critical(FindingKind::ParseError, "d"),
        ];

        let (warnings, errors) = classify(findings);

        assert_eq!(
            warnings.iter().map(|f| f.message.as_str()).collect::<Vec<_>>(),
            vec!["a", "c"]
        );
        assert_eq!(
            errors.iter().map(|f| f.severity).collect::<Vec<_>>(),
            vec![Severity::Error, Severity::Critical]
        );
    }

    #[test]
    fn test_empty_report_is_valid() {
        let report = Report::from_findings(Vec::new());
        assert!(report.is_valid());
        assert!(report.is_clean());
        assert_eq!(
            report.summary(),
            Summary {
                total_warnings: 0,
                total_errors: 0,
                is_valid: true
            }
        );
    }

    #[test]
    fn test_warnings_only_is_valid() {
        let report = Report::from_findings(vec![Finding::warning(
            FindingKind::MissingExitCriteria,
            "no exit",
        )]);
        assert!(report.is_valid());
        assert!(!report.is_clean());
    }
}
