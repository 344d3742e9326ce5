//! Finding kinds: stable identifiers of the check that produced a finding
//!
//! Kinds fall into two groups:
//! - Rule kinds, emitted by the rule catalog
//! - Ingestion kinds (`PARSE_ERROR`, `VALIDATION_ERROR`), emitted when the
//!   input document cannot be turned into an expression

use crate::Severity;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

/// Identifier of the check that produced a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FindingKind {
    UnusedConceptSet,
    DuplicateConceptSet,
    DuplicateCriteria,
    ConceptSetDuplicateItems,
    DomainTypeMismatch,
    EmptyValue,
    ContradictoryRange,
    MissingRequiredSection,
    MissingExitCriteria,
    TimeWindowInconsistency,
    EventsProgression,
    UnknownConceptSet,
    EmptyConceptSet,
    MissingConceptSet,
    ExitCriteriaOffset,
    ContradictoryCriteria,
    ParseError,
    ValidationError,
}

impl FindingKind {
    /// Every kind, rule kinds first
    pub const ALL: [FindingKind; 18] = [
        FindingKind::UnusedConceptSet,
        FindingKind::DuplicateConceptSet,
        FindingKind::DuplicateCriteria,
        FindingKind::ConceptSetDuplicateItems,
        FindingKind::DomainTypeMismatch,
        FindingKind::EmptyValue,
        FindingKind::ContradictoryRange,
        FindingKind::MissingRequiredSection,
        FindingKind::MissingExitCriteria,
        FindingKind::TimeWindowInconsistency,
        FindingKind::EventsProgression,
        FindingKind::UnknownConceptSet,
        FindingKind::EmptyConceptSet,
        FindingKind::MissingConceptSet,
        FindingKind::ExitCriteriaOffset,
        FindingKind::ContradictoryCriteria,
        FindingKind::ParseError,
        FindingKind::ValidationError,
    ];

    /// Stable identifier used as the `type` of a serialized finding
    pub const fn as_str(&self) -> &'static str {
        match self {
            FindingKind::UnusedConceptSet => "UNUSED_CONCEPT_SET",
            FindingKind::DuplicateConceptSet => "DUPLICATE_CONCEPT_SET",
            FindingKind::DuplicateCriteria => "DUPLICATE_CRITERIA",
            FindingKind::ConceptSetDuplicateItems => "CONCEPT_SET_DUPLICATE_ITEMS",
            FindingKind::DomainTypeMismatch => "DOMAIN_TYPE_MISMATCH",
            FindingKind::EmptyValue => "EMPTY_VALUE",
            FindingKind::ContradictoryRange => "CONTRADICTORY_RANGE",
            FindingKind::MissingRequiredSection => "MISSING_REQUIRED_SECTION",
            FindingKind::MissingExitCriteria => "MISSING_EXIT_CRITERIA",
            FindingKind::TimeWindowInconsistency => "TIME_WINDOW_INCONSISTENCY",
            FindingKind::EventsProgression => "EVENTS_PROGRESSION",
            FindingKind::UnknownConceptSet => "UNKNOWN_CONCEPT_SET",
            FindingKind::EmptyConceptSet => "EMPTY_CONCEPT_SET",
            FindingKind::MissingConceptSet => "MISSING_CONCEPT_SET",
            FindingKind::ExitCriteriaOffset => "EXIT_CRITERIA_OFFSET",
            FindingKind::ContradictoryCriteria => "CONTRADICTORY_CRITERIA",
            FindingKind::ParseError => "PARSE_ERROR",
            FindingKind::ValidationError => "VALIDATION_ERROR",
        }
    }

    /// Static information about this kind
    pub fn info(&self) -> &'static KindInfo {
        KIND_INFO.get(self).unwrap_or(&UNKNOWN_KIND)
    }

    /// Severity a rule uses unless it escalates or a policy overrides it
    pub fn default_severity(&self) -> Severity {
        self.info().default_severity
    }

    /// Check if this kind is reported by the ingestion boundary rather than a rule
    pub const fn is_ingestion(&self) -> bool {
        matches!(self, FindingKind::ParseError | FindingKind::ValidationError)
    }
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a finding kind identifier is not recognised
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown finding type '{0}'")]
pub struct UnknownKind(pub String);

impl FromStr for FindingKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        FindingKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}

/// Information about a finding kind
#[derive(Debug, Clone)]
pub struct KindInfo {
    /// Short description of the check
    pub description: &'static str,
    /// Severity used when neither the rule nor a policy says otherwise
    pub default_severity: Severity,
    /// Detailed help text
    pub help: Option<&'static str>,
}

impl KindInfo {
    const fn new(description: &'static str, default_severity: Severity) -> Self {
        Self {
            description,
            default_severity,
            help: None,
        }
    }

    const fn with_help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }
}

static UNKNOWN_KIND: KindInfo = KindInfo::new("Unknown check", Severity::Warning);

static KIND_INFO: LazyLock<HashMap<FindingKind, KindInfo>> = LazyLock::new(|| {
    use FindingKind::*;

    let mut map = HashMap::new();

    // Concept sets
    map.insert(
        UnusedConceptSet,
        KindInfo::new("Concept set is not referenced by any criteria", Severity::Warning)
            .with_help("Remove the concept set or reference it from a criterion"),
    );
    map.insert(
        DuplicateConceptSet,
        KindInfo::new("Concept sets contain the same concepts", Severity::Warning),
    );
    map.insert(
        ConceptSetDuplicateItems,
        KindInfo::new("Concept set lists the same concept more than once", Severity::Warning),
    );
    map.insert(
        UnknownConceptSet,
        KindInfo::new("Criteria reference a concept set that is not defined", Severity::Error),
    );
    map.insert(
        EmptyConceptSet,
        KindInfo::new("Concept set contains no concepts", Severity::Warning),
    );

    // Criteria
    map.insert(
        DuplicateCriteria,
        KindInfo::new("Group contains duplicate criteria", Severity::Warning),
    );
    map.insert(
        DomainTypeMismatch,
        KindInfo::new("Criteria domain does not match its concept set", Severity::Warning)
            .with_help("Use a criteria type that matches the domain of the concepts"),
    );
    map.insert(
        MissingConceptSet,
        KindInfo::new("Criteria have no concept set specified", Severity::Warning),
    );
    map.insert(
        ContradictoryCriteria,
        KindInfo::new("Criteria require an event to be present and absent", Severity::Warning),
    );

    // Values and ranges
    map.insert(
        EmptyValue,
        KindInfo::new("Attribute has an operator but no value", Severity::Error),
    );
    map.insert(
        ContradictoryRange,
        KindInfo::new("Range start is greater than its end", Severity::Error),
    );

    // Structure
    map.insert(
        MissingRequiredSection,
        KindInfo::new("Required section is empty", Severity::Warning),
    );
    map.insert(
        MissingExitCriteria,
        KindInfo::new("All events are selected and no exit criteria is specified", Severity::Warning)
            .with_help("Add an end strategy or limit the initial events"),
    );
    map.insert(
        ExitCriteriaOffset,
        KindInfo::new("Exit date offset from the start date is zero", Severity::Warning),
    );

    // Time
    map.insert(
        TimeWindowInconsistency,
        KindInfo::new("Time window cannot be satisfied", Severity::Warning),
    );
    map.insert(
        EventsProgression,
        KindInfo::new("Criteria order contradicts their time windows", Severity::Warning),
    );

    // Ingestion
    map.insert(
        ParseError,
        KindInfo::new("Input is not well-formed JSON", Severity::Critical),
    );
    map.insert(
        ValidationError,
        KindInfo::new("Input does not describe a cohort expression", Severity::Critical),
    );

    map
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_has_info() {
        for kind in FindingKind::ALL {
            assert_ne!(kind.info().description, UNKNOWN_KIND.description, "{kind}");
        }
    }

    #[test]
    fn test_identifier_matches_serde() {
        for kind in FindingKind::ALL {
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json, serde_json::Value::String(kind.as_str().to_string()));
        }
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!(
            "unused_concept_set".parse::<FindingKind>(),
            Ok(FindingKind::UnusedConceptSet)
        );
        assert!("NOT_A_RULE".parse::<FindingKind>().is_err());
    }

    #[test]
    fn test_ingestion_kinds_are_critical() {
        assert!(FindingKind::ParseError.is_ingestion());
        assert_eq!(FindingKind::ValidationError.default_severity(), Severity::Critical);
        assert!(!FindingKind::EmptyValue.is_ingestion());
    }
}
