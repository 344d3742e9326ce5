//! Severity policy: per-kind overrides of rule severities

use crate::{Finding, FindingKind, Severity, UnknownKind, UnknownSeverity};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors in severity policy definitions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    /// Override is not of the form `KIND=LEVEL`
    #[error("invalid severity override '{0}' (expected KIND=LEVEL)")]
    Malformed(String),

    #[error(transparent)]
    Kind(#[from] UnknownKind),

    #[error(transparent)]
    Severity(#[from] UnknownSeverity),

    /// Ingestion findings are not subject to policy
    #[error("severity of {0} cannot be overridden")]
    NotOverridable(FindingKind),
}

/// Per-kind severity overrides
///
/// Rules attach a severity when they emit a finding; the policy replaces it
/// for every kind it names. Kinds it does not name keep the rule's choice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeverityPolicy {
    overrides: IndexMap<FindingKind, Severity>,
}

impl SeverityPolicy {
    /// Create an empty policy
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an override
    pub fn with_override(mut self, kind: FindingKind, severity: Severity) -> Result<Self, PolicyError> {
        self.set(kind, severity)?;
        Ok(self)
    }

    /// Set an override in place
    pub fn set(&mut self, kind: FindingKind, severity: Severity) -> Result<(), PolicyError> {
        if kind.is_ingestion() {
            return Err(PolicyError::NotOverridable(kind));
        }
        self.overrides.insert(kind, severity);
        Ok(())
    }

    /// Parse a `KIND=LEVEL` override and add it
    pub fn apply_override_str(&mut self, spec: &str) -> Result<(), PolicyError> {
        let (kind, severity) = parse_override(spec)?;
        self.set(kind, severity)
    }

    /// Merge another policy into this one; the other policy wins on conflicts
    pub fn merge(&mut self, other: &SeverityPolicy) {
        for (kind, severity) in &other.overrides {
            self.overrides.insert(*kind, *severity);
        }
    }

    /// Override for a kind, if any
    pub fn get(&self, kind: FindingKind) -> Option<Severity> {
        self.overrides.get(&kind).copied()
    }

    /// Whether the policy has no overrides
    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }

    /// Apply the policy to a finding
    pub fn apply(&self, finding: Finding) -> Finding {
        if finding.kind.is_ingestion() {
            return finding;
        }
        match self.get(finding.kind) {
            Some(severity) => finding.with_severity(severity),
            None => finding,
        }
    }
}

/// Parse a `KIND=LEVEL` override string
pub fn parse_override(spec: &str) -> Result<(FindingKind, Severity), PolicyError> {
    let (kind, severity) = spec
        .split_once('=')
        .ok_or_else(|| PolicyError::Malformed(spec.to_string()))?;
    Ok((kind.parse()?, severity.parse()?))
}
