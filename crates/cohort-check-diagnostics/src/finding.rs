//! Finding and severity types

use crate::FindingKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Finding severity level, ordered from least to most severe
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    /// Informational - nothing to fix
    Info,
    /// Warning - probably not what the author intended
    Warning,
    /// Error - the expression is defective
    Error,
    /// Critical - the expression could not be checked at all
    Critical,
}

impl Severity {
    /// All severities in ascending order
    pub const ALL: [Severity; 4] = [
        Severity::Info,
        Severity::Warning,
        Severity::Error,
        Severity::Critical,
    ];

    /// Stable upper-case name used in reports
    pub const fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
            Severity::Critical => "CRITICAL",
        }
    }

    /// Whether findings of this severity make an expression invalid
    pub const fn is_error(&self) -> bool {
        matches!(self, Severity::Error | Severity::Critical)
    }

    /// Severity name coloured for terminal output
    #[cfg(feature = "colored")]
    pub fn colored_label(&self) -> colored::ColoredString {
        use colored::Colorize;

        match self {
            Severity::Info => self.as_str().blue(),
            Severity::Warning => self.as_str().yellow().bold(),
            Severity::Error => self.as_str().red().bold(),
            Severity::Critical => self.as_str().red().bold().underline(),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a severity name is not recognised
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown severity '{0}' (expected INFO, WARNING, ERROR or CRITICAL)")]
pub struct UnknownSeverity(pub String);

impl FromStr for Severity {
    type Err = UnknownSeverity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Severity::ALL
            .into_iter()
            .find(|severity| severity.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownSeverity(s.to_string()))
    }
}

/// One diagnostic record produced by a check
///
/// Findings are plain values: they carry no reference back into the
/// expression beyond what is written in the message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Finding {
    /// Human-readable message
    pub message: String,
    /// Severity level
    pub severity: Severity,
    /// Originating check
    #[serde(rename = "type")]
    pub kind: FindingKind,
}

impl Finding {
    /// Create a finding with an explicit severity
    pub fn new(kind: FindingKind, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity,
            kind,
        }
    }

    /// Create a finding at the kind's default severity
    pub fn of(kind: FindingKind, message: impl Into<String>) -> Self {
        Self::new(kind, kind.default_severity(), message)
    }

    /// Create an info finding
    pub fn info(kind: FindingKind, message: impl Into<String>) -> Self {
        Self::new(kind, Severity::Info, message)
    }

    /// Create a warning finding
    pub fn warning(kind: FindingKind, message: impl Into<String>) -> Self {
        Self::new(kind, Severity::Warning, message)
    }

    /// Create an error finding
    pub fn error(kind: FindingKind, message: impl Into<String>) -> Self {
        Self::new(kind, Severity::Error, message)
    }

    /// Create a critical finding
    pub fn critical(kind: FindingKind, message: impl Into<String>) -> Self {
        Self::new(kind, Severity::Critical, message)
    }

    /// Replace the severity
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Whether this finding counts as an error
    pub fn is_error(&self) -> bool {
        self.severity.is_error()
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.kind, self.message)
    }
}
