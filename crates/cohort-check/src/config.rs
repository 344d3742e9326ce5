//! Checker configuration files
//!
//! A configuration file is a JSON object:
//!
//! ```json
//! {
//!   "severity": { "MISSING_EXIT_CRITERIA": "ERROR" },
//!   "parallel": false,
//!   "concepts": "concepts.json"
//! }
//! ```
//!
//! Every field is optional. A relative `concepts` path is resolved against
//! the directory of the configuration file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use cohort_check_diagnostics::{PolicyError, SeverityPolicy, parse_override};
use cohort_check_engine::{Checker, InMemoryConceptLookup, LookupError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors loading or applying a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error(transparent)]
    Lookup(#[from] LookupError),
}

/// Settings for a [`Checker`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CheckerConfig {
    /// Severity overrides, finding type to severity name
    pub severity: IndexMap<String, String>,
    /// Evaluate rules concurrently
    pub parallel: bool,
    /// JSON file of concept metadata
    pub concepts: Option<PathBuf>,
}

impl CheckerConfig {
    /// Read a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;

        if let (Some(concepts), Some(dir)) = (&config.concepts, path.parent()) {
            if concepts.is_relative() {
                config.concepts = Some(dir.join(concepts));
            }
        }
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Add a `KIND=LEVEL` override; later overrides win
    pub fn add_override(&mut self, spec: &str) -> Result<(), ConfigError> {
        let (kind, severity) = parse_override(spec)?;
        self.severity.insert(kind.to_string(), severity.to_string());
        Ok(())
    }

    /// The severity policy described by this configuration
    pub fn policy(&self) -> Result<SeverityPolicy, ConfigError> {
        let mut policy = SeverityPolicy::new();
        for (kind, severity) in &self.severity {
            policy.apply_override_str(&format!("{kind}={severity}"))?;
        }
        Ok(policy)
    }

    /// Build a checker, loading the concept file if one is named
    pub fn to_checker(&self) -> Result<Checker, ConfigError> {
        let mut checker = Checker::new()
            .with_policy(self.policy()?)
            .with_parallel(self.parallel);
        if let Some(path) = &self.concepts {
            checker = checker.with_lookup(Arc::new(InMemoryConceptLookup::load(path)?));
        }
        Ok(checker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cohort_check_diagnostics::{FindingKind, Severity};
    use std::fs;

    #[test]
    fn test_load_config() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("concepts.json"),
            r#"[{"concept_id": 1, "domain_id": "Drug"}]"#,
        )
        .unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"severity": {"missing_exit_criteria": "error"}, "concepts": "concepts.json"}"#,
        )
        .unwrap();

        let config = CheckerConfig::load(&path).unwrap();
        assert_eq!(config.concepts, Some(dir.path().join("concepts.json")));
        assert!(!config.parallel);

        let policy = config.policy().unwrap();
        assert_eq!(policy.get(FindingKind::MissingExitCriteria), Some(Severity::Error));
        assert!(config.to_checker().is_ok());
    }

    #[test]
    fn test_unknown_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"severity": {}, "strict": true}"#).unwrap();
        assert!(matches!(CheckerConfig::load(&path), Err(ConfigError::Json { .. })));
    }

    #[test]
    fn test_override_wins() {
        let mut config = CheckerConfig::default();
        config.severity.insert("UNUSED_CONCEPT_SET".into(), "INFO".into());
        config.add_override("unused_concept_set=error").unwrap();
        assert_eq!(
            config.policy().unwrap().get(FindingKind::UnusedConceptSet),
            Some(Severity::Error)
        );
    }

    #[test]
    fn test_invalid_overrides() {
        let mut config = CheckerConfig::default();
        assert!(config.add_override("UNUSED_CONCEPT_SET").is_err());
        assert!(config.add_override("NO_SUCH_RULE=ERROR").is_err());

        config.severity.insert("PARSE_ERROR".into(), "INFO".into());
        assert!(matches!(
            config.policy(),
            Err(ConfigError::Policy(PolicyError::NotOverridable(_)))
        ));
    }
}
