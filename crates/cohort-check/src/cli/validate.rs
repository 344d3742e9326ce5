//! Validate command implementation

use super::output::{self, OutputFormat};
use crate::config::CheckerConfig;
use crate::validate_document_with;
use anyhow::{Context, Result};
use cohort_check_diagnostics::Report;
use std::fs;
use std::path::PathBuf;

/// Configuration for validate command
#[derive(Debug, Clone, Default)]
pub struct ValidateConfig {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub format: OutputFormat,
    pub config_file: Option<PathBuf>,
    pub overrides: Vec<String>,
    pub concepts: Option<PathBuf>,
    pub parallel: bool,
    pub strict: bool,
}

impl ValidateConfig {
    /// Merge the config file with command-line settings; the command line wins
    fn checker_config(&self) -> Result<CheckerConfig> {
        let mut config = match &self.config_file {
            Some(path) => CheckerConfig::load(path)?,
            None => CheckerConfig::default(),
        };
        for spec in &self.overrides {
            config.add_override(spec)?;
        }
        if self.concepts.is_some() {
            config.concepts.clone_from(&self.concepts);
        }
        config.parallel |= self.parallel;
        Ok(config)
    }
}

/// Outcome of a validate run
#[derive(Debug)]
pub struct Outcome {
    pub report: Report,
    /// Whether the process should exit successfully
    pub passed: bool,
}

/// Check one input file and write the report
pub fn validate(config: &ValidateConfig) -> Result<Outcome> {
    let checker = config.checker_config()?.to_checker()?;

    let input = fs::read_to_string(&config.input)
        .with_context(|| format!("Failed to read input file: {}", config.input.display()))?;
    log::debug!("checking {}", config.input.display());

    let report = validate_document_with(&checker, &input);
    let input_name = config.input.display().to_string();
    let content = output::format_report(&report, &input_name, config.format)?;
    output::write_output(&content, config.output.as_deref())?;

    let passed = report.is_valid() && !(config.strict && !report.warnings.is_empty());
    Ok(Outcome { report, passed })
}

#[cfg(test)]
mod tests {
    use super::*;

    const OPEN_COHORT: &str = r#"{"PrimaryCriteria": {"CriteriaList": [{"Death": {}}],
        "PrimaryCriteriaLimit": {"Type": "All"}}}"#;

    fn run(extra: impl FnOnce(&mut ValidateConfig)) -> Outcome {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("cohort.json");
        fs::write(&input, OPEN_COHORT).unwrap();
        let mut config = ValidateConfig {
            input,
            output: Some(dir.path().join("report.json")),
            ..ValidateConfig::default()
        };
        extra(&mut config);
        validate(&config).unwrap()
    }

    #[test]
    fn test_warning_passes() {
        let outcome = run(|_| {});
        assert!(outcome.passed);
        assert_eq!(outcome.report.warnings.len(), 1);
    }

    #[test]
    fn test_strict_fails_on_warning() {
        assert!(!run(|c| c.strict = true).passed);
    }

    #[test]
    fn test_override_fails() {
        let outcome = run(|c| c.overrides.push("MISSING_EXIT_CRITERIA=ERROR".into()));
        assert!(!outcome.passed);
        assert_eq!(outcome.report.errors.len(), 1);
    }

    #[test]
    fn test_missing_input() {
        let config = ValidateConfig {
            input: PathBuf::from("/nonexistent/cohort.json"),
            ..ValidateConfig::default()
        };
        assert!(validate(&config).is_err());
    }
}
