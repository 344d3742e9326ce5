//! Output formatting utilities

use anyhow::{Context, Result};
use clap::ValueEnum;
use cohort_check_diagnostics::{Finding, Report, Summary};
use colored::Colorize;
use serde::Serialize;
use std::fs::File;
use std::io::{IsTerminal, Write};
use std::path::Path;

/// Output format options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON report
    #[default]
    Json,
    /// Human-readable report
    Text,
}

/// When to colour text output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

/// Set up color output based on user preference
///
/// `Auto` colours only when the report goes to a terminal.
pub fn setup_colors(mode: ColorMode, to_stdout: bool) {
    let enabled = match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => to_stdout && std::io::stdout().is_terminal(),
    };
    colored::control::set_override(enabled);
}

/// Format an error for display
pub fn format_error(error: &anyhow::Error) -> String {
    format!("{} {error:#}", "Error:".red().bold())
}

/// Format a success message for display
pub fn format_success(message: &str) -> String {
    format!("{} {message}", "Success:".green().bold())
}

/// JSON shape of a report
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub input_file: &'a str,
    pub warnings: &'a [Finding],
    pub errors: &'a [Finding],
    pub summary: Summary,
}

impl<'a> JsonReport<'a> {
    pub fn new(input_file: &'a str, report: &'a Report) -> Self {
        Self {
            input_file,
            warnings: &report.warnings,
            errors: &report.errors,
            summary: report.summary(),
        }
    }
}

/// Format a report as pretty-printed JSON
pub fn format_json(report: &Report, input_file: &str) -> Result<String> {
    serde_json::to_string_pretty(&JsonReport::new(input_file, report))
        .context("Failed to serialize report")
}

/// Format a report for reading in a terminal
pub fn format_text(report: &Report, input_file: &str) -> String {
    let summary = report.summary();
    let mut lines = vec![
        format!("Cohort expression check: {}", input_file.cyan()),
        "=".repeat(60),
        format!("Warnings: {}", summary.total_warnings),
        format!("Errors: {}", summary.total_errors),
        format!(
            "Valid: {}",
            if summary.is_valid {
                "Yes".green().bold()
            } else {
                "No".red().bold()
            }
        ),
    ];

    for (title, findings) in [("WARNINGS", &report.warnings), ("ERRORS", &report.errors)] {
        if findings.is_empty() {
            continue;
        }
        lines.push(String::new());
        lines.push(title.bold().to_string());
        for (i, finding) in findings.iter().enumerate() {
            lines.push(format!(
                "  {}. [{}] {}",
                i + 1,
                finding.severity.colored_label(),
                finding.message
            ));
        }
    }

    lines.join("\n")
}

/// Format a report in the requested format
pub fn format_report(report: &Report, input_file: &str, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => format_json(report, input_file),
        OutputFormat::Text => Ok(format_text(report, input_file)),
    }
}

/// Write output to a file or stdout
pub fn write_output(content: &str, output_file: Option<&Path>) -> Result<()> {
    if let Some(path) = output_file {
        let mut file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        writeln!(file, "{content}")
            .with_context(|| format!("Failed to write to output file: {}", path.display()))?;
        eprintln!(
            "{}",
            format_success(&format!("Report written to {}", path.display()))
        );
    } else {
        println!("{content}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cohort_check_diagnostics::FindingKind;

    fn report() -> Report {
        Report::from_findings([
            Finding::warning(FindingKind::UnusedConceptSet, "Concept set \"A\" (id 7) is not used"),
            Finding::error(FindingKind::ContradictoryRange, "bad range"),
        ])
    }

    #[test]
    fn test_json_shape() {
        let json: serde_json::Value =
            serde_json::from_str(&format_json(&report(), "cohort.json").unwrap()).unwrap();
        assert_eq!(json["input_file"], "cohort.json");
        assert_eq!(json["warnings"][0]["type"], "UNUSED_CONCEPT_SET");
        assert_eq!(json["errors"][0]["severity"], "ERROR");
        assert_eq!(json["summary"]["total_errors"], 1);
        assert_eq!(json["summary"]["is_valid"], false);
    }

    #[test]
    fn test_text_lists_both_sides() {
        colored::control::set_override(false);
        let text = format_text(&report(), "cohort.json");
        assert!(text.contains("Valid: No"));
        assert!(text.contains("WARNINGS\n  1. [WARNING] Concept set \"A\" (id 7) is not used"));
        assert!(text.contains("ERRORS\n  1. [ERROR] bad range"));
    }
}
