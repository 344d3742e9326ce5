//! Section checks: empty sections and cohort exit

use crate::context::RuleContext;
use crate::location::Section;
use cohort_check_diagnostics::{Finding, FindingKind};
use cohort_check_model::{DateField, EndStrategy, LimitType};

/// Empty primary criteria, inclusion rules, groups and demographic criteria
///
/// Severity depends on the section: no primary criteria is an error, an
/// inclusion rule without criteria is informational, anything else a warning.
pub fn missing_sections(ctx: &RuleContext<'_>) -> Vec<Finding> {
    let kind = FindingKind::MissingRequiredSection;
    let mut findings = Vec::new();

    if ctx.expression.primary_criteria.criteria_list.is_empty() {
        findings.push(Finding::error(kind, "Primary criteria contain no criteria"));
    }

    for site in ctx.index.groups() {
        if !site.group.is_empty() {
            continue;
        }
        match (&site.location.section, site.is_root()) {
            (Section::AdditionalCriteria, true) => {}
            (Section::InclusionRule { .. }, true) => findings.push(Finding::info(
                kind,
                format!("{} has no criteria", capitalize(&site.location.to_string())),
            )),
            _ => findings.push(Finding::warning(
                kind,
                format!("Group at {} has no criteria", site.location),
            )),
        }
    }

    for site in ctx.index.demographics() {
        if site.demographic.is_empty() {
            findings.push(Finding::warning(
                kind,
                format!("Demographic criteria at {} specify no attributes", site.location),
            ));
        }
    }

    findings
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// All events selected and no end strategy: every event opens an era lasting
/// to the end of observation
pub fn missing_exit(ctx: &RuleContext<'_>) -> Vec<Finding> {
    let expression = ctx.expression;
    if expression.end_strategy.is_some() || expression.primary_limit() != LimitType::All {
        return Vec::new();
    }
    vec![Finding::of(
        FindingKind::MissingExitCriteria,
        "All events are selected and no cohort exit criteria is specified",
    )]
}

/// Exit at the event start date with no offset
pub fn exit_offset(ctx: &RuleContext<'_>) -> Vec<Finding> {
    match &ctx.expression.end_strategy {
        Some(EndStrategy::DateOffset(offset))
            if offset.date_field == Some(DateField::StartDate) && offset.offset == 0 =>
        {
            vec![Finding::of(
                FindingKind::ExitCriteriaOffset,
                "Cohort exit is the event start date with offset 0; days offset from the start date should be greater than 0",
            )]
        }
        _ => Vec::new(),
    }
}
