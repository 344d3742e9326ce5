//! Time window checks

use crate::context::RuleContext;
use crate::index::CriterionSite;
use crate::rules::describe;
use cohort_check_diagnostics::{Finding, FindingKind};
use cohort_check_model::{CorrelatedCriteria, Criteria, DayOffset, GroupType, Window};

fn bounded(span: (DayOffset, DayOffset)) -> Option<(i64, i64)> {
    match span {
        (DayOffset::Days(start), DayOffset::Days(end)) => Some((start, end)),
        _ => None,
    }
}

/// Inverted windows and death windows that cannot be satisfied
pub fn inconsistent(ctx: &RuleContext<'_>) -> Vec<Finding> {
    let kind = FindingKind::TimeWindowInconsistency;
    let mut findings = Vec::new();

    for site in ctx.index.criteria() {
        let Some(correlated) = site.correlated else {
            continue;
        };

        let windows = [
            ("start window", &correlated.start_window),
            ("end window", &correlated.end_window),
        ];
        for (name, window) in windows {
            let Some((start, end)) = window.as_ref().and_then(Window::span) else {
                continue;
            };
            if start > end {
                findings.push(Finding::warning(
                    kind,
                    format!("{}: {name} starts {start} but ends {end}", describe(site)),
                ));
            }
        }

        if matches!(site.criteria, Criteria::Death(_)) {
            findings.extend(death_window(site, correlated));
        }
    }
    findings
}

/// A required death whose window reaches before the index event
fn death_window(site: &CriterionSite<'_>, correlated: &CorrelatedCriteria) -> Option<Finding> {
    let kind = FindingKind::TimeWindowInconsistency;
    let required = correlated
        .occurrence
        .as_ref()
        .is_some_and(|o| o.requires_presence());
    let (start, end) = correlated.start_window.as_ref().and_then(Window::span)?;
    if !required || start > end {
        return None;
    }

    let index = DayOffset::Days(0);
    if end < index {
        Some(Finding::error(
            kind,
            format!(
                "{}: death is required in the window from {start} to {end}, but the index event cannot follow death",
                describe(site)
            ),
        ))
    } else if start < index && end > index {
        Some(Finding::warning(
            kind,
            format!(
                "{}: death time window from {start} to {end} includes days before the index event, which cannot follow death",
                describe(site)
            ),
        ))
    } else {
        None
    }
}

/// In an ALL group, a later criterion whose window lies entirely before an
/// earlier one
pub fn progression(ctx: &RuleContext<'_>) -> Vec<Finding> {
    let mut findings = Vec::new();
    for group in ctx.index.groups() {
        if group.group.group_type() != GroupType::All {
            continue;
        }

        let members: Vec<(&CriterionSite<'_>, (i64, i64))> = ctx
            .index
            .members_of(&group.location)
            .filter_map(|site| {
                let correlated = site.correlated?;
                let absent = correlated
                    .occurrence
                    .as_ref()
                    .is_some_and(|o| o.requires_absence());
                if absent {
                    return None;
                }
                let span = bounded(correlated.start_window.as_ref()?.span()?)?;
                Some((site, span))
            })
            .collect();

        for (i, (earlier, (earlier_start, _))) in members.iter().enumerate() {
            for (later, (later_start, later_end)) in &members[i + 1..] {
                if later_end < earlier_start {
                    findings.push(Finding::of(
                        FindingKind::EventsProgression,
                        format!(
                            "{} is listed after {} but must start between {} and {}, before its window begins {}",
                            describe(later),
                            describe(earlier),
                            DayOffset::Days(*later_start),
                            DayOffset::Days(*later_end),
                            DayOffset::Days(*earlier_start)
                        ),
                    ));
                }
            }
        }
    }
    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::CrossReferenceIndex;
    use cohort_check_diagnostics::Severity;
    use cohort_check_model::parse;
    use rstest::rstest;

    fn run(json: &str, rule: fn(&RuleContext<'_>) -> Vec<Finding>) -> Vec<Finding> {
        let expression = parse(json).unwrap();
        let index = CrossReferenceIndex::build(&expression);
        rule(&RuleContext::new(&expression, &index))
    }

    fn correlated(criteria: &str, start: (i64, i64), end: (i64, i64), occurrence: &str) -> String {
        format!(
            r#"{{"Criteria": {criteria},
                "StartWindow": {{"Start": {{"Days": {}, "Coeff": {}}}, "End": {{"Days": {}, "Coeff": {}}}}},
                "Occurrence": {occurrence}}}"#,
            start.0, start.1, end.0, end.1
        )
    }

    fn additional(group_type: &str, members: &[String]) -> String {
        format!(
            r#"{{"ConceptSets": [{{"id": 1}}], "PrimaryCriteria": {{"CriteriaList": [{{"ConditionOccurrence": {{"CodesetId": 1}}}}]}},
                "AdditionalCriteria": {{"Type": "{group_type}", "CriteriaList": [{}]}}}}"#,
            members.join(",")
        )
    }

    const AT_LEAST_ONE: &str = r#"{"Type": 2, "Count": 1}"#;

    #[test]
    fn test_inverted_window() {
        let json = additional(
            "ALL",
            &[correlated(r#"{"DrugExposure": {"CodesetId": 1}}"#, (0, 1), (30, -1), AT_LEAST_ONE)],
        );
        let findings = run(&json, inconsistent);
        assert_eq!(findings.len(), 1);
        assert_eq!(
            findings[0].message,
            "DrugExposure criteria at additional criteria > criterion 1: start window starts index but ends 30 days before"
        );
    }

    #[rstest]
    #[case::before_index((365, -1), (1, -1), Some(Severity::Error))]
    #[case::around_index((30, -1), (30, 1), Some(Severity::Warning))]
    #[case::after_index((0, 1), (365, 1), None)]
    fn test_death_window(
        #[case] start: (i64, i64),
        #[case] end: (i64, i64),
        #[case] expected: Option<Severity>,
    ) {
        let json = additional("ALL", &[correlated(r#"{"Death": {}}"#, start, end, AT_LEAST_ONE)]);
        let findings = run(&json, inconsistent);
        assert_eq!(findings.first().map(|f| f.severity), expected);
        assert!(findings.len() <= 1);
    }

    #[test]
    fn test_absent_death_is_not_checked() {
        let json = additional(
            "ALL",
            &[correlated(r#"{"Death": {}}"#, (365, -1), (1, -1), r#"{"Type": 0, "Count": 0}"#)],
        );
        assert!(run(&json, inconsistent).is_empty());
    }

    #[test]
    fn test_progression() {
        let members = [
            correlated(r#"{"DrugExposure": {"CodesetId": 1}}"#, (30, 1), (60, 1), AT_LEAST_ONE),
            correlated(r#"{"ProcedureOccurrence": {"CodesetId": 1}}"#, (60, -1), (1, -1), AT_LEAST_ONE),
        ];
        let findings = run(&additional("ALL", &members), progression);
        assert_eq!(findings.len(), 1);
        assert_eq!(
            findings[0].message,
            "ProcedureOccurrence criteria at additional criteria > criterion 2 is listed after DrugExposure criteria at additional criteria > criterion 1 but must start between 60 days before and 1 day before, before its window begins 30 days after"
        );

        assert!(run(&additional("ANY", &members), progression).is_empty());
    }

    #[test]
    fn test_progression_in_order() {
        let members = [
            correlated(r#"{"DrugExposure": {"CodesetId": 1}}"#, (60, -1), (1, -1), AT_LEAST_ONE),
            correlated(r#"{"ProcedureOccurrence": {"CodesetId": 1}}"#, (0, 1), (30, 1), AT_LEAST_ONE),
        ];
        assert!(run(&additional("ALL", &members), progression).is_empty());
    }
}
