//! Criteria checks: duplicates, contradictions and domain mismatches

use crate::context::RuleContext;
use crate::index::CriterionSite;
use crate::location::Location;
use crate::rules::describe;
use cohort_check_diagnostics::{Finding, FindingKind};
use cohort_check_model::{CorrelatedCriteria, DayOffset, GroupType, Occurrence, Window};
use indexmap::{IndexMap, IndexSet};

const INGREDIENT: &str = "Ingredient";

fn occurrence<'a>(site: &CriterionSite<'a>) -> Option<&'a Occurrence> {
    site.correlated.and_then(|c| c.occurrence.as_ref())
}

/// Criteria of one group sharing a fingerprint and occurrence policy
pub fn duplicates(ctx: &RuleContext<'_>) -> Vec<Finding> {
    let mut findings = Vec::new();
    for (fingerprint, sites) in ctx.index.fingerprints() {
        if sites.len() < 2 {
            continue;
        }

        let mut by_group: IndexMap<(&Location, Option<&Occurrence>), Vec<&CriterionSite<'_>>> =
            IndexMap::new();
        for site in sites {
            by_group
                .entry((&site.parent, occurrence(site)))
                .or_default()
                .push(site);
        }

        for ((parent, _), members) in by_group {
            if members.len() < 2 {
                continue;
            }
            let positions: Vec<String> = members
                .iter()
                .filter_map(|site| site.location.path.last())
                .map(ToString::to_string)
                .collect();
            findings.push(Finding::of(
                FindingKind::DuplicateCriteria,
                format!(
                    "{} criteria at {parent} are probably duplicates: {}",
                    fingerprint.variant(),
                    positions.join(", ")
                ),
            ));
        }
    }
    findings
}

/// Start window as a day range, unbounded when absent
fn start_span(correlated: &CorrelatedCriteria) -> (DayOffset, DayOffset) {
    correlated
        .start_window
        .as_ref()
        .and_then(Window::span)
        .unwrap_or((DayOffset::AllBefore, DayOffset::AllAfter))
}

fn same_anchors(a: &Option<Window>, b: &Option<Window>) -> bool {
    let anchors = |w: &Option<Window>| {
        w.as_ref().map_or((false, false), |w| {
            (w.use_index_end.unwrap_or(false), w.use_event_end.unwrap_or(false))
        })
    };
    anchors(a) == anchors(b)
}

/// Absence window covers the presence window of the same criterion
fn contradicts(absent: &CorrelatedCriteria, present: &CorrelatedCriteria) -> bool {
    if !same_anchors(&absent.start_window, &present.start_window) {
        return false;
    }
    if absent.end_window.is_some() && absent.end_window != present.end_window {
        return false;
    }
    if absent.restrict_visit.unwrap_or(false) && !present.restrict_visit.unwrap_or(false) {
        return false;
    }

    let (absent_start, absent_end) = start_span(absent);
    let (present_start, present_end) = start_span(present);
    absent_start <= present_start && present_end <= absent_end
}

/// In an ALL group, a criterion required both to occur and not to occur
pub fn contradictions(ctx: &RuleContext<'_>) -> Vec<Finding> {
    let mut findings = Vec::new();
    for group in ctx.index.groups() {
        if group.group.group_type() != GroupType::All {
            continue;
        }

        let members: Vec<(&CriterionSite<'_>, &CorrelatedCriteria, &Occurrence)> = ctx
            .index
            .members_of(&group.location)
            .filter_map(|site| {
                let correlated = site.correlated?;
                Some((site, correlated, correlated.occurrence.as_ref()?))
            })
            .collect();

        for (present_site, present, present_occurrence) in &members {
            if !present_occurrence.requires_presence() {
                continue;
            }
            for (absent_site, absent, absent_occurrence) in &members {
                if absent_occurrence.requires_absence()
                    && absent_site.fingerprint == present_site.fingerprint
                    && contradicts(absent, present)
                {
                    let positions = [&present_site.location, &absent_site.location]
                        .map(|l| l.path.last().map(ToString::to_string).unwrap_or_default());
                    findings.push(Finding::of(
                        FindingKind::ContradictoryCriteria,
                        format!(
                            "{} criteria at {} must occur ({}) and not occur ({}) in the same window",
                            present_site.criteria.name(),
                            group.location,
                            positions[0],
                            positions[1]
                        ),
                    ));
                }
            }
        }
    }
    findings
}

/// Concept sets whose concepts belong to another domain than the criterion
pub fn domain_mismatch(ctx: &RuleContext<'_>) -> Vec<Finding> {
    let mut findings = Vec::new();
    for site in ctx.index.criteria() {
        let Some(expected) = site.criteria.domain() else {
            continue;
        };
        let Some(set) = site.criteria.codeset_id().and_then(|id| ctx.concept_set(id)) else {
            continue;
        };

        let mut domains: IndexSet<String> = IndexSet::new();
        let mut classes: IndexSet<String> = IndexSet::new();
        for item in set.items().iter().filter(|item| !item.is_excluded) {
            let Some(info) = ctx.concept_info(&item.concept) else {
                continue;
            };
            if let Some(domain) = info.domain_id.filter(|d| !d.trim().is_empty()) {
                if !domain.trim().eq_ignore_ascii_case(expected) {
                    domains.insert(domain);
                    continue;
                }
            }
            if site.criteria.expects_ingredients() {
                if let Some(class) = info.concept_class_id.filter(|c| !c.eq_ignore_ascii_case(INGREDIENT)) {
                    classes.insert(class);
                }
            }
        }

        if !domains.is_empty() {
            let domains: Vec<String> = domains.into_iter().collect();
            findings.push(Finding::of(
                FindingKind::DomainTypeMismatch,
                format!(
                    "{} use concept set {} containing {} domain concepts, expected {expected}",
                    describe(site),
                    set.label(),
                    domains.join("/")
                ),
            ));
        }
        if !classes.is_empty() {
            let classes: Vec<String> = classes.into_iter().collect();
            findings.push(Finding::of(
                FindingKind::DomainTypeMismatch,
                format!(
                    "{} use concept set {} containing {} concepts, expected {INGREDIENT} concepts",
                    describe(site),
                    set.label(),
                    classes.join("/")
                ),
            ));
        }
    }
    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::CrossReferenceIndex;
    use crate::lookup::{ConceptInfo, InMemoryConceptLookup};
    use cohort_check_model::parse;
    use pretty_assertions::assert_eq;

    fn run(json: &str, rule: fn(&RuleContext<'_>) -> Vec<Finding>) -> Vec<String> {
        let expression = parse(json).unwrap();
        let index = CrossReferenceIndex::build(&expression);
        rule(&RuleContext::new(&expression, &index))
            .into_iter()
            .map(|f| f.message)
            .collect()
    }

    #[test]
    fn test_duplicates_in_same_group() {
        let messages = run(
            r#"{"ConceptSets": [{"id": 1}], "PrimaryCriteria": {"CriteriaList": [
                {"DrugExposure": {"CodesetId": 1, "First": true}},
                {"ConditionOccurrence": {"CodesetId": 1}},
                {"DrugExposure": {"First": true, "CodesetId": 1}}
            ]}}"#,
            duplicates,
        );
        assert_eq!(
            messages,
            vec!["DrugExposure criteria at primary criteria are probably duplicates: criterion 1, criterion 3"]
        );
    }

    #[test]
    fn test_duplicates_ignore_windows_but_not_groups() {
        let messages = run(
            r#"{"ConceptSets": [{"id": 1}], "PrimaryCriteria": {"CriteriaList": [
                {"DrugExposure": {"CodesetId": 1}}
            ]}, "AdditionalCriteria": {"Type": "ALL", "CriteriaList": [
                {"Criteria": {"DrugExposure": {"CodesetId": 1}},
                 "StartWindow": {"Start": {"Days": 30, "Coeff": -1}, "End": {"Days": 0, "Coeff": 1}},
                 "Occurrence": {"Type": 2, "Count": 1}},
                {"Criteria": {"DrugExposure": {"CodesetId": 1}},
                 "StartWindow": {"Start": {"Days": 365, "Coeff": -1}, "End": {"Days": 0, "Coeff": 1}},
                 "Occurrence": {"Type": 2, "Count": 1}}
            ]}}"#,
            duplicates,
        );
        assert_eq!(
            messages,
            vec!["DrugExposure criteria at additional criteria are probably duplicates: criterion 1, criterion 2"]
        );
    }

    const CONTRADICTION: &str = r#"{"ConceptSets": [{"id": 1}], "PrimaryCriteria": {"CriteriaList": []},
        "AdditionalCriteria": {"Type": "ALL", "CriteriaList": [
            {"Criteria": {"ConditionOccurrence": {"CodesetId": 1}},
             "StartWindow": {"Start": {"Days": 30, "Coeff": -1}, "End": {"Days": 0, "Coeff": 1}},
             "Occurrence": {"Type": 2, "Count": 1}},
            {"Criteria": {"ConditionOccurrence": {"CodesetId": 1}},
             "StartWindow": {"Start": {"Coeff": -1}, "End": {"Days": 0, "Coeff": 1}},
             "Occurrence": {"Type": 0, "Count": 0}}
        ]}}"#;

    #[test]
    fn test_contradiction() {
        assert_eq!(
            run(CONTRADICTION, contradictions),
            vec!["ConditionOccurrence criteria at additional criteria must occur (criterion 1) and not occur (criterion 2) in the same window"]
        );
    }

    #[test]
    fn test_no_contradiction_in_any_group() {
        let any = CONTRADICTION.replace(r#""Type": "ALL""#, r#""Type": "ANY""#);
        assert!(run(&any, contradictions).is_empty());
    }

    const MISMATCH: &str = r#"{
        "ConceptSets": [
            {"id": 1, "name": "Metformin", "expression": {"items": [
                {"concept": {"CONCEPT_ID": 1503297, "DOMAIN_ID": "Drug", "CONCEPT_CLASS_ID": "Ingredient"}}
            ]}},
            {"id": 2, "name": "Metformin 500 MG", "expression": {"items": [
                {"concept": {"CONCEPT_ID": 1503328, "DOMAIN_ID": "Drug", "CONCEPT_CLASS_ID": "Clinical Drug"}}
            ]}}
        ],
        "PrimaryCriteria": {"CriteriaList": [
            {"ConditionOccurrence": {"CodesetId": 1}},
            {"DrugExposure": {"CodesetId": 1}},
            {"DrugEra": {"CodesetId": 2}}
        ]}
    }"#;

    #[test]
    fn test_domain_mismatch_from_embedded_metadata() {
        assert_eq!(
            run(MISMATCH, domain_mismatch),
            vec![
                "ConditionOccurrence criteria at primary criteria > criterion 1 use concept set \"Metformin\" (id 1) containing Drug domain concepts, expected Condition",
                "DrugEra criteria at primary criteria > criterion 3 use concept set \"Metformin 500 MG\" (id 2) containing Clinical Drug concepts, expected Ingredient concepts",
            ]
        );
    }

    #[test]
    fn test_injected_lookup_wins() {
        let expression = parse(MISMATCH).unwrap();
        let index = CrossReferenceIndex::build(&expression);
        let lookup: InMemoryConceptLookup = [ConceptInfo {
            concept_id: 1503297,
            domain_id: Some("Condition".into()),
            ..ConceptInfo::default()
        }]
        .into_iter()
        .collect();

        let findings = domain_mismatch(&RuleContext::new(&expression, &index).with_lookup(&lookup));
        assert_eq!(findings.len(), 2);
        assert!(findings[0].message.starts_with("DrugExposure criteria"));
    }
}
