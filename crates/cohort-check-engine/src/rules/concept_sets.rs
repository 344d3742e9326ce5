//! Concept set checks: usage, duplication, emptiness and dangling references

use std::collections::BTreeSet;

use crate::context::RuleContext;
use crate::rules::describe;
use cohort_check_diagnostics::{Finding, FindingKind};
use cohort_check_model::{ConceptSet, NormalizedItem};
use indexmap::IndexMap;

/// Concept sets that no criterion references
pub fn unused(ctx: &RuleContext<'_>) -> Vec<Finding> {
    ctx.expression
        .concept_sets
        .iter()
        .filter(|set| !ctx.index.is_used(set.id))
        .map(|set| {
            Finding::of(
                FindingKind::UnusedConceptSet,
                format!("Concept set {} is not used", set.label()),
            )
        })
        .collect()
}

/// Concept sets with identical item sets
pub fn duplicates(ctx: &RuleContext<'_>) -> Vec<Finding> {
    let mut by_items: IndexMap<BTreeSet<NormalizedItem>, Vec<&ConceptSet>> = IndexMap::new();
    for set in &ctx.expression.concept_sets {
        let items: BTreeSet<NormalizedItem> = set.items().iter().map(|i| i.normalized()).collect();
        if items.is_empty() {
            continue;
        }
        by_items.entry(items).or_default().push(set);
    }

    by_items
        .values()
        .filter(|sets| sets.len() > 1)
        .map(|sets| {
            let labels: Vec<String> = sets.iter().map(|set| set.label()).collect();
            Finding::of(
                FindingKind::DuplicateConceptSet,
                format!("Concept sets {} contain the same concepts", labels.join(", ")),
            )
        })
        .collect()
}

/// Items listing the same concept with the same exclusion flag twice
pub fn duplicate_items(ctx: &RuleContext<'_>) -> Vec<Finding> {
    let mut findings = Vec::new();
    for set in &ctx.expression.concept_sets {
        let mut counts: IndexMap<(i64, bool), usize> = IndexMap::new();
        for item in set.items() {
            if let Some(id) = item.concept.concept_id {
                *counts.entry((id, item.is_excluded)).or_default() += 1;
            }
        }

        for ((concept_id, excluded), count) in counts {
            if count < 2 {
                continue;
            }
            let role = if excluded { "excluded" } else { "included" };
            findings.push(Finding::of(
                FindingKind::ConceptSetDuplicateItems,
                format!(
                    "Concept set {} lists {role} concept {concept_id} {count} times",
                    set.label()
                ),
            ));
        }
    }
    findings
}

/// Codeset references to ids that no concept set declares
pub fn unknown(ctx: &RuleContext<'_>) -> Vec<Finding> {
    ctx.index
        .codeset_usages()
        .filter(|(id, _)| ctx.concept_set(*id).is_none())
        .flat_map(|(id, usages)| {
            usages.iter().map(move |usage| {
                Finding::of(
                    FindingKind::UnknownConceptSet,
                    format!(
                        "{} at {} references concept set id {id}, which is not defined",
                        usage.attribute, usage.location
                    ),
                )
            })
        })
        .collect()
}

/// Concept sets without items
pub fn empty(ctx: &RuleContext<'_>) -> Vec<Finding> {
    ctx.expression
        .concept_sets
        .iter()
        .filter(|set| set.items().is_empty())
        .map(|set| {
            Finding::of(
                FindingKind::EmptyConceptSet,
                format!("Concept set {} contains no concepts", set.label()),
            )
        })
        .collect()
}

/// Criteria that select by concept but name no concept set
pub fn missing(ctx: &RuleContext<'_>) -> Vec<Finding> {
    ctx.index
        .criteria()
        .iter()
        .filter(|site| site.criteria.selects_by_concept() && site.criteria.codeset_id().is_none())
        .map(|site| {
            Finding::of(
                FindingKind::MissingConceptSet,
                format!("{} have no concept set specified", describe(site)),
            )
        })
        .collect()
}
