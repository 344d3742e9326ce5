//! Rule catalog
//!
//! Every check is a plain function from a [`RuleContext`] to findings. The
//! catalog fixes the order in which their output is concatenated.

use crate::context::RuleContext;
use crate::rules::{concept_sets, criteria, ranges, structure, windows};
use cohort_check_diagnostics::{Finding, FindingKind};
use indexmap::IndexSet;

/// Signature of a rule implementation
pub type RuleFn = fn(&RuleContext<'_>) -> Vec<Finding>;

/// A named check producing findings of one kind
#[derive(Clone, Copy)]
pub struct Rule {
    pub kind: FindingKind,
    pub name: &'static str,
    check: RuleFn,
}

impl Rule {
    pub const fn new(kind: FindingKind, name: &'static str, check: RuleFn) -> Self {
        Self { kind, name, check }
    }

    /// Run the rule, dropping repeated findings from its own output
    pub fn run(&self, ctx: &RuleContext<'_>) -> Vec<Finding> {
        let findings: IndexSet<Finding> = (self.check)(ctx).into_iter().collect();
        debug_assert!(
            findings.iter().all(|f| f.kind == self.kind),
            "rule {} emitted a finding of another kind",
            self.name
        );
        findings.into_iter().collect()
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .finish()
    }
}

static CATALOG: [Rule; 16] = [
    Rule::new(FindingKind::UnusedConceptSet, "unused concept set", concept_sets::unused),
    Rule::new(FindingKind::DuplicateConceptSet, "duplicate concept sets", concept_sets::duplicates),
    Rule::new(FindingKind::DuplicateCriteria, "duplicate criteria", criteria::duplicates),
    Rule::new(
        FindingKind::ConceptSetDuplicateItems,
        "concept set item duplicates",
        concept_sets::duplicate_items,
    ),
    Rule::new(FindingKind::DomainTypeMismatch, "domain/type mismatch", criteria::domain_mismatch),
    Rule::new(FindingKind::EmptyValue, "empty required value", ranges::empty_values),
    Rule::new(FindingKind::ContradictoryRange, "contradictory range", ranges::contradictory),
    Rule::new(
        FindingKind::MissingRequiredSection,
        "missing required section",
        structure::missing_sections,
    ),
    Rule::new(FindingKind::MissingExitCriteria, "missing exit criteria", structure::missing_exit),
    Rule::new(
        FindingKind::TimeWindowInconsistency,
        "time window inconsistency",
        windows::inconsistent,
    ),
    Rule::new(FindingKind::EventsProgression, "events progression", windows::progression),
    Rule::new(FindingKind::UnknownConceptSet, "unknown concept set", concept_sets::unknown),
    Rule::new(FindingKind::EmptyConceptSet, "empty concept set", concept_sets::empty),
    Rule::new(FindingKind::MissingConceptSet, "missing concept set", concept_sets::missing),
    Rule::new(FindingKind::ExitCriteriaOffset, "exit criteria offset", structure::exit_offset),
    Rule::new(
        FindingKind::ContradictoryCriteria,
        "contradictory criteria",
        criteria::contradictions,
    ),
];

/// All rules in output order
pub fn catalog() -> &'static [Rule] {
    &CATALOG
}

/// Rule producing findings of `kind`
pub fn rule(kind: FindingKind) -> Option<&'static Rule> {
    CATALOG.iter().find(|rule| rule.kind == kind)
}
