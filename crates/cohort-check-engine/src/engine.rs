//! Checker
//!
//! The [`Checker`] runs the rule catalog against an expression. It builds the
//! cross-reference index once per call, runs every rule, applies the severity
//! policy and concatenates the results in catalog order.

use std::sync::Arc;

use crate::context::RuleContext;
use crate::index::CrossReferenceIndex;
use crate::lookup::ConceptLookup;
use crate::registry::{Rule, catalog};
use cohort_check_diagnostics::{Finding, SeverityPolicy};
use cohort_check_model::CohortExpression;

/// Runs the rule catalog
#[derive(Clone, Default)]
pub struct Checker {
    /// Concept metadata for the domain checks
    lookup: Option<Arc<dyn ConceptLookup>>,
    /// Severity overrides
    policy: SeverityPolicy,
    /// Evaluate rules on the rayon pool (needs the `parallel` feature)
    parallel: bool,
}

impl Checker {
    /// Create a checker with default severities and no concept lookup
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `lookup` for concept metadata before the metadata embedded in
    /// concept set items
    pub fn with_lookup(mut self, lookup: Arc<dyn ConceptLookup>) -> Self {
        self.lookup = Some(lookup);
        self
    }

    /// Override rule severities
    pub fn with_policy(mut self, policy: SeverityPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Evaluate rules concurrently; output order is unchanged
    ///
    /// Without the `parallel` feature rules always run sequentially.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn policy(&self) -> &SeverityPolicy {
        &self.policy
    }

    /// Check an expression and return findings in catalog order
    pub fn check(&self, expression: &CohortExpression) -> Vec<Finding> {
        let index = CrossReferenceIndex::build(expression);
        let mut ctx = RuleContext::new(expression, &index);
        if let Some(lookup) = &self.lookup {
            ctx = ctx.with_lookup(lookup.as_ref());
        }

        let per_rule = self.run_rules(&ctx);
        per_rule
            .into_iter()
            .flatten()
            .map(|finding| self.policy.apply(finding))
            .collect()
    }

    #[cfg(feature = "parallel")]
    fn run_rules(&self, ctx: &RuleContext<'_>) -> Vec<Vec<Finding>> {
        use rayon::prelude::*;

        if self.parallel {
            catalog().par_iter().map(|rule| run_rule(rule, ctx)).collect()
        } else {
            catalog().iter().map(|rule| run_rule(rule, ctx)).collect()
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn run_rules(&self, ctx: &RuleContext<'_>) -> Vec<Vec<Finding>> {
        if self.parallel {
            log::debug!("parallel checking requested but the `parallel` feature is disabled");
        }
        catalog().iter().map(|rule| run_rule(rule, ctx)).collect()
    }
}

impl std::fmt::Debug for Checker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Checker")
            .field("lookup", &self.lookup.is_some())
            .field("policy", &self.policy)
            .field("parallel", &self.parallel)
            .finish()
    }
}

fn run_rule(rule: &Rule, ctx: &RuleContext<'_>) -> Vec<Finding> {
    let findings = rule.run(ctx);
    log::debug!("rule '{}' produced {} finding(s)", rule.name, findings.len());
    findings
}

/// Check an expression with default severities and embedded concept metadata
pub fn validate(expression: &CohortExpression) -> Vec<Finding> {
    Checker::new().check(expression)
}

/// Check an expression using `lookup` for concept metadata
pub fn validate_with(expression: &CohortExpression, lookup: &dyn ConceptLookup) -> Vec<Finding> {
    let index = CrossReferenceIndex::build(expression);
    let ctx = RuleContext::new(expression, &index).with_lookup(lookup);
    catalog()
        .iter()
        .flat_map(|rule| run_rule(rule, &ctx))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cohort_check_diagnostics::{FindingKind, Severity};
    use cohort_check_model::parse;

    const UNUSED_AND_OPEN: &str = r#"{
        "ConceptSets": [{"id": 7, "name": "Unused", "expression": {"items": [{"concept": {"CONCEPT_ID": 1}}]}}],
        "PrimaryCriteria": {"CriteriaList": [{"Death": {}}], "PrimaryCriteriaLimit": {"Type": "All"}}
    }"#;

    #[test]
    fn test_catalog_order() {
        let expression = parse(UNUSED_AND_OPEN).unwrap();
        let kinds: Vec<FindingKind> = validate(&expression).iter().map(|f| f.kind).collect();
        assert_eq!(
            kinds,
            vec![FindingKind::UnusedConceptSet, FindingKind::MissingExitCriteria]
        );
    }

    #[test]
    fn test_policy_is_applied() {
        let expression = parse(UNUSED_AND_OPEN).unwrap();
        let policy = SeverityPolicy::new()
            .with_override(FindingKind::UnusedConceptSet, Severity::Error)
            .unwrap();
        let findings = Checker::new().with_policy(policy).check(&expression);
        assert_eq!(findings[0].severity, Severity::Error);
        assert_eq!(findings[1].severity, Severity::Warning);
    }

    #[test]
    fn test_parallel_flag_keeps_order() {
        let expression = parse(UNUSED_AND_OPEN).unwrap();
        assert_eq!(
            Checker::new().with_parallel(true).check(&expression),
            validate(&expression)
        );
    }
}
