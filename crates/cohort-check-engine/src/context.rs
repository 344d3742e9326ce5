//! Read-only inputs shared by every rule

use crate::index::CrossReferenceIndex;
use crate::lookup::{ConceptInfo, ConceptLookup};
use cohort_check_model::{CohortExpression, Concept, ConceptSet};

/// What a rule sees: the expression, its index and optional concept metadata
#[derive(Clone, Copy)]
pub struct RuleContext<'a> {
    pub expression: &'a CohortExpression,
    pub index: &'a CrossReferenceIndex<'a>,
    pub lookup: Option<&'a dyn ConceptLookup>,
}

impl<'a> RuleContext<'a> {
    pub fn new(expression: &'a CohortExpression, index: &'a CrossReferenceIndex<'a>) -> Self {
        Self {
            expression,
            index,
            lookup: None,
        }
    }

    pub fn with_lookup(mut self, lookup: &'a dyn ConceptLookup) -> Self {
        self.lookup = Some(lookup);
        self
    }

    pub fn concept_set(&self, id: i64) -> Option<&'a ConceptSet> {
        self.expression.concept_set(id)
    }

    /// Metadata for a concept set item: injected lookup first, then what the
    /// item itself carries
    pub fn concept_info(&self, concept: &Concept) -> Option<ConceptInfo> {
        let looked_up = concept
            .concept_id
            .zip(self.lookup)
            .and_then(|(id, lookup)| lookup.concept(id));
        looked_up.or_else(|| ConceptInfo::from_embedded(concept))
    }
}
