//! Rule implementations, grouped by what they inspect

pub mod concept_sets;
pub mod criteria;
pub mod ranges;
pub mod structure;
pub mod windows;

use crate::index::CriterionSite;

/// `DrugExposure criteria at primary criteria > criterion 1`
pub(crate) fn describe(site: &CriterionSite<'_>) -> String {
    format!("{} criteria at {}", site.criteria.name(), site.location)
}
