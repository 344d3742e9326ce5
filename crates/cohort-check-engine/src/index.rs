//! Cross-reference index
//!
//! Built once per check by a single walk over the expression: primary
//! criteria, additional criteria, inclusion rules, censoring criteria and the
//! end strategy, descending into nested groups and correlated criteria.
//! Rules read the index instead of walking the tree themselves.

use crate::fingerprint::Fingerprint;
use crate::location::{Location, PathStep, Section};
use cohort_check_model::{
    CohortExpression, CorrelatedCriteria, Criteria, CriteriaGroup, DemographicCriteria,
    EndStrategy,
};
use indexmap::IndexMap;

/// One codeset reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodesetUsage {
    /// Criterion (or section) holding the reference
    pub location: Location,
    /// Attribute holding the reference, e.g. `CodesetId`
    pub attribute: &'static str,
}

/// A criterion and where it sits
#[derive(Debug, Clone)]
pub struct CriterionSite<'a> {
    pub location: Location,
    /// List or group the criterion is a member of
    pub parent: Location,
    pub criteria: &'a Criteria,
    /// Window and occurrence wrapper, for members of a group
    pub correlated: Option<&'a CorrelatedCriteria>,
    pub fingerprint: Fingerprint,
}

/// A criteria group and where it sits
#[derive(Debug, Clone)]
pub struct GroupSite<'a> {
    pub location: Location,
    pub group: &'a CriteriaGroup,
}

impl GroupSite<'_> {
    /// Root group of additional criteria or of an inclusion rule
    pub fn is_root(&self) -> bool {
        self.location.is_root()
    }
}

/// A demographic criteria entry and where it sits
#[derive(Debug, Clone)]
pub struct DemographicSite<'a> {
    pub location: Location,
    pub demographic: &'a DemographicCriteria,
}

/// Codeset usages, criteria, groups and fingerprints of one expression
#[derive(Debug)]
pub struct CrossReferenceIndex<'a> {
    codeset_usages: IndexMap<i64, Vec<CodesetUsage>>,
    criteria: Vec<CriterionSite<'a>>,
    groups: Vec<GroupSite<'a>>,
    demographics: Vec<DemographicSite<'a>>,
    fingerprints: IndexMap<Fingerprint, Vec<usize>>,
}

impl<'a> CrossReferenceIndex<'a> {
    pub fn build(expression: &'a CohortExpression) -> Self {
        let mut index = Self {
            codeset_usages: IndexMap::new(),
            criteria: Vec::new(),
            groups: Vec::new(),
            demographics: Vec::new(),
            fingerprints: IndexMap::new(),
        };

        let primary = Location::new(Section::PrimaryCriteria);
        for (i, criteria) in expression.primary_criteria.criteria_list.iter().enumerate() {
            index.visit_criteria(primary.child(PathStep::Criterion(i)), &primary, criteria, None);
        }

        if let Some(group) = &expression.additional_criteria {
            index.visit_group(Location::new(Section::AdditionalCriteria), group);
        }

        for (i, rule) in expression.inclusion_rules.iter().enumerate() {
            index.visit_group(Location::inclusion_rule(i, &rule.name), &rule.expression);
        }

        let censoring = Location::new(Section::CensoringCriteria);
        for (i, criteria) in expression.censoring_criteria.iter().enumerate() {
            index.visit_criteria(censoring.child(PathStep::Criterion(i)), &censoring, criteria, None);
        }

        if let Some(EndStrategy::CustomEra(era)) = &expression.end_strategy {
            if let Some(id) = era.drug_codeset_id {
                index.add_usage(id, Location::new(Section::EndStrategy), "DrugCodesetId");
            }
        }

        log::trace!(
            "indexed {} criteria, {} groups, {} referenced concept sets",
            index.criteria.len(),
            index.groups.len(),
            index.codeset_usages.len()
        );
        index
    }

    fn add_usage(&mut self, codeset_id: i64, location: Location, attribute: &'static str) {
        self.codeset_usages
            .entry(codeset_id)
            .or_default()
            .push(CodesetUsage {
                location,
                attribute,
            });
    }

    fn visit_criteria(
        &mut self,
        location: Location,
        parent: &Location,
        criteria: &'a Criteria,
        correlated: Option<&'a CorrelatedCriteria>,
    ) {
        let attributes = criteria.attributes();
        for reference in &attributes.codesets {
            self.add_usage(reference.codeset_id, location.clone(), reference.attribute);
        }

        let fingerprint = Fingerprint::of(criteria);
        self.fingerprints
            .entry(fingerprint.clone())
            .or_default()
            .push(self.criteria.len());
        self.criteria.push(CriterionSite {
            location: location.clone(),
            parent: parent.clone(),
            criteria,
            correlated,
            fingerprint,
        });

        if let Some(group) = attributes.correlated {
            self.visit_group(location.child(PathStep::Correlated), group);
        }
    }

    fn visit_group(&mut self, location: Location, group: &'a CriteriaGroup) {
        self.groups.push(GroupSite {
            location: location.clone(),
            group,
        });

        for (i, correlated) in group.criteria_list.iter().enumerate() {
            self.visit_criteria(
                location.child(PathStep::Criterion(i)),
                &location,
                &correlated.criteria,
                Some(correlated),
            );
        }

        for (i, demographic) in group.demographic_criteria_list.iter().enumerate() {
            let site = location.child(PathStep::Demographic(i));
            for reference in &demographic.attributes().codesets {
                self.add_usage(reference.codeset_id, site.clone(), reference.attribute);
            }
            self.demographics.push(DemographicSite {
                location: site,
                demographic,
            });
        }

        for (i, nested) in group.groups.iter().enumerate() {
            self.visit_group(location.child(PathStep::Group(i)), nested);
        }
    }

    /// References to a concept set, in traversal order
    pub fn usages(&self, codeset_id: i64) -> &[CodesetUsage] {
        self.codeset_usages
            .get(&codeset_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn usage_count(&self, codeset_id: i64) -> usize {
        self.usages(codeset_id).len()
    }

    pub fn is_used(&self, codeset_id: i64) -> bool {
        self.codeset_usages.contains_key(&codeset_id)
    }

    /// Every referenced concept set id with its usages, in first-seen order
    pub fn codeset_usages(&self) -> impl Iterator<Item = (i64, &[CodesetUsage])> {
        self.codeset_usages
            .iter()
            .map(|(id, usages)| (*id, usages.as_slice()))
    }

    /// Every criterion, in traversal order
    pub fn criteria(&self) -> &[CriterionSite<'a>] {
        &self.criteria
    }

    /// Every group, in traversal order
    pub fn groups(&self) -> &[GroupSite<'a>] {
        &self.groups
    }

    pub fn demographics(&self) -> &[DemographicSite<'a>] {
        &self.demographics
    }

    /// Criteria sharing each fingerprint, in first-seen order
    pub fn fingerprints(&self) -> impl Iterator<Item = (&Fingerprint, Vec<&CriterionSite<'a>>)> {
        self.fingerprints
            .iter()
            .map(|(fingerprint, sites)| (fingerprint, sites.iter().map(|&i| &self.criteria[i]).collect()))
    }

    /// Direct members of a group (or criteria list) at `parent`
    pub fn members_of<'s>(&'s self, parent: &'s Location) -> impl Iterator<Item = &'s CriterionSite<'a>> {
        self.criteria.iter().filter(move |site| &site.parent == parent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cohort_check_model::parse;

    const EXPRESSION: &str = r#"{
        "ConceptSets": [{"id": 0, "name": "a"}, {"id": 1, "name": "b"}, {"id": 2, "name": "c"}],
        "PrimaryCriteria": {"CriteriaList": [
            {"ConditionOccurrence": {"CodesetId": 0, "CorrelatedCriteria": {
                "Type": "ALL",
                "CriteriaList": [{"Criteria": {"DrugExposure": {"CodesetId": 1}},
                                  "Occurrence": {"Type": 2, "Count": 1}}]
            }}}
        ]},
        "InclusionRules": [{"name": "r", "expression": {
            "Type": "ANY",
            "CriteriaList": [],
            "Groups": [{"Type": "ALL", "CriteriaList": [
                {"Criteria": {"DrugExposure": {"CodesetId": 1}}, "Occurrence": {"Type": 2, "Count": 1}}
            ]}],
            "DemographicCriteriaList": [{"GenderCS": {"CodesetId": 2, "IsExclusion": false}}]
        }}],
        "EndStrategy": {"CustomEra": {"DrugCodesetId": 1, "GapDays": 30}}
    }"#;

    #[test]
    fn test_usages() {
        let expression = parse(EXPRESSION).unwrap();
        let index = CrossReferenceIndex::build(&expression);

        assert_eq!(index.usage_count(0), 1);
        assert_eq!(index.usage_count(1), 3);
        assert_eq!(index.usage_count(2), 1);
        assert!(!index.is_used(3));

        let end = &index.usages(1)[2];
        assert_eq!(end.location, Location::new(Section::EndStrategy));
        assert_eq!(end.attribute, "DrugCodesetId");
        assert_eq!(index.usages(2)[0].attribute, "GenderCS");
    }

    #[test]
    fn test_traversal_reaches_nested_groups() {
        let expression = parse(EXPRESSION).unwrap();
        let index = CrossReferenceIndex::build(&expression);

        assert_eq!(index.criteria().len(), 3);
        assert_eq!(index.groups().len(), 3);
        assert_eq!(index.demographics().len(), 1);
        assert_eq!(
            index.criteria()[1].location.to_string(),
            "primary criteria > criterion 1 > correlated criteria > criterion 1"
        );
        assert_eq!(
            index.criteria()[2].parent.to_string(),
            "inclusion rule \"r\" > group 1"
        );
    }

    #[test]
    fn test_fingerprints_group_equal_criteria() {
        let expression = parse(EXPRESSION).unwrap();
        let index = CrossReferenceIndex::build(&expression);

        let shared: Vec<_> = index
            .fingerprints()
            .filter(|(_, sites)| sites.len() > 1)
            .collect();
        assert_eq!(shared.len(), 1);
        assert_eq!(shared[0].0.variant(), "DrugExposure");
    }
}
