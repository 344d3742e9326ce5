//! Cohort expression root and its top-level sections

use crate::nullable::null_as_default;
use crate::range::parse_date;
use crate::{ConceptSet, Criteria, CriteriaGroup};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Root of a cohort expression
///
/// Only `PrimaryCriteria` is required; every other section may be absent
/// or `null`. Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CohortExpression {
    #[serde(default, deserialize_with = "null_as_default")]
    pub concept_sets: Vec<ConceptSet>,
    pub primary_criteria: PrimaryCriteria,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_criteria: Option<CriteriaGroup>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualified_limit: Option<ResultLimit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression_limit: Option<ResultLimit>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub inclusion_rules: Vec<InclusionRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_strategy: Option<EndStrategy>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub censoring_criteria: Vec<Criteria>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collapse_settings: Option<CollapseSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub censor_window: Option<CensorWindow>,
    #[serde(
        rename = "cdmVersionRange",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub cdm_version_range: Option<String>,
}

impl CohortExpression {
    /// Concept set with the given id
    pub fn concept_set(&self, id: i64) -> Option<&ConceptSet> {
        self.concept_sets.iter().find(|set| set.id == id)
    }

    /// Additional criteria, treating an empty root group as absent
    ///
    /// Cohort editors export `{"Type": "ALL", "CriteriaList": [], ...}` when
    /// no additional criteria were defined.
    pub fn additional_criteria(&self) -> Option<&CriteriaGroup> {
        self.additional_criteria
            .as_ref()
            .filter(|group| !group.is_empty())
    }

    /// Limit applied to primary events (`First` when unspecified)
    pub fn primary_limit(&self) -> LimitType {
        self.primary_criteria
            .primary_criteria_limit
            .as_ref()
            .map(ResultLimit::limit_type)
            .unwrap_or_default()
    }
}

/// Entry events of the cohort
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PrimaryCriteria {
    #[serde(default, deserialize_with = "null_as_default")]
    pub criteria_list: Vec<Criteria>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observation_window: Option<ObservationWindow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_criteria_limit: Option<ResultLimit>,
}

/// Continuous observation required around the index event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ObservationWindow {
    pub prior_days: i64,
    pub post_days: i64,
}

/// Which events per person are kept
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ResultLimit {
    #[serde(rename = "Type", skip_serializing_if = "Option::is_none")]
    pub limit_type: Option<LimitType>,
}

impl ResultLimit {
    /// Limit type (`First` when unspecified)
    pub fn limit_type(&self) -> LimitType {
        self.limit_type.unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LimitType {
    #[default]
    #[serde(alias = "first", alias = "FIRST")]
    First,
    #[serde(alias = "all", alias = "ALL")]
    All,
    #[serde(alias = "last", alias = "LAST")]
    Last,
}

/// Named inclusion rule
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InclusionRule {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub expression: CriteriaGroup,
}

/// How cohort exit is determined
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EndStrategy {
    /// Exit a fixed number of days after the event start or end
    DateOffset(DateOffset),
    /// Exit at the end of a continuous drug exposure era
    CustomEra(CustomEra),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DateOffset {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_field: Option<DateField>,
    pub offset: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DateField {
    StartDate,
    EndDate,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CustomEra {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drug_codeset_id: Option<i64>,
    pub gap_days: i64,
    pub offset: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_supply_override: Option<i64>,
}

/// Era collapsing of qualifying events
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CollapseSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collapse_type: Option<String>,
    pub era_pad: i64,
}

/// Calendar window cohort eras are clipped to
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CensorWindow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

impl CensorWindow {
    /// Start and end parsed as dates, when both are present and valid
    pub fn dates(&self) -> Option<(NaiveDate, NaiveDate)> {
        let start = parse_date(self.start_date.as_deref()?)?;
        let end = parse_date(self.end_date.as_deref()?)?;
        Some((start, end))
    }
}
