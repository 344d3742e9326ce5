//! Criteria groups, correlated criteria, time windows and occurrence policies

use crate::nullable::null_as_default;
use crate::{Concept, ConceptSetSelection, Criteria, DateRange, NumericRange};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Boolean combination of correlated criteria, demographic criteria and
/// nested groups
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CriteriaGroup {
    #[serde(rename = "Type", skip_serializing_if = "Option::is_none")]
    pub group_type: Option<GroupType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<i64>,
    #[serde(deserialize_with = "null_as_default")]
    pub criteria_list: Vec<CorrelatedCriteria>,
    #[serde(deserialize_with = "null_as_default")]
    pub demographic_criteria_list: Vec<DemographicCriteria>,
    #[serde(deserialize_with = "null_as_default")]
    pub groups: Vec<CriteriaGroup>,
}

impl CriteriaGroup {
    /// A group with no criteria of any kind
    pub fn is_empty(&self) -> bool {
        self.criteria_list.is_empty()
            && self.demographic_criteria_list.is_empty()
            && self.groups.is_empty()
    }

    /// Group type, `ALL` when not given
    pub fn group_type(&self) -> GroupType {
        self.group_type.unwrap_or_default()
    }
}

/// How the members of a group combine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GroupType {
    #[default]
    All,
    Any,
    AtLeast,
    AtMost,
}

impl GroupType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            GroupType::All => "ALL",
            GroupType::Any => "ANY",
            GroupType::AtLeast => "AT_LEAST",
            GroupType::AtMost => "AT_MOST",
        }
    }

    /// Whether the group needs a `Count`
    pub const fn needs_count(&self) -> bool {
        matches!(self, GroupType::AtLeast | GroupType::AtMost)
    }
}

/// A criterion tied to the index event by time windows and an occurrence policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CorrelatedCriteria {
    pub criteria: Criteria,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_window: Option<Window>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_window: Option<Window>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occurrence: Option<Occurrence>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restrict_visit: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_observation_period: Option<bool>,
}

/// Time window relative to the index event
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Window {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<WindowBound>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<WindowBound>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_index_end: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_event_end: Option<bool>,
}

impl Window {
    /// Both window bounds as day offsets from the index event
    pub fn span(&self) -> Option<(DayOffset, DayOffset)> {
        Some((self.start.as_ref()?.offset(), self.end.as_ref()?.offset()))
    }
}

/// One end of a window: `Days` before (`Coeff` -1) or after (`Coeff` 1) the index
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WindowBound {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days: Option<i64>,
    #[serde(default = "WindowBound::default_coeff")]
    pub coeff: i64,
}

impl WindowBound {
    fn default_coeff() -> i64 {
        1
    }

    /// Signed offset from the index event; absent days are unbounded
    pub fn offset(&self) -> DayOffset {
        match self.days {
            Some(days) => DayOffset::Days(days.saturating_mul(self.coeff.signum())),
            None if self.coeff < 0 => DayOffset::AllBefore,
            None => DayOffset::AllAfter,
        }
    }
}

/// Day offset from the index event, ordered along the time axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DayOffset {
    AllBefore,
    Days(i64),
    AllAfter,
}

impl fmt::Display for DayOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayOffset::AllBefore => f.write_str("all days before"),
            DayOffset::AllAfter => f.write_str("all days after"),
            DayOffset::Days(0) => f.write_str("index"),
            DayOffset::Days(days) => {
                let unit = if days.unsigned_abs() == 1 { "day" } else { "days" };
                let side = if *days < 0 { "before" } else { "after" };
                write!(f, "{} {unit} {side}", days.unsigned_abs())
            }
        }
    }
}

/// How many times a correlated criterion must occur
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Occurrence {
    #[serde(rename = "Type")]
    pub occurrence_type: OccurrenceType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_distinct: Option<bool>,
}

impl Occurrence {
    /// At least one event must be found
    pub fn requires_presence(&self) -> bool {
        match (self.occurrence_type, self.count) {
            (OccurrenceType::AtLeast | OccurrenceType::Exactly, Some(count)) => count >= 1,
            _ => false,
        }
    }

    /// No event may be found
    pub fn requires_absence(&self) -> bool {
        matches!(
            (self.occurrence_type, self.count),
            (OccurrenceType::Exactly | OccurrenceType::AtMost, Some(0))
        )
    }
}

/// Occurrence policy; exchanged as numeric code (0, 1, 2) or by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OccurrenceType {
    Exactly,
    AtMost,
    AtLeast,
}

impl OccurrenceType {
    pub const fn code(&self) -> i64 {
        match self {
            OccurrenceType::Exactly => 0,
            OccurrenceType::AtMost => 1,
            OccurrenceType::AtLeast => 2,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            OccurrenceType::Exactly => "EXACTLY",
            OccurrenceType::AtMost => "AT_MOST",
            OccurrenceType::AtLeast => "AT_LEAST",
        }
    }
}

impl fmt::Display for OccurrenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for OccurrenceType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.code())
    }
}

impl<'de> Deserialize<'de> for OccurrenceType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Code(i64),
            Name(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Code(0) => Ok(OccurrenceType::Exactly),
            Raw::Code(1) => Ok(OccurrenceType::AtMost),
            Raw::Code(2) => Ok(OccurrenceType::AtLeast),
            Raw::Code(code) => Err(de::Error::custom(format!(
                "unknown occurrence type {code} (expected 0, 1 or 2)"
            ))),
            Raw::Name(name) => match name.to_ascii_uppercase().as_str() {
                "EXACTLY" => Ok(OccurrenceType::Exactly),
                "AT_MOST" => Ok(OccurrenceType::AtMost),
                "AT_LEAST" => Ok(OccurrenceType::AtLeast),
                _ => Err(de::Error::custom(format!("unknown occurrence type '{name}'"))),
            },
        }
    }
}

/// Person-level constraints inside a group
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DemographicCriteria {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<NumericRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Vec<Concept>>,
    #[serde(rename = "GenderCS", skip_serializing_if = "Option::is_none")]
    pub gender_cs: Option<ConceptSetSelection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub race: Option<Vec<Concept>>,
    #[serde(rename = "RaceCS", skip_serializing_if = "Option::is_none")]
    pub race_cs: Option<ConceptSetSelection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ethnicity: Option<Vec<Concept>>,
    #[serde(rename = "EthnicityCS", skip_serializing_if = "Option::is_none")]
    pub ethnicity_cs: Option<ConceptSetSelection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occurrence_start_date: Option<DateRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occurrence_end_date: Option<DateRange>,
}

impl DemographicCriteria {
    /// No attribute is constrained
    pub fn is_empty(&self) -> bool {
        self.age.is_none()
            && self.gender.as_ref().is_none_or(Vec::is_empty)
            && self.gender_cs.is_none()
            && self.race.as_ref().is_none_or(Vec::is_empty)
            && self.race_cs.is_none()
            && self.ethnicity.as_ref().is_none_or(Vec::is_empty)
            && self.ethnicity_cs.is_none()
            && self.occurrence_start_date.is_none()
            && self.occurrence_end_date.is_none()
    }
}
