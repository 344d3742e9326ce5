//! Concept sets: named, reusable sets of vocabulary concepts

use crate::nullable::null_as_default;
use serde::{Deserialize, Serialize};

/// Concept set referenced from criteria by its id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConceptSet {
    /// Identifier, unique within an expression
    pub id: i64,
    /// Display name
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Concept set items
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<ConceptSetExpression>,
}

impl ConceptSet {
    /// Items of this concept set (empty when no expression is given)
    pub fn items(&self) -> &[ConceptSetItem] {
        self.expression
            .as_ref()
            .map(|expression| expression.items.as_slice())
            .unwrap_or_default()
    }

    /// Name and id for use in messages, e.g. `"Diabetes" (id 3)`
    pub fn label(&self) -> String {
        if self.name.is_empty() {
            format!("(id {})", self.id)
        } else {
            format!("\"{}\" (id {})", self.name, self.id)
        }
    }
}

/// Body of a concept set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConceptSetExpression {
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<ConceptSetItem>,
}

/// One concept plus its descendant/mapping/exclusion flags
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConceptSetItem {
    pub concept: Concept,
    pub is_excluded: bool,
    pub include_descendants: bool,
    pub include_mapped: bool,
}

impl ConceptSetItem {
    /// Identity of the item with absent flags read as `false`
    pub fn normalized(&self) -> NormalizedItem {
        NormalizedItem {
            concept_id: self.concept.concept_id,
            is_excluded: self.is_excluded,
            include_descendants: self.include_descendants,
            include_mapped: self.include_mapped,
        }
    }
}

/// Order-comparable identity of a concept set item
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NormalizedItem {
    pub concept_id: Option<i64>,
    pub is_excluded: bool,
    pub include_descendants: bool,
    pub include_mapped: bool,
}

/// Vocabulary concept as embedded in exported expressions
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
pub struct Concept {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concept_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concept_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concept_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concept_class_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vocabulary_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standard_concept: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standard_concept_caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalid_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalid_reason_caption: Option<String>,
}
