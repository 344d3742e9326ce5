//! Structural fingerprints of criteria
//!
//! Two criteria share a fingerprint when they select the same domain with the
//! same resolved attribute values. Field order, array order, `null` values,
//! `false` flags and empty lists do not contribute.

use cohort_check_model::Criteria;
use serde_json::Value;
use std::fmt;

/// Order-independent identity of a criterion
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fingerprint {
    variant: &'static str,
    canonical: String,
}

impl Fingerprint {
    /// Fingerprint of a criterion, nested correlated criteria included
    pub fn of(criteria: &Criteria) -> Self {
        let canonical = match serde_json::to_value(criteria) {
            Ok(value) => canonical_text(&value),
            Err(e) => {
                log::warn!("falling back to debug form for {} fingerprint: {e}", criteria.name());
                format!("{criteria:?}")
            }
        };
        Self {
            variant: criteria.name(),
            canonical,
        }
    }

    pub fn variant(&self) -> &'static str {
        self.variant
    }

    /// Canonical text the fingerprint compares by
    pub fn canonical(&self) -> &str {
        &self.canonical
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

fn is_vacant(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Canonical text of a JSON value: keys sorted, arrays sorted, vacant values dropped
pub fn canonical_text(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, String)> = map
                .iter()
                .filter(|(_, v)| !is_vacant(v))
                .map(|(k, v)| (k, canonical_text(v)))
                .filter(|(_, text)| text != "{}" && text != "[]")
                .collect();
            entries.sort();
            let body: Vec<String> = entries
                .into_iter()
                .map(|(k, text)| format!("{}:{text}", Value::String(k.clone())))
                .collect();
            format!("{{{}}}", body.join(","))
        }
        Value::Array(items) => {
            let mut texts: Vec<String> = items
                .iter()
                .filter(|v| !is_vacant(v))
                .map(canonical_text)
                .collect();
            texts.sort();
            format!("[{}]", texts.join(","))
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn criteria(value: Value) -> Criteria {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_field_order_does_not_matter() {
        let a = criteria(json!({"DrugExposure": {"CodesetId": 1, "First": true,
            "Quantity": {"Value": 2, "Op": "gt"}}}));
        let b = criteria(json!({"DrugExposure": {"Quantity": {"Op": "gt", "Value": 2},
            "First": true, "CodesetId": 1}}));
        assert_eq!(Fingerprint::of(&a), Fingerprint::of(&b));
    }

    #[test]
    fn test_defaults_do_not_matter() {
        let a = criteria(json!({"ConditionOccurrence": {"CodesetId": 1}}));
        let b = criteria(json!({"ConditionOccurrence": {"CodesetId": 1, "First": false,
            "ConditionType": [], "StopReason": null}}));
        assert_eq!(Fingerprint::of(&a), Fingerprint::of(&b));
    }

    #[test]
    fn test_different_domains_differ() {
        let a = criteria(json!({"ConditionOccurrence": {"CodesetId": 1}}));
        let b = criteria(json!({"ConditionEra": {"CodesetId": 1}}));
        assert_ne!(Fingerprint::of(&a), Fingerprint::of(&b));
        assert_eq!(Fingerprint::of(&b).variant(), "ConditionEra");
    }

    #[test]
    fn test_concept_list_order_does_not_matter() {
        let a = criteria(json!({"VisitOccurrence": {"CodesetId": 1,
            "VisitType": [{"CONCEPT_ID": 1}, {"CONCEPT_ID": 2}]}}));
        let b = criteria(json!({"VisitOccurrence": {"CodesetId": 1,
            "VisitType": [{"CONCEPT_ID": 2}, {"CONCEPT_ID": 1}]}}));
        assert_eq!(Fingerprint::of(&a), Fingerprint::of(&b));
    }

    #[test]
    fn test_canonical_text() {
        let value = json!({"b": [3, 1, null], "a": {"x": false, "y": 1}, "c": {}});
        assert_eq!(canonical_text(&value), r#"{"a":{"y":1},"b":[1,3]}"#);
    }
}
