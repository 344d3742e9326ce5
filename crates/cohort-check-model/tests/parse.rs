//! Ingestion of complete cohort definitions as exported by cohort editors

use cohort_check_model::{
    Criteria, DayOffset, EndStrategy, GroupType, LimitType, OccurrenceType, ParseError, parse,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

const EXPORT: &str = r#"{
  "cdmVersionRange": ">=5.0.0",
  "PrimaryCriteria": {
    "CriteriaList": [
      {"ConditionOccurrence": {"CodesetId": 0, "ConditionTypeExclude": false}}
    ],
    "ObservationWindow": {"PriorDays": 365, "PostDays": 0},
    "PrimaryCriteriaLimit": {"Type": "All"}
  },
  "ConceptSets": [
    {"id": 0, "name": "Type 2 diabetes", "expression": {"items": [
      {"concept": {"CONCEPT_ID": 201826, "CONCEPT_NAME": "Type 2 diabetes mellitus",
                   "DOMAIN_ID": "Condition", "VOCABULARY_ID": "SNOMED",
                   "CONCEPT_CLASS_ID": "Clinical Finding", "STANDARD_CONCEPT": "S"},
       "isExcluded": false, "includeDescendants": true, "includeMapped": false}
    ]}},
    {"id": 1, "name": "Metformin", "expression": {"items": [
      {"concept": {"CONCEPT_ID": 1503297, "DOMAIN_ID": "Drug", "CONCEPT_CLASS_ID": "Ingredient"},
       "includeDescendants": true}
    ]}}
  ],
  "QualifiedLimit": {"Type": "First"},
  "ExpressionLimit": {"Type": "First"},
  "InclusionRules": [
    {
      "name": "Metformin after diagnosis",
      "description": null,
      "expression": {
        "Type": "ALL",
        "CriteriaList": [
          {
            "Criteria": {"DrugExposure": {"CodesetId": 1, "DrugTypeExclude": false}},
            "StartWindow": {"Start": {"Days": 0, "Coeff": 1}, "End": {"Coeff": 1},
                            "UseEventEnd": false},
            "Occurrence": {"Type": 2, "Count": 1}
          }
        ],
        "DemographicCriteriaList": [],
        "Groups": []
      }
    }
  ],
  "EndStrategy": {"DateOffset": {"DateField": "EndDate", "Offset": 30}},
  "CensoringCriteria": [],
  "CollapseSettings": {"CollapseType": "ERA", "EraPad": 0},
  "CensorWindow": {}
}"#;

#[test]
fn test_parse_full_export() {
    let expression = parse(EXPORT).unwrap();

    assert_eq!(expression.concept_sets.len(), 2);
    assert_eq!(expression.primary_limit(), LimitType::All);
    assert_eq!(expression.inclusion_rules.len(), 1);
    assert!(matches!(
        expression.end_strategy,
        Some(EndStrategy::DateOffset(_))
    ));

    let rule = &expression.inclusion_rules[0];
    assert_eq!(rule.name, "Metformin after diagnosis");
    assert_eq!(rule.expression.group_type(), GroupType::All);

    let correlated = &rule.expression.criteria_list[0];
    assert!(matches!(correlated.criteria, Criteria::DrugExposure(_)));
    let occurrence = correlated.occurrence.as_ref().unwrap();
    assert_eq!(occurrence.occurrence_type, OccurrenceType::AtLeast);
    assert_eq!(
        correlated.start_window.as_ref().unwrap().span(),
        Some((DayOffset::Days(0), DayOffset::AllAfter))
    );
}

#[test]
fn test_reserialized_export_parses_to_same_model() {
    let expression = parse(EXPORT).unwrap();
    let json = serde_json::to_string(&expression).unwrap();
    assert_eq!(parse(&json).unwrap(), expression);
}

#[rstest]
#[case::not_json("not json", "PARSE_ERROR")]
#[case::truncated(r#"{"PrimaryCriteria": {"CriteriaList": ["#, "PARSE_ERROR")]
#[case::array_root("[]", "VALIDATION_ERROR")]
#[case::no_primary(r#"{"ConceptSets": []}"#, "VALIDATION_ERROR")]
#[case::null_primary(r#"{"PrimaryCriteria": null}"#, "VALIDATION_ERROR")]
#[case::unknown_domain(
    r#"{"PrimaryCriteria": {"CriteriaList": [{"Imaging": {"CodesetId": 0}}]}}"#,
    "VALIDATION_ERROR"
)]
#[case::bad_occurrence_code(
    r#"{"PrimaryCriteria": {"CriteriaList": []}, "AdditionalCriteria":
        {"CriteriaList": [{"Criteria": {"Death": {}}, "Occurrence": {"Type": 7}}]}}"#,
    "VALIDATION_ERROR"
)]
fn test_ingestion_failures(#[case] input: &str, #[case] kind: &str) {
    let error: ParseError = parse(input).unwrap_err();
    let finding = error.to_finding();
    assert_eq!(finding.kind.as_str(), kind);
    assert!(finding.is_error());
}

#[test]
fn test_null_sections_are_empty() {
    let expression = parse(
        r#"{"ConceptSets": null, "PrimaryCriteria": {"CriteriaList": null},
            "InclusionRules": null, "CensoringCriteria": null, "EndStrategy": null}"#,
    )
    .unwrap();
    assert!(expression.concept_sets.is_empty());
    assert!(expression.primary_criteria.criteria_list.is_empty());
    assert!(expression.end_strategy.is_none());
    assert_eq!(expression.primary_limit(), LimitType::First);
}
