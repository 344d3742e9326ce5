//! Domain criteria
//!
//! `Criteria` is a closed variant over the observation domains a cohort
//! expression can select from. In JSON each criterion is an object with a
//! single key naming the domain:
//!
//! ```json
//! {"ConditionOccurrence": {"CodesetId": 0, "First": true}}
//! ```
//!
//! Generic inspection goes through [`Criteria::attributes`], which exposes
//! every codeset reference, range and text filter of a criterion without the
//! caller having to know the variant.

use crate::{
    Concept, ConceptSetSelection, CriteriaGroup, DateRange, DemographicCriteria, NumericRange,
    TextFilter,
};
use serde::{Deserialize, Serialize};

/// A domain-specific criterion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Criteria {
    ConditionOccurrence(ConditionOccurrence),
    ConditionEra(ConditionEra),
    Death(Death),
    DeviceExposure(DeviceExposure),
    DoseEra(DoseEra),
    DrugEra(DrugEra),
    DrugExposure(DrugExposure),
    LocationRegion(LocationRegion),
    Measurement(Measurement),
    Observation(Observation),
    ObservationPeriod(ObservationPeriod),
    PayerPlanPeriod(PayerPlanPeriod),
    ProcedureOccurrence(ProcedureOccurrence),
    Specimen(Specimen),
    VisitOccurrence(VisitOccurrence),
    VisitDetail(VisitDetail),
}

impl Criteria {
    /// Variant name as written in expressions
    pub const fn name(&self) -> &'static str {
        match self {
            Criteria::ConditionOccurrence(_) => "ConditionOccurrence",
            Criteria::ConditionEra(_) => "ConditionEra",
            Criteria::Death(_) => "Death",
            Criteria::DeviceExposure(_) => "DeviceExposure",
            Criteria::DoseEra(_) => "DoseEra",
            Criteria::DrugEra(_) => "DrugEra",
            Criteria::DrugExposure(_) => "DrugExposure",
            Criteria::LocationRegion(_) => "LocationRegion",
            Criteria::Measurement(_) => "Measurement",
            Criteria::Observation(_) => "Observation",
            Criteria::ObservationPeriod(_) => "ObservationPeriod",
            Criteria::PayerPlanPeriod(_) => "PayerPlanPeriod",
            Criteria::ProcedureOccurrence(_) => "ProcedureOccurrence",
            Criteria::Specimen(_) => "Specimen",
            Criteria::VisitOccurrence(_) => "VisitOccurrence",
            Criteria::VisitDetail(_) => "VisitDetail",
        }
    }

    /// Vocabulary domain the criterion's concept set is expected to draw from
    pub const fn domain(&self) -> Option<&'static str> {
        match self {
            Criteria::ConditionOccurrence(_) | Criteria::ConditionEra(_) => Some("Condition"),
            Criteria::DrugExposure(_) | Criteria::DrugEra(_) | Criteria::DoseEra(_) => Some("Drug"),
            Criteria::DeviceExposure(_) => Some("Device"),
            Criteria::Measurement(_) => Some("Measurement"),
            Criteria::Observation(_) => Some("Observation"),
            Criteria::ProcedureOccurrence(_) => Some("Procedure"),
            Criteria::Specimen(_) => Some("Specimen"),
            Criteria::VisitOccurrence(_) | Criteria::VisitDetail(_) => Some("Visit"),
            Criteria::Death(_)
            | Criteria::LocationRegion(_)
            | Criteria::ObservationPeriod(_)
            | Criteria::PayerPlanPeriod(_) => None,
        }
    }

    /// Whether the criterion is meant to select events by a concept set
    ///
    /// Death, observation periods and payer plan periods are commonly used
    /// without one.
    pub const fn selects_by_concept(&self) -> bool {
        !matches!(
            self,
            Criteria::Death(_) | Criteria::ObservationPeriod(_) | Criteria::PayerPlanPeriod(_)
        )
    }

    /// Era criteria are built from ingredient-level drug concepts
    pub const fn expects_ingredients(&self) -> bool {
        matches!(self, Criteria::DrugEra(_) | Criteria::DoseEra(_))
    }

    /// Main concept set of the criterion
    pub fn codeset_id(&self) -> Option<i64> {
        self.attributes().codeset_id
    }

    /// Nested correlated criteria of the criterion
    pub fn correlated_criteria(&self) -> Option<&CriteriaGroup> {
        self.attributes().correlated
    }

    /// Codeset references, ranges and filters of the criterion
    pub fn attributes(&self) -> Attributes<'_> {
        match self {
            Criteria::ConditionOccurrence(c) => c.attributes(),
            Criteria::ConditionEra(c) => c.attributes(),
            Criteria::Death(c) => c.attributes(),
            Criteria::DeviceExposure(c) => c.attributes(),
            Criteria::DoseEra(c) => c.attributes(),
            Criteria::DrugEra(c) => c.attributes(),
            Criteria::DrugExposure(c) => c.attributes(),
            Criteria::LocationRegion(c) => c.attributes(),
            Criteria::Measurement(c) => c.attributes(),
            Criteria::Observation(c) => c.attributes(),
            Criteria::ObservationPeriod(c) => c.attributes(),
            Criteria::PayerPlanPeriod(c) => c.attributes(),
            Criteria::ProcedureOccurrence(c) => c.attributes(),
            Criteria::Specimen(c) => c.attributes(),
            Criteria::VisitOccurrence(c) => c.attributes(),
            Criteria::VisitDetail(c) => c.attributes(),
        }
    }
}

// ============================================================================
// Attribute view
// ============================================================================

/// A codeset id found in an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CodesetRef {
    /// Attribute holding the reference, e.g. `CodesetId`
    pub attribute: &'static str,
    pub codeset_id: i64,
}

/// Flattened view over the attributes of a criterion
#[derive(Debug, Clone, Default)]
pub struct Attributes<'a> {
    /// `CodesetId`, when the variant has one and it is set
    pub codeset_id: Option<i64>,
    /// Every codeset reference, `CodesetId` included
    pub codesets: Vec<CodesetRef>,
    pub dates: Vec<(&'static str, &'a DateRange)>,
    pub numbers: Vec<(&'static str, &'a NumericRange)>,
    pub texts: Vec<(&'static str, &'a TextFilter)>,
    pub correlated: Option<&'a CriteriaGroup>,
}

impl<'a> Attributes<'a> {
    fn main_codeset(mut self, id: Option<i64>) -> Self {
        self.codeset_id = id;
        self.codeset("CodesetId", id)
    }

    fn codeset(mut self, attribute: &'static str, id: Option<i64>) -> Self {
        if let Some(codeset_id) = id {
            self.codesets.push(CodesetRef {
                attribute,
                codeset_id,
            });
        }
        self
    }

    fn selection(self, attribute: &'static str, selection: &Option<ConceptSetSelection>) -> Self {
        let id = selection.as_ref().and_then(|s| s.codeset_id);
        self.codeset(attribute, id)
    }

    fn date(mut self, attribute: &'static str, range: &'a Option<DateRange>) -> Self {
        if let Some(range) = range {
            self.dates.push((attribute, range));
        }
        self
    }

    fn number(mut self, attribute: &'static str, range: &'a Option<NumericRange>) -> Self {
        if let Some(range) = range {
            self.numbers.push((attribute, range));
        }
        self
    }

    fn text(mut self, attribute: &'static str, filter: &'a Option<TextFilter>) -> Self {
        if let Some(filter) = filter {
            self.texts.push((attribute, filter));
        }
        self
    }

    fn correlated(mut self, group: &'a Option<CriteriaGroup>) -> Self {
        self.correlated = group.as_ref();
        self
    }
}

impl DemographicCriteria {
    /// Codeset references and ranges of the demographic constraint
    pub fn attributes(&self) -> Attributes<'_> {
        Attributes::default()
            .selection("GenderCS", &self.gender_cs)
            .selection("RaceCS", &self.race_cs)
            .selection("EthnicityCS", &self.ethnicity_cs)
            .number("Age", &self.age)
            .date("OccurrenceStartDate", &self.occurrence_start_date)
            .date("OccurrenceEndDate", &self.occurrence_end_date)
    }
}

// ============================================================================
// Domain criteria
// ============================================================================

/// Condition occurrence
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ConditionOccurrence {
    pub codeset_id: Option<i64>,
    pub first: Option<bool>,
    pub occurrence_start_date: Option<DateRange>,
    pub occurrence_end_date: Option<DateRange>,
    pub condition_type: Option<Vec<Concept>>,
    pub condition_type_exclude: Option<bool>,
    #[serde(rename = "ConditionTypeCS")]
    pub condition_type_cs: Option<ConceptSetSelection>,
    pub stop_reason: Option<TextFilter>,
    pub condition_source_concept: Option<i64>,
    pub condition_status: Option<Vec<Concept>>,
    #[serde(rename = "ConditionStatusCS")]
    pub condition_status_cs: Option<ConceptSetSelection>,
    pub age: Option<NumericRange>,
    pub gender: Option<Vec<Concept>>,
    #[serde(rename = "GenderCS")]
    pub gender_cs: Option<ConceptSetSelection>,
    pub provider_specialty: Option<Vec<Concept>>,
    #[serde(rename = "ProviderSpecialtyCS")]
    pub provider_specialty_cs: Option<ConceptSetSelection>,
    pub visit_type: Option<Vec<Concept>>,
    #[serde(rename = "VisitTypeCS")]
    pub visit_type_cs: Option<ConceptSetSelection>,
    pub correlated_criteria: Option<CriteriaGroup>,
}

impl ConditionOccurrence {
    fn attributes(&self) -> Attributes<'_> {
        Attributes::default()
            .main_codeset(self.codeset_id)
            .codeset("ConditionSourceConcept", self.condition_source_concept)
            .selection("ConditionTypeCS", &self.condition_type_cs)
            .selection("ConditionStatusCS", &self.condition_status_cs)
            .selection("GenderCS", &self.gender_cs)
            .selection("ProviderSpecialtyCS", &self.provider_specialty_cs)
            .selection("VisitTypeCS", &self.visit_type_cs)
            .date("OccurrenceStartDate", &self.occurrence_start_date)
            .date("OccurrenceEndDate", &self.occurrence_end_date)
            .number("Age", &self.age)
            .text("StopReason", &self.stop_reason)
            .correlated(&self.correlated_criteria)
    }
}

/// Condition era
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ConditionEra {
    pub codeset_id: Option<i64>,
    pub first: Option<bool>,
    pub era_start_date: Option<DateRange>,
    pub era_end_date: Option<DateRange>,
    pub occurrence_count: Option<NumericRange>,
    pub era_length: Option<NumericRange>,
    pub age_at_start: Option<NumericRange>,
    pub age_at_end: Option<NumericRange>,
    pub gender: Option<Vec<Concept>>,
    #[serde(rename = "GenderCS")]
    pub gender_cs: Option<ConceptSetSelection>,
    pub correlated_criteria: Option<CriteriaGroup>,
}

impl ConditionEra {
    fn attributes(&self) -> Attributes<'_> {
        Attributes::default()
            .main_codeset(self.codeset_id)
            .selection("GenderCS", &self.gender_cs)
            .date("EraStartDate", &self.era_start_date)
            .date("EraEndDate", &self.era_end_date)
            .number("OccurrenceCount", &self.occurrence_count)
            .number("EraLength", &self.era_length)
            .number("AgeAtStart", &self.age_at_start)
            .number("AgeAtEnd", &self.age_at_end)
            .correlated(&self.correlated_criteria)
    }
}

/// Death
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Death {
    pub codeset_id: Option<i64>,
    pub occurrence_start_date: Option<DateRange>,
    pub death_type: Option<Vec<Concept>>,
    pub death_type_exclude: Option<bool>,
    #[serde(rename = "DeathTypeCS")]
    pub death_type_cs: Option<ConceptSetSelection>,
    pub death_source_concept: Option<i64>,
    pub age: Option<NumericRange>,
    pub gender: Option<Vec<Concept>>,
    #[serde(rename = "GenderCS")]
    pub gender_cs: Option<ConceptSetSelection>,
    pub correlated_criteria: Option<CriteriaGroup>,
}

impl Death {
    fn attributes(&self) -> Attributes<'_> {
        Attributes::default()
            .main_codeset(self.codeset_id)
            .codeset("DeathSourceConcept", self.death_source_concept)
            .selection("DeathTypeCS", &self.death_type_cs)
            .selection("GenderCS", &self.gender_cs)
            .date("OccurrenceStartDate", &self.occurrence_start_date)
            .number("Age", &self.age)
            .correlated(&self.correlated_criteria)
    }
}

/// Device exposure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DeviceExposure {
    pub codeset_id: Option<i64>,
    pub first: Option<bool>,
    pub occurrence_start_date: Option<DateRange>,
    pub occurrence_end_date: Option<DateRange>,
    pub device_type: Option<Vec<Concept>>,
    pub device_type_exclude: Option<bool>,
    #[serde(rename = "DeviceTypeCS")]
    pub device_type_cs: Option<ConceptSetSelection>,
    pub unique_device_id: Option<TextFilter>,
    pub quantity: Option<NumericRange>,
    pub device_source_concept: Option<i64>,
    pub age: Option<NumericRange>,
    pub gender: Option<Vec<Concept>>,
    #[serde(rename = "GenderCS")]
    pub gender_cs: Option<ConceptSetSelection>,
    pub provider_specialty: Option<Vec<Concept>>,
    #[serde(rename = "ProviderSpecialtyCS")]
    pub provider_specialty_cs: Option<ConceptSetSelection>,
    pub visit_type: Option<Vec<Concept>>,
    #[serde(rename = "VisitTypeCS")]
    pub visit_type_cs: Option<ConceptSetSelection>,
    pub correlated_criteria: Option<CriteriaGroup>,
}

impl DeviceExposure {
    fn attributes(&self) -> Attributes<'_> {
        Attributes::default()
            .main_codeset(self.codeset_id)
            .codeset("DeviceSourceConcept", self.device_source_concept)
            .selection("DeviceTypeCS", &self.device_type_cs)
            .selection("GenderCS", &self.gender_cs)
            .selection("ProviderSpecialtyCS", &self.provider_specialty_cs)
            .selection("VisitTypeCS", &self.visit_type_cs)
            .date("OccurrenceStartDate", &self.occurrence_start_date)
            .date("OccurrenceEndDate", &self.occurrence_end_date)
            .number("Quantity", &self.quantity)
            .number("Age", &self.age)
            .text("UniqueDeviceId", &self.unique_device_id)
            .correlated(&self.correlated_criteria)
    }
}

/// Dose era
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DoseEra {
    pub codeset_id: Option<i64>,
    pub first: Option<bool>,
    pub era_start_date: Option<DateRange>,
    pub era_end_date: Option<DateRange>,
    pub unit: Option<Vec<Concept>>,
    #[serde(rename = "UnitCS")]
    pub unit_cs: Option<ConceptSetSelection>,
    pub dose_value: Option<NumericRange>,
    pub era_length: Option<NumericRange>,
    pub age_at_start: Option<NumericRange>,
    pub age_at_end: Option<NumericRange>,
    pub gender: Option<Vec<Concept>>,
    #[serde(rename = "GenderCS")]
    pub gender_cs: Option<ConceptSetSelection>,
    pub correlated_criteria: Option<CriteriaGroup>,
}

impl DoseEra {
    fn attributes(&self) -> Attributes<'_> {
        Attributes::default()
            .main_codeset(self.codeset_id)
            .selection("UnitCS", &self.unit_cs)
            .selection("GenderCS", &self.gender_cs)
            .date("EraStartDate", &self.era_start_date)
            .date("EraEndDate", &self.era_end_date)
            .number("DoseValue", &self.dose_value)
            .number("EraLength", &self.era_length)
            .number("AgeAtStart", &self.age_at_start)
            .number("AgeAtEnd", &self.age_at_end)
            .correlated(&self.correlated_criteria)
    }
}

/// Drug era
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DrugEra {
    pub codeset_id: Option<i64>,
    pub first: Option<bool>,
    pub era_start_date: Option<DateRange>,
    pub era_end_date: Option<DateRange>,
    pub occurrence_count: Option<NumericRange>,
    pub gap_days: Option<NumericRange>,
    pub era_length: Option<NumericRange>,
    pub age_at_start: Option<NumericRange>,
    pub age_at_end: Option<NumericRange>,
    pub gender: Option<Vec<Concept>>,
    #[serde(rename = "GenderCS")]
    pub gender_cs: Option<ConceptSetSelection>,
    pub correlated_criteria: Option<CriteriaGroup>,
}

impl DrugEra {
    fn attributes(&self) -> Attributes<'_> {
        Attributes::default()
            .main_codeset(self.codeset_id)
            .selection("GenderCS", &self.gender_cs)
            .date("EraStartDate", &self.era_start_date)
            .date("EraEndDate", &self.era_end_date)
            .number("OccurrenceCount", &self.occurrence_count)
            .number("GapDays", &self.gap_days)
            .number("EraLength", &self.era_length)
            .number("AgeAtStart", &self.age_at_start)
            .number("AgeAtEnd", &self.age_at_end)
            .correlated(&self.correlated_criteria)
    }
}

/// Drug exposure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DrugExposure {
    pub codeset_id: Option<i64>,
    pub first: Option<bool>,
    pub occurrence_start_date: Option<DateRange>,
    pub occurrence_end_date: Option<DateRange>,
    pub drug_type: Option<Vec<Concept>>,
    pub drug_type_exclude: Option<bool>,
    #[serde(rename = "DrugTypeCS")]
    pub drug_type_cs: Option<ConceptSetSelection>,
    pub stop_reason: Option<TextFilter>,
    pub refills: Option<NumericRange>,
    pub quantity: Option<NumericRange>,
    pub days_supply: Option<NumericRange>,
    pub route_concept: Option<Vec<Concept>>,
    #[serde(rename = "RouteConceptCS")]
    pub route_concept_cs: Option<ConceptSetSelection>,
    pub effective_drug_dose: Option<NumericRange>,
    pub dose_unit: Option<Vec<Concept>>,
    #[serde(rename = "DoseUnitCS")]
    pub dose_unit_cs: Option<ConceptSetSelection>,
    pub lot_number: Option<TextFilter>,
    pub drug_source_concept: Option<i64>,
    pub age: Option<NumericRange>,
    pub gender: Option<Vec<Concept>>,
    #[serde(rename = "GenderCS")]
    pub gender_cs: Option<ConceptSetSelection>,
    pub provider_specialty: Option<Vec<Concept>>,
    #[serde(rename = "ProviderSpecialtyCS")]
    pub provider_specialty_cs: Option<ConceptSetSelection>,
    pub visit_type: Option<Vec<Concept>>,
    #[serde(rename = "VisitTypeCS")]
    pub visit_type_cs: Option<ConceptSetSelection>,
    pub correlated_criteria: Option<CriteriaGroup>,
}

impl DrugExposure {
    fn attributes(&self) -> Attributes<'_> {
        Attributes::default()
            .main_codeset(self.codeset_id)
            .codeset("DrugSourceConcept", self.drug_source_concept)
            .selection("DrugTypeCS", &self.drug_type_cs)
            .selection("RouteConceptCS", &self.route_concept_cs)
            .selection("DoseUnitCS", &self.dose_unit_cs)
            .selection("GenderCS", &self.gender_cs)
            .selection("ProviderSpecialtyCS", &self.provider_specialty_cs)
            .selection("VisitTypeCS", &self.visit_type_cs)
            .date("OccurrenceStartDate", &self.occurrence_start_date)
            .date("OccurrenceEndDate", &self.occurrence_end_date)
            .number("Refills", &self.refills)
            .number("Quantity", &self.quantity)
            .number("DaysSupply", &self.days_supply)
            .number("EffectiveDrugDose", &self.effective_drug_dose)
            .number("Age", &self.age)
            .text("StopReason", &self.stop_reason)
            .text("LotNumber", &self.lot_number)
            .correlated(&self.correlated_criteria)
    }
}

/// Location region
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct LocationRegion {
    pub codeset_id: Option<i64>,
    pub start_date: Option<DateRange>,
    pub end_date: Option<DateRange>,
    pub correlated_criteria: Option<CriteriaGroup>,
}

impl LocationRegion {
    fn attributes(&self) -> Attributes<'_> {
        Attributes::default()
            .main_codeset(self.codeset_id)
            .date("StartDate", &self.start_date)
            .date("EndDate", &self.end_date)
            .correlated(&self.correlated_criteria)
    }
}

/// Measurement
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Measurement {
    pub codeset_id: Option<i64>,
    pub first: Option<bool>,
    pub occurrence_start_date: Option<DateRange>,
    pub measurement_type: Option<Vec<Concept>>,
    pub measurement_type_exclude: Option<bool>,
    #[serde(rename = "MeasurementTypeCS")]
    pub measurement_type_cs: Option<ConceptSetSelection>,
    pub operator: Option<Vec<Concept>>,
    #[serde(rename = "OperatorCS")]
    pub operator_cs: Option<ConceptSetSelection>,
    pub value_as_number: Option<NumericRange>,
    pub value_as_concept: Option<Vec<Concept>>,
    #[serde(rename = "ValueAsConceptCS")]
    pub value_as_concept_cs: Option<ConceptSetSelection>,
    pub unit: Option<Vec<Concept>>,
    #[serde(rename = "UnitCS")]
    pub unit_cs: Option<ConceptSetSelection>,
    pub range_low: Option<NumericRange>,
    pub range_high: Option<NumericRange>,
    pub range_low_ratio: Option<NumericRange>,
    pub range_high_ratio: Option<NumericRange>,
    pub abnormal: Option<bool>,
    pub measurement_source_concept: Option<i64>,
    pub age: Option<NumericRange>,
    pub gender: Option<Vec<Concept>>,
    #[serde(rename = "GenderCS")]
    pub gender_cs: Option<ConceptSetSelection>,
    pub provider_specialty: Option<Vec<Concept>>,
    #[serde(rename = "ProviderSpecialtyCS")]
    pub provider_specialty_cs: Option<ConceptSetSelection>,
    pub visit_type: Option<Vec<Concept>>,
    #[serde(rename = "VisitTypeCS")]
    pub visit_type_cs: Option<ConceptSetSelection>,
    pub correlated_criteria: Option<CriteriaGroup>,
}

impl Measurement {
    fn attributes(&self) -> Attributes<'_> {
        Attributes::default()
            .main_codeset(self.codeset_id)
            .codeset("MeasurementSourceConcept", self.measurement_source_concept)
            .selection("MeasurementTypeCS", &self.measurement_type_cs)
            .selection("OperatorCS", &self.operator_cs)
            .selection("ValueAsConceptCS", &self.value_as_concept_cs)
            .selection("UnitCS", &self.unit_cs)
            .selection("GenderCS", &self.gender_cs)
            .selection("ProviderSpecialtyCS", &self.provider_specialty_cs)
            .selection("VisitTypeCS", &self.visit_type_cs)
            .date("OccurrenceStartDate", &self.occurrence_start_date)
            .number("ValueAsNumber", &self.value_as_number)
            .number("RangeLow", &self.range_low)
            .number("RangeHigh", &self.range_high)
            .number("RangeLowRatio", &self.range_low_ratio)
            .number("RangeHighRatio", &self.range_high_ratio)
            .number("Age", &self.age)
            .correlated(&self.correlated_criteria)
    }
}

/// Observation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Observation {
    pub codeset_id: Option<i64>,
    pub first: Option<bool>,
    pub occurrence_start_date: Option<DateRange>,
    pub observation_type: Option<Vec<Concept>>,
    pub observation_type_exclude: Option<bool>,
    #[serde(rename = "ObservationTypeCS")]
    pub observation_type_cs: Option<ConceptSetSelection>,
    pub value_as_number: Option<NumericRange>,
    pub value_as_string: Option<TextFilter>,
    pub value_as_concept: Option<Vec<Concept>>,
    #[serde(rename = "ValueAsConceptCS")]
    pub value_as_concept_cs: Option<ConceptSetSelection>,
    pub qualifier: Option<Vec<Concept>>,
    #[serde(rename = "QualifierCS")]
    pub qualifier_cs: Option<ConceptSetSelection>,
    pub unit: Option<Vec<Concept>>,
    #[serde(rename = "UnitCS")]
    pub unit_cs: Option<ConceptSetSelection>,
    pub observation_source_concept: Option<i64>,
    pub age: Option<NumericRange>,
    pub gender: Option<Vec<Concept>>,
    #[serde(rename = "GenderCS")]
    pub gender_cs: Option<ConceptSetSelection>,
    pub provider_specialty: Option<Vec<Concept>>,
    #[serde(rename = "ProviderSpecialtyCS")]
    pub provider_specialty_cs: Option<ConceptSetSelection>,
    pub visit_type: Option<Vec<Concept>>,
    #[serde(rename = "VisitTypeCS")]
    pub visit_type_cs: Option<ConceptSetSelection>,
    pub correlated_criteria: Option<CriteriaGroup>,
}

impl Observation {
    fn attributes(&self) -> Attributes<'_> {
        Attributes::default()
            .main_codeset(self.codeset_id)
            .codeset("ObservationSourceConcept", self.observation_source_concept)
            .selection("ObservationTypeCS", &self.observation_type_cs)
            .selection("ValueAsConceptCS", &self.value_as_concept_cs)
            .selection("QualifierCS", &self.qualifier_cs)
            .selection("UnitCS", &self.unit_cs)
            .selection("GenderCS", &self.gender_cs)
            .selection("ProviderSpecialtyCS", &self.provider_specialty_cs)
            .selection("VisitTypeCS", &self.visit_type_cs)
            .date("OccurrenceStartDate", &self.occurrence_start_date)
            .number("ValueAsNumber", &self.value_as_number)
            .number("Age", &self.age)
            .text("ValueAsString", &self.value_as_string)
            .correlated(&self.correlated_criteria)
    }
}

/// User supplied period bounds of observation/payer plan periods
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Period {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Observation period
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ObservationPeriod {
    pub first: Option<bool>,
    pub period_start_date: Option<DateRange>,
    pub period_end_date: Option<DateRange>,
    pub user_defined_period: Option<Period>,
    pub period_type: Option<Vec<Concept>>,
    #[serde(rename = "PeriodTypeCS")]
    pub period_type_cs: Option<ConceptSetSelection>,
    pub period_length: Option<NumericRange>,
    pub age_at_start: Option<NumericRange>,
    pub age_at_end: Option<NumericRange>,
    pub correlated_criteria: Option<CriteriaGroup>,
}

impl ObservationPeriod {
    fn attributes(&self) -> Attributes<'_> {
        Attributes::default()
            .selection("PeriodTypeCS", &self.period_type_cs)
            .date("PeriodStartDate", &self.period_start_date)
            .date("PeriodEndDate", &self.period_end_date)
            .number("PeriodLength", &self.period_length)
            .number("AgeAtStart", &self.age_at_start)
            .number("AgeAtEnd", &self.age_at_end)
            .correlated(&self.correlated_criteria)
    }
}

/// Payer plan period
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PayerPlanPeriod {
    pub first: Option<bool>,
    pub period_start_date: Option<DateRange>,
    pub period_end_date: Option<DateRange>,
    pub user_defined_period: Option<Period>,
    pub period_length: Option<NumericRange>,
    pub age_at_start: Option<NumericRange>,
    pub age_at_end: Option<NumericRange>,
    pub gender: Option<Vec<Concept>>,
    #[serde(rename = "GenderCS")]
    pub gender_cs: Option<ConceptSetSelection>,
    pub payer_concept: Option<i64>,
    pub plan_concept: Option<i64>,
    pub sponsor_concept: Option<i64>,
    pub stop_reason_concept: Option<i64>,
    pub payer_source_concept: Option<i64>,
    pub plan_source_concept: Option<i64>,
    pub sponsor_source_concept: Option<i64>,
    pub stop_reason_source_concept: Option<i64>,
    pub correlated_criteria: Option<CriteriaGroup>,
}

impl PayerPlanPeriod {
    fn attributes(&self) -> Attributes<'_> {
        Attributes::default()
            .codeset("PayerConcept", self.payer_concept)
            .codeset("PlanConcept", self.plan_concept)
            .codeset("SponsorConcept", self.sponsor_concept)
            .codeset("StopReasonConcept", self.stop_reason_concept)
            .codeset("PayerSourceConcept", self.payer_source_concept)
            .codeset("PlanSourceConcept", self.plan_source_concept)
            .codeset("SponsorSourceConcept", self.sponsor_source_concept)
            .codeset("StopReasonSourceConcept", self.stop_reason_source_concept)
            .selection("GenderCS", &self.gender_cs)
            .date("PeriodStartDate", &self.period_start_date)
            .date("PeriodEndDate", &self.period_end_date)
            .number("PeriodLength", &self.period_length)
            .number("AgeAtStart", &self.age_at_start)
            .number("AgeAtEnd", &self.age_at_end)
            .correlated(&self.correlated_criteria)
    }
}

/// Procedure occurrence
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ProcedureOccurrence {
    pub codeset_id: Option<i64>,
    pub first: Option<bool>,
    pub occurrence_start_date: Option<DateRange>,
    pub occurrence_end_date: Option<DateRange>,
    pub procedure_type: Option<Vec<Concept>>,
    pub procedure_type_exclude: Option<bool>,
    #[serde(rename = "ProcedureTypeCS")]
    pub procedure_type_cs: Option<ConceptSetSelection>,
    pub modifier: Option<Vec<Concept>>,
    #[serde(rename = "ModifierCS")]
    pub modifier_cs: Option<ConceptSetSelection>,
    pub quantity: Option<NumericRange>,
    pub procedure_source_concept: Option<i64>,
    pub age: Option<NumericRange>,
    pub gender: Option<Vec<Concept>>,
    #[serde(rename = "GenderCS")]
    pub gender_cs: Option<ConceptSetSelection>,
    pub provider_specialty: Option<Vec<Concept>>,
    #[serde(rename = "ProviderSpecialtyCS")]
    pub provider_specialty_cs: Option<ConceptSetSelection>,
    pub visit_type: Option<Vec<Concept>>,
    #[serde(rename = "VisitTypeCS")]
    pub visit_type_cs: Option<ConceptSetSelection>,
    pub correlated_criteria: Option<CriteriaGroup>,
}

impl ProcedureOccurrence {
    fn attributes(&self) -> Attributes<'_> {
        Attributes::default()
            .main_codeset(self.codeset_id)
            .codeset("ProcedureSourceConcept", self.procedure_source_concept)
            .selection("ProcedureTypeCS", &self.procedure_type_cs)
            .selection("ModifierCS", &self.modifier_cs)
            .selection("GenderCS", &self.gender_cs)
            .selection("ProviderSpecialtyCS", &self.provider_specialty_cs)
            .selection("VisitTypeCS", &self.visit_type_cs)
            .date("OccurrenceStartDate", &self.occurrence_start_date)
            .date("OccurrenceEndDate", &self.occurrence_end_date)
            .number("Quantity", &self.quantity)
            .number("Age", &self.age)
            .correlated(&self.correlated_criteria)
    }
}

/// Specimen
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Specimen {
    pub codeset_id: Option<i64>,
    pub first: Option<bool>,
    pub occurrence_start_date: Option<DateRange>,
    pub specimen_type: Option<Vec<Concept>>,
    pub specimen_type_exclude: Option<bool>,
    #[serde(rename = "SpecimenTypeCS")]
    pub specimen_type_cs: Option<ConceptSetSelection>,
    pub quantity: Option<NumericRange>,
    pub unit: Option<Vec<Concept>>,
    #[serde(rename = "UnitCS")]
    pub unit_cs: Option<ConceptSetSelection>,
    pub anatomic_site: Option<Vec<Concept>>,
    #[serde(rename = "AnatomicSiteCS")]
    pub anatomic_site_cs: Option<ConceptSetSelection>,
    pub disease_status: Option<Vec<Concept>>,
    #[serde(rename = "DiseaseStatusCS")]
    pub disease_status_cs: Option<ConceptSetSelection>,
    pub source_id: Option<TextFilter>,
    pub age: Option<NumericRange>,
    pub gender: Option<Vec<Concept>>,
    #[serde(rename = "GenderCS")]
    pub gender_cs: Option<ConceptSetSelection>,
    pub correlated_criteria: Option<CriteriaGroup>,
}

impl Specimen {
    fn attributes(&self) -> Attributes<'_> {
        Attributes::default()
            .main_codeset(self.codeset_id)
            .selection("SpecimenTypeCS", &self.specimen_type_cs)
            .selection("UnitCS", &self.unit_cs)
            .selection("AnatomicSiteCS", &self.anatomic_site_cs)
            .selection("DiseaseStatusCS", &self.disease_status_cs)
            .selection("GenderCS", &self.gender_cs)
            .date("OccurrenceStartDate", &self.occurrence_start_date)
            .number("Quantity", &self.quantity)
            .number("Age", &self.age)
            .text("SourceId", &self.source_id)
            .correlated(&self.correlated_criteria)
    }
}

/// Visit occurrence
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct VisitOccurrence {
    pub codeset_id: Option<i64>,
    pub first: Option<bool>,
    pub occurrence_start_date: Option<DateRange>,
    pub occurrence_end_date: Option<DateRange>,
    pub visit_type: Option<Vec<Concept>>,
    pub visit_type_exclude: Option<bool>,
    #[serde(rename = "VisitTypeCS")]
    pub visit_type_cs: Option<ConceptSetSelection>,
    pub visit_source_concept: Option<i64>,
    pub visit_length: Option<NumericRange>,
    pub age: Option<NumericRange>,
    pub gender: Option<Vec<Concept>>,
    #[serde(rename = "GenderCS")]
    pub gender_cs: Option<ConceptSetSelection>,
    pub provider_specialty: Option<Vec<Concept>>,
    #[serde(rename = "ProviderSpecialtyCS")]
    pub provider_specialty_cs: Option<ConceptSetSelection>,
    pub place_of_service: Option<Vec<Concept>>,
    #[serde(rename = "PlaceOfServiceCS")]
    pub place_of_service_cs: Option<ConceptSetSelection>,
    pub place_of_service_location: Option<i64>,
    pub correlated_criteria: Option<CriteriaGroup>,
}

impl VisitOccurrence {
    fn attributes(&self) -> Attributes<'_> {
        Attributes::default()
            .main_codeset(self.codeset_id)
            .codeset("VisitSourceConcept", self.visit_source_concept)
            .codeset("PlaceOfServiceLocation", self.place_of_service_location)
            .selection("VisitTypeCS", &self.visit_type_cs)
            .selection("GenderCS", &self.gender_cs)
            .selection("ProviderSpecialtyCS", &self.provider_specialty_cs)
            .selection("PlaceOfServiceCS", &self.place_of_service_cs)
            .date("OccurrenceStartDate", &self.occurrence_start_date)
            .date("OccurrenceEndDate", &self.occurrence_end_date)
            .number("VisitLength", &self.visit_length)
            .number("Age", &self.age)
            .correlated(&self.correlated_criteria)
    }
}

/// Visit detail
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct VisitDetail {
    pub codeset_id: Option<i64>,
    pub first: Option<bool>,
    pub visit_detail_start_date: Option<DateRange>,
    pub visit_detail_end_date: Option<DateRange>,
    #[serde(rename = "VisitDetailTypeCS")]
    pub visit_detail_type_cs: Option<ConceptSetSelection>,
    pub visit_detail_source_concept: Option<i64>,
    pub visit_detail_length: Option<NumericRange>,
    pub age: Option<NumericRange>,
    #[serde(rename = "GenderCS")]
    pub gender_cs: Option<ConceptSetSelection>,
    #[serde(rename = "ProviderSpecialtyCS")]
    pub provider_specialty_cs: Option<ConceptSetSelection>,
    #[serde(rename = "PlaceOfServiceCS")]
    pub place_of_service_cs: Option<ConceptSetSelection>,
    pub place_of_service_location: Option<i64>,
    pub correlated_criteria: Option<CriteriaGroup>,
}

impl VisitDetail {
    fn attributes(&self) -> Attributes<'_> {
        Attributes::default()
            .main_codeset(self.codeset_id)
            .codeset("VisitDetailSourceConcept", self.visit_detail_source_concept)
            .codeset("PlaceOfServiceLocation", self.place_of_service_location)
            .selection("VisitDetailTypeCS", &self.visit_detail_type_cs)
            .selection("GenderCS", &self.gender_cs)
            .selection("ProviderSpecialtyCS", &self.provider_specialty_cs)
            .selection("PlaceOfServiceCS", &self.place_of_service_cs)
            .date("VisitDetailStartDate", &self.visit_detail_start_date)
            .date("VisitDetailEndDate", &self.visit_detail_end_date)
            .number("VisitDetailLength", &self.visit_detail_length)
            .number("Age", &self.age)
            .correlated(&self.correlated_criteria)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn criteria(json: &str) -> Criteria {
        serde_json::from_str(json).unwrap_or_else(|e| panic!("bad criteria {json}: {e}"))
    }

    #[test]
    fn test_externally_tagged() {
        let c = criteria(r#"{"ConditionOccurrence": {"CodesetId": 3, "First": true}}"#);
        assert_eq!(c.name(), "ConditionOccurrence");
        assert_eq!(c.codeset_id(), Some(3));
        assert_eq!(c.domain(), Some("Condition"));
    }

    #[test]
    fn test_unknown_variant_is_rejected() {
        assert!(serde_json::from_str::<Criteria>(r#"{"Imaging": {"CodesetId": 1}}"#).is_err());
    }

    #[test]
    fn test_attributes_collect_all_codesets() {
        let c = criteria(
            r#"{"DrugExposure": {
                "CodesetId": 1,
                "DrugSourceConcept": 2,
                "DrugTypeCS": {"CodesetId": 3, "IsExclusion": false},
                "Quantity": {"Value": 1, "Op": "gt"},
                "LotNumber": {"Text": "A1", "Op": "startsWith"}
            }}"#,
        );
        let attributes = c.attributes();

        let ids: Vec<i64> = attributes.codesets.iter().map(|r| r.codeset_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(attributes.numbers.len(), 1);
        assert_eq!(attributes.texts[0].0, "LotNumber");
    }

    #[test]
    fn test_periods_do_not_select_by_concept() {
        let c = criteria(r#"{"ObservationPeriod": {"PeriodLength": {"Value": 365, "Op": "gte"}}}"#);
        assert!(!c.selects_by_concept());
        assert_eq!(c.codeset_id(), None);
        assert!(criteria(r#"{"DrugEra": {"CodesetId": 1}}"#).expects_ingredients());
    }

    #[test]
    fn test_nested_correlated_criteria() {
        let c = criteria(
            r#"{"VisitOccurrence": {
                "CodesetId": 1,
                "CorrelatedCriteria": {"Type": "ALL", "CriteriaList": [
                    {"Criteria": {"Death": {}}, "Occurrence": {"Type": 2, "Count": 1}}
                ]}
            }}"#,
        );
        let nested = c.correlated_criteria().unwrap();
        assert_eq!(nested.criteria_list.len(), 1);
        assert_eq!(nested.criteria_list[0].criteria.name(), "Death");
    }
}
