//! Cohort expression rule engine
//!
//! This crate checks a parsed cohort expression without executing it. It
//! provides:
//!
//! - **Cross-reference index**: codeset usages, criteria, groups and
//!   structural fingerprints, collected in one walk over the expression
//! - **Rule catalog**: independent checks, each a pure function of the
//!   expression and its index
//! - **Checker**: runs the catalog, applies the severity policy and returns
//!   findings in catalog order
//!
//! # Example
//!
//! ```ignore
//! use cohort_check_engine::validate;
//! use cohort_check_model::parse;
//!
//! let expression = parse(json)?;
//! for finding in validate(&expression) {
//!     println!("{finding}");
//! }
//! ```
//!
//! Concept metadata for the domain checks can be injected through
//! [`ConceptLookup`]; without it the metadata embedded in concept set items
//! is used.

pub mod context;
pub mod engine;
pub mod fingerprint;
pub mod index;
pub mod location;
pub mod lookup;
pub mod registry;
pub mod rules;

pub use context::RuleContext;
pub use engine::{Checker, validate, validate_with};
pub use fingerprint::Fingerprint;
pub use index::{CodesetUsage, CriterionSite, CrossReferenceIndex, DemographicSite, GroupSite};
pub use location::{Location, PathStep, Section};
pub use lookup::{ConceptInfo, ConceptLookup, InMemoryConceptLookup, LookupError};
pub use registry::{Rule, RuleFn, catalog, rule};
