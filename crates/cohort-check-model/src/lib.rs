//! Cohort expression model
//!
//! This crate provides:
//! - Typed structures for cohort expressions as exchanged in CIRCE JSON
//! - A closed `Criteria` variant with per-domain attribute views
//! - JSON ingestion (`parse`) reporting malformed input as a `ParseError`
//!
//! The model has no behavior beyond reading its own structure; checks live
//! in the engine crate.

pub mod concept_set;
pub mod criteria;
pub mod expression;
pub mod group;
mod nullable;
pub mod parse;
pub mod range;

pub use concept_set::*;
pub use criteria::*;
pub use expression::*;
pub use group::*;
pub use parse::{parse, parse_reader, parse_value, ParseError};
pub use range::*;
