//! Cohort check diagnostics
//!
//! This crate provides the output vocabulary of the cohort checker:
//! finding kinds, severities, the finding value type, severity policy
//! overrides and the warnings/errors classification.

mod finding;
mod kind;
mod policy;
mod report;

pub use finding::*;
pub use kind::*;
pub use policy::*;
pub use report::*;
