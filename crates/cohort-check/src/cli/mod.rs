//! CLI functionality for the cohort checker
//!
//! This module contains the `validate` command and the report writers used
//! by the `cohort-check` binary.

pub mod output;
pub mod validate;
