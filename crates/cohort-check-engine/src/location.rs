//! Positions inside a cohort expression, used in finding messages

use smallvec::SmallVec;
use std::fmt;

/// Top-level section a location belongs to
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Section {
    PrimaryCriteria,
    AdditionalCriteria,
    InclusionRule { index: usize, name: String },
    CensoringCriteria,
    EndStrategy,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::PrimaryCriteria => f.write_str("primary criteria"),
            Section::AdditionalCriteria => f.write_str("additional criteria"),
            Section::InclusionRule { index, name } if name.trim().is_empty() => {
                write!(f, "inclusion rule #{}", index + 1)
            }
            Section::InclusionRule { name, .. } => write!(f, "inclusion rule \"{name}\""),
            Section::CensoringCriteria => f.write_str("censoring criteria"),
            Section::EndStrategy => f.write_str("end strategy"),
        }
    }
}

/// One step down the expression tree (indices are zero-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PathStep {
    /// Entry of a criteria list
    Criterion(usize),
    /// Nested group
    Group(usize),
    /// Entry of a demographic criteria list
    Demographic(usize),
    /// `CorrelatedCriteria` of a criterion
    Correlated,
}

impl fmt::Display for PathStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathStep::Criterion(i) => write!(f, "criterion {}", i + 1),
            PathStep::Group(i) => write!(f, "group {}", i + 1),
            PathStep::Demographic(i) => write!(f, "demographic criteria {}", i + 1),
            PathStep::Correlated => f.write_str("correlated criteria"),
        }
    }
}

/// Path from a section down to a criterion or group
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Location {
    pub section: Section,
    pub path: SmallVec<[PathStep; 4]>,
}

impl Location {
    pub fn new(section: Section) -> Self {
        Self {
            section,
            path: SmallVec::new(),
        }
    }

    pub fn inclusion_rule(index: usize, name: &str) -> Self {
        Self::new(Section::InclusionRule {
            index,
            name: name.to_string(),
        })
    }

    /// Location one step further down
    pub fn child(&self, step: PathStep) -> Self {
        let mut path = self.path.clone();
        path.push(step);
        Self {
            section: self.section.clone(),
            path,
        }
    }

    /// Whether this is the section itself
    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.section)?;
        for step in &self.path {
            write!(f, " > {step}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let location = Location::inclusion_rule(0, "Prior metformin")
            .child(PathStep::Group(1))
            .child(PathStep::Criterion(0))
            .child(PathStep::Correlated);
        assert_eq!(
            location.to_string(),
            "inclusion rule \"Prior metformin\" > group 2 > criterion 1 > correlated criteria"
        );
    }

    #[test]
    fn test_unnamed_inclusion_rule() {
        assert_eq!(Location::inclusion_rule(2, " ").to_string(), "inclusion rule #3");
        assert!(Location::new(Section::PrimaryCriteria).is_root());
    }
}
