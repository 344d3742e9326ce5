//! Attribute constraints: date ranges, numeric ranges, text filters and
//! concept set selections

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Comparison operator of a range constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeOp {
    Lt,
    Lte,
    Eq,
    NotEq,
    Gt,
    Gte,
    Between,
    NotBetween,
}

impl RangeOp {
    /// Operator code as written in expressions
    pub const fn as_str(&self) -> &'static str {
        match self {
            RangeOp::Lt => "lt",
            RangeOp::Lte => "lte",
            RangeOp::Eq => "eq",
            RangeOp::NotEq => "!eq",
            RangeOp::Gt => "gt",
            RangeOp::Gte => "gte",
            RangeOp::Between => "bt",
            RangeOp::NotBetween => "!bt",
        }
    }

    /// Whether the operator also needs an upper bound (`Extent`)
    pub const fn needs_extent(&self) -> bool {
        matches!(self, RangeOp::Between | RangeOp::NotBetween)
    }
}

impl FromStr for RangeOp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "lt" => Ok(RangeOp::Lt),
            "lte" => Ok(RangeOp::Lte),
            "eq" => Ok(RangeOp::Eq),
            "!eq" => Ok(RangeOp::NotEq),
            "gt" => Ok(RangeOp::Gt),
            "gte" => Ok(RangeOp::Gte),
            "bt" => Ok(RangeOp::Between),
            "!bt" => Ok(RangeOp::NotBetween),
            other => Err(format!("unknown range operator '{other}'")),
        }
    }
}

impl fmt::Display for RangeOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn present(op: &Option<String>) -> Option<&str> {
    op.as_deref().map(str::trim).filter(|op| !op.is_empty())
}

/// Date constraint, e.g. `{"Value": "2020-01-01", "Op": "bt", "Extent": "2021-01-01"}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DateRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub op: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extent: Option<String>,
}

impl DateRange {
    /// Operator code, if one is given
    pub fn op(&self) -> Option<&str> {
        present(&self.op)
    }

    /// Lower (or only) bound, ignoring blank strings
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref().map(str::trim).filter(|v| !v.is_empty())
    }

    /// Upper bound of `bt`/`!bt`, ignoring blank strings
    pub fn extent(&self) -> Option<&str> {
        self.extent.as_deref().map(str::trim).filter(|v| !v.is_empty())
    }

    /// Both bounds parsed as calendar dates, when both are valid dates
    pub fn dates(&self) -> Option<(NaiveDate, NaiveDate)> {
        let value = parse_date(self.value()?)?;
        let extent = parse_date(self.extent()?)?;
        Some((value, extent))
    }
}

/// Parse the date part of an expression date (`YYYY-MM-DD`, optionally followed by a time)
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let date = s.get(..10).unwrap_or(s);
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// Numeric constraint, e.g. `{"Value": 18, "Op": "gte"}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct NumericRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub op: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extent: Option<Decimal>,
}

impl NumericRange {
    /// Operator code, if one is given
    pub fn op(&self) -> Option<&str> {
        present(&self.op)
    }
}

/// Text constraint, e.g. `{"Text": "abc", "Op": "startsWith"}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct TextFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub op: Option<String>,
}

impl TextFilter {
    /// Operator code, if one is given
    pub fn op(&self) -> Option<&str> {
        present(&self.op)
    }

    /// Filter text, ignoring empty strings
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.is_empty())
    }
}

/// Reference to a concept set used as an attribute filter (`...CS` fields)
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ConceptSetSelection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codeset_id: Option<i64>,
    pub is_exclusion: bool,
}
