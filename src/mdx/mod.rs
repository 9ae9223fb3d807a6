mod builder;
mod clauses;
mod flat;

pub use builder::MdxBuilder;
pub use clauses::{format_filter_clause, validate_member};

use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Dimension-level token mapped to the member values it is restricted to.
///
/// Keys iterate in sorted order, so the same filters always produce the same
/// WHERE clause.
pub type DimensionFilter = BTreeMap<String, Vec<String>>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Unknown cube: {0}")]
    UnknownCube(String),

    #[error("Measure {token} is not allowed on cube {cube}")]
    UnknownMeasure { cube: String, token: String },

    #[error("Dimension {token} is not allowed on cube {cube}")]
    UnknownDimension { cube: String, token: String },

    #[error("Invalid member value {value:?} for dimension {dimension}")]
    InvalidMember { dimension: String, value: String },

    #[error("Unknown time level: {0}")]
    UnknownTimeLevel(String),

    #[error("No SQL equivalent for measures: {}", .0.join(", "))]
    NoSqlEquivalent(Vec<String>),
}

/// Level of the time hierarchy placed on the ROWS axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeLevel {
    #[default]
    Year,
    Quarter,
    Month,
}

impl TimeLevel {
    pub const DIMENSION: &'static str = "[Date]";

    pub fn token(&self) -> &'static str {
        match self {
            TimeLevel::Year => "[Date].[Year]",
            TimeLevel::Quarter => "[Date].[Quarter]",
            TimeLevel::Month => "[Date].[Month]",
        }
    }

    /// Accepts either the bare level name or the full level token.
    pub fn parse(token: &str) -> Result<Self, ValidationError> {
        let trimmed = token.trim();
        [TimeLevel::Year, TimeLevel::Quarter, TimeLevel::Month]
            .into_iter()
            .find(|level| {
                trimmed == level.token() || trimmed.eq_ignore_ascii_case(level.name())
            })
            .ok_or_else(|| ValidationError::UnknownTimeLevel(token.to_string()))
    }

    fn name(&self) -> &'static str {
        match self {
            TimeLevel::Year => "Year",
            TimeLevel::Quarter => "Quarter",
            TimeLevel::Month => "Month",
        }
    }
}

/// A fully assembled MDX statement, passed verbatim to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MdxStatement(String);

impl MdxStatement {
    /// Wraps trusted, compile-time MDX text.
    pub(crate) fn from_trusted(mdx: &str) -> Self {
        MdxStatement(mdx.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MdxStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
