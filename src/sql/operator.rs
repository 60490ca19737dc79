//! Filter operators and their SQL tokens.
//!
//! Domain filters name operators in business vocabulary (`equals`,
//! `greaterThanEqualTo`, `isNull`); the WHERE compiler works with SQL tokens
//! (`=`, `>=`, `is null`). The mapping is 1:1 and total over the closed
//! [`FilterOperator`] set.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{FilterError, FilterResult};

/// Domain-level filter operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FilterOperator {
    #[serde(rename = "equals")]
    Equals,
    #[serde(rename = "notEquals")]
    NotEquals,
    #[serde(rename = "like")]
    Like,
    #[serde(rename = "iLike")]
    ILike,
    #[serde(rename = "in")]
    In,
    #[serde(rename = "notIn")]
    NotIn,
    #[serde(rename = "isNull")]
    IsNull,
    #[serde(rename = "isNotNull")]
    IsNotNull,
    #[serde(rename = "greaterThan")]
    GreaterThan,
    #[serde(rename = "greaterThanEqualTo")]
    GreaterThanEqualTo,
    #[serde(rename = "lessThan")]
    LessThan,
    #[serde(rename = "lessThanEqualTo")]
    LessThanEqualTo,
}

impl FilterOperator {
    /// Every domain operator, in declaration order.
    pub const ALL: [FilterOperator; 12] = [
        FilterOperator::Equals,
        FilterOperator::NotEquals,
        FilterOperator::Like,
        FilterOperator::ILike,
        FilterOperator::In,
        FilterOperator::NotIn,
        FilterOperator::IsNull,
        FilterOperator::IsNotNull,
        FilterOperator::GreaterThan,
        FilterOperator::GreaterThanEqualTo,
        FilterOperator::LessThan,
        FilterOperator::LessThanEqualTo,
    ];

    /// The name used in raw filter objects.
    pub fn as_str(self) -> &'static str {
        match self {
            FilterOperator::Equals => "equals",
            FilterOperator::NotEquals => "notEquals",
            FilterOperator::Like => "like",
            FilterOperator::ILike => "iLike",
            FilterOperator::In => "in",
            FilterOperator::NotIn => "notIn",
            FilterOperator::IsNull => "isNull",
            FilterOperator::IsNotNull => "isNotNull",
            FilterOperator::GreaterThan => "greaterThan",
            FilterOperator::GreaterThanEqualTo => "greaterThanEqualTo",
            FilterOperator::LessThan => "lessThan",
            FilterOperator::LessThanEqualTo => "lessThanEqualTo",
        }
    }

    /// Translate to the SQL operator token.
    pub fn to_sql(self) -> SqlOperator {
        match self {
            FilterOperator::Equals => SqlOperator::Eq,
            FilterOperator::NotEquals => SqlOperator::NotEq,
            FilterOperator::Like => SqlOperator::Like,
            FilterOperator::ILike => SqlOperator::ILike,
            FilterOperator::In => SqlOperator::In,
            FilterOperator::NotIn => SqlOperator::NotIn,
            FilterOperator::IsNull => SqlOperator::IsNull,
            FilterOperator::IsNotNull => SqlOperator::IsNotNull,
            FilterOperator::GreaterThan => SqlOperator::Gt,
            FilterOperator::GreaterThanEqualTo => SqlOperator::GtEq,
            FilterOperator::LessThan => SqlOperator::Lt,
            FilterOperator::LessThanEqualTo => SqlOperator::LtEq,
        }
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterOperator {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterOperator::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| FilterError::UnsupportedOperator(s.to_string()))
    }
}

/// SQL comparison operator as emitted into WHERE text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SqlOperator {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    NotEq,
    #[serde(rename = "like")]
    Like,
    #[serde(rename = "ilike")]
    ILike,
    #[serde(rename = "in")]
    In,
    #[serde(rename = "not in")]
    NotIn,
    #[serde(rename = "is null")]
    IsNull,
    #[serde(rename = "is not null")]
    IsNotNull,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    GtEq,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    LtEq,
}

impl SqlOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            SqlOperator::Eq => "=",
            SqlOperator::NotEq => "!=",
            SqlOperator::Like => "like",
            SqlOperator::ILike => "ilike",
            SqlOperator::In => "in",
            SqlOperator::NotIn => "not in",
            SqlOperator::IsNull => "is null",
            SqlOperator::IsNotNull => "is not null",
            SqlOperator::Gt => ">",
            SqlOperator::GtEq => ">=",
            SqlOperator::Lt => "<",
            SqlOperator::LtEq => "<=",
        }
    }

    /// `is null` / `is not null`: no value, no placeholder.
    pub fn is_null_check(self) -> bool {
        matches!(self, SqlOperator::IsNull | SqlOperator::IsNotNull)
    }

    /// `in` / `not in`: one placeholder per list element.
    pub fn takes_list(self) -> bool {
        matches!(self, SqlOperator::In | SqlOperator::NotIn)
    }
}

impl fmt::Display for SqlOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Translate a domain operator name into its SQL token.
///
/// # Errors
///
/// [`FilterError::UnsupportedOperator`] when `name` is not one of the
/// [`FilterOperator`] names.
pub fn translate(name: &str) -> FilterResult<SqlOperator> {
    Ok(name.parse::<FilterOperator>()?.to_sql())
}
