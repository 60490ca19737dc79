//! Bind values carried alongside generated SQL.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

/// A single bind parameter value.
///
/// Dates never appear here as date objects; they are stored as ISO-8601
/// strings (see [`SqlValue::timestamp`]).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SqlValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
}

impl SqlValue {
    /// Normalize a timestamp to `YYYY-MM-DDTHH:MM:SS.mmmZ`.
    pub fn timestamp(ts: &DateTime<Utc>) -> Self {
        SqlValue::Text(ts.to_rfc3339_opts(SecondsFormat::Millis, true))
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Text(s) => write!(f, "'{}'", s.replace('\'', "''")),
            SqlValue::Integer(n) => write!(f, "{n}"),
            SqlValue::Float(n) => write!(f, "{n}"),
            SqlValue::Boolean(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for SqlValue {
    fn from(s: &str) -> Self {
        SqlValue::Text(s.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(s: String) -> Self {
        SqlValue::Text(s)
    }
}

impl From<i64> for SqlValue {
    fn from(n: i64) -> Self {
        SqlValue::Integer(n)
    }
}

impl From<i32> for SqlValue {
    fn from(n: i32) -> Self {
        SqlValue::Integer(n.into())
    }
}

impl From<f64> for SqlValue {
    fn from(n: f64) -> Self {
        SqlValue::Float(n)
    }
}

impl From<bool> for SqlValue {
    fn from(b: bool) -> Self {
        SqlValue::Boolean(b)
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(ts: DateTime<Utc>) -> Self {
        SqlValue::timestamp(&ts)
    }
}

/// The value attached to a WHERE predicate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PredicateValue {
    Scalar(SqlValue),
    List(Vec<SqlValue>),
}

impl PredicateValue {
    /// Build a list value.
    pub fn list<V: Into<SqlValue>>(values: impl IntoIterator<Item = V>) -> Self {
        PredicateValue::List(values.into_iter().map(Into::into).collect())
    }

    /// Flatten into bind values, in order.
    pub fn to_values(&self) -> Vec<SqlValue> {
        match self {
            PredicateValue::Scalar(v) => vec![v.clone()],
            PredicateValue::List(vs) => vs.clone(),
        }
    }
}

impl From<SqlValue> for PredicateValue {
    fn from(value: SqlValue) -> Self {
        PredicateValue::Scalar(value)
    }
}

macro_rules! scalar_predicate_value {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for PredicateValue {
                fn from(value: $ty) -> Self {
                    PredicateValue::Scalar(value.into())
                }
            }
        )*
    };
}

scalar_predicate_value!(&str, String, i64, i32, f64, bool, DateTime<Utc>);

impl From<Vec<SqlValue>> for PredicateValue {
    fn from(values: Vec<SqlValue>) -> Self {
        PredicateValue::List(values)
    }
}
