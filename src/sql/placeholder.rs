//! PostgreSQL positional placeholder allocation (`$1`, `$2`, ...).

use std::fmt;

use crate::error::{FilterError, FilterResult};

use super::operator::SqlOperator;
use super::value::PredicateValue;

/// Render the placeholder for a 1-based parameter index.
pub fn placeholder(index: usize) -> String {
    format!("${index}")
}

/// Placeholder tokens reserved for one predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placeholders {
    /// Null checks bind nothing.
    None,
    Single(String),
    /// `in` / `not in`, one token per element.
    List(Vec<String>),
}

impl Placeholders {
    pub fn len(&self) -> usize {
        match self {
            Placeholders::None => 0,
            Placeholders::Single(_) => 1,
            Placeholders::List(tokens) => tokens.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for Placeholders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Placeholders::None => Ok(()),
            Placeholders::Single(token) => f.write_str(token),
            Placeholders::List(tokens) => write!(f, "({})", tokens.join(", ")),
        }
    }
}

/// Result of [`allocate`]: the tokens and how many offsets they consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    pub placeholders: Placeholders,
    pub consumed: usize,
}

/// Reserve placeholders for `operator` applied to `value`, starting at `offset`.
///
/// The next free offset after this call is `offset + consumed`.
///
/// # Errors
///
/// - [`FilterError::MissingValue`] for a value-bearing operator without a
///   value, or with an empty list.
/// - [`FilterError::ArrayRequired`] for `in` / `not in` with a scalar.
/// - [`FilterError::ScalarRequired`] for a scalar operator with a list.
pub fn allocate(
    operator: SqlOperator,
    value: Option<&PredicateValue>,
    offset: usize,
) -> FilterResult<Allocation> {
    if operator.is_null_check() {
        return Ok(Allocation {
            placeholders: Placeholders::None,
            consumed: 0,
        });
    }

    let value = value.ok_or(FilterError::MissingValue { operator })?;

    match (operator.takes_list(), value) {
        (true, PredicateValue::List(items)) if items.is_empty() => {
            Err(FilterError::MissingValue { operator })
        }
        (true, PredicateValue::List(items)) => {
            let tokens: Vec<String> = (offset..offset + items.len()).map(placeholder).collect();
            tracing::trace!(%operator, offset, count = items.len(), "allocated placeholder list");
            Ok(Allocation {
                consumed: tokens.len(),
                placeholders: Placeholders::List(tokens),
            })
        }
        (true, PredicateValue::Scalar(_)) => Err(FilterError::ArrayRequired { operator }),
        (false, PredicateValue::Scalar(_)) => Ok(Allocation {
            placeholders: Placeholders::Single(placeholder(offset)),
            consumed: 1,
        }),
        (false, PredicateValue::List(_)) => Err(FilterError::ScalarRequired { operator }),
    }
}
