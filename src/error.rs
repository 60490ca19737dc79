//! Error types for filter compilation.
//!
//! Every error here is a synchronous, non-retryable programmer or input error.
//! Errors are raised where they are detected and propagate unchanged to the
//! caller; nothing in the crate recovers from them or returns partial results.

use crate::sql::operator::SqlOperator;

/// Result type for filter compilation.
pub type FilterResult<T> = Result<T, FilterError>;

/// Errors raised while compiling filters, clauses, or queries.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FilterError {
    /// The entity name has no registry entry.
    #[error("No where filter configuration found for domain: {0}")]
    UnknownDomain(String),

    /// A raw filter does not match the entity's declared filter shape.
    #[error("Invalid filter for {entity}: {reason}")]
    InvalidFilterShape {
        entity: String,
        /// Dotted path of the offending key, when one applies.
        key: Option<String>,
        reason: String,
    },

    /// Operator name outside the closed domain operator set.
    #[error("Unsupported filter operator: {0}")]
    UnsupportedOperator(String),

    /// A value-bearing operator was given no value (or an empty list).
    #[error("Value is required for filter operator: {operator}")]
    MissingValue { operator: SqlOperator },

    /// `in` / `not in` was given a scalar.
    #[error("Array value is required for filter operator: {operator}")]
    ArrayRequired { operator: SqlOperator },

    /// A scalar operator was given a list.
    #[error("Single value is required for filter operator: {operator}")]
    ScalarRequired { operator: SqlOperator },

    /// UPDATE requested with no SET clauses.
    #[error("Update of {table} requires at least one set clause")]
    NoUpdateFields { table: String },
}

impl FilterError {
    pub(crate) fn invalid_shape(
        entity: &str,
        key: Option<&str>,
        reason: impl Into<String>,
    ) -> Self {
        let reason = reason.into();
        FilterError::InvalidFilterShape {
            entity: entity.to_string(),
            reason: match key {
                Some(key) => format!("{key}: {reason}"),
                None => reason,
            },
            key: key.map(str::to_string),
        }
    }

    /// Whether the error stems from caller-supplied filter input.
    ///
    /// Services map these to a 400-style response. `NoUpdateFields` is raised
    /// by statement construction inside the service itself and is not one.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, FilterError::NoUpdateFields { .. })
    }
}
