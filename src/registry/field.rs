//! Field kinds and the operators each kind accepts.

use std::fmt;

use inflector::Inflector;
use serde::{Deserialize, Serialize};

use crate::sql::operator::FilterOperator;

/// Value kind of a filterable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    String,
    Number,
    Boolean,
    Date,
}

impl FieldKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Number => "number",
            FieldKind::Boolean => "boolean",
            FieldKind::Date => "date",
        }
    }

    /// Whether a field of this kind may be filtered with `op`.
    pub fn allows(self, op: FilterOperator) -> bool {
        use FilterOperator::*;

        match self {
            FieldKind::String => matches!(
                op,
                Equals | NotEquals | Like | ILike | In | NotIn | IsNull | IsNotNull
            ),
            FieldKind::Number => matches!(
                op,
                Equals
                    | NotEquals
                    | GreaterThan
                    | GreaterThanEqualTo
                    | LessThan
                    | LessThanEqualTo
                    | In
                    | NotIn
            ),
            FieldKind::Boolean => matches!(op, Equals | NotEquals | IsNull | IsNotNull),
            FieldKind::Date => matches!(
                op,
                Equals
                    | NotEquals
                    | GreaterThan
                    | GreaterThanEqualTo
                    | LessThan
                    | LessThanEqualTo
                    | In
                    | NotIn
                    | IsNull
                    | IsNotNull
            ),
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A field as written in a registry file: a bare kind, or a table with
/// `kind`, `column` and `hidden`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum FieldDef {
    Kind(FieldKind),
    Detailed {
        kind: FieldKind,
        #[serde(default)]
        column: Option<String>,
        #[serde(default)]
        hidden: bool,
    },
}

impl FieldDef {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldDef::Kind(kind) | FieldDef::Detailed { kind, .. } => *kind,
        }
    }

    /// Resolve against the domain key it is declared under.
    pub fn resolve(&self, key: &str) -> FieldSpec {
        match self {
            FieldDef::Kind(kind) => FieldSpec::new(*kind, Some(key.to_snake_case())),
            FieldDef::Detailed { kind, hidden: true, .. } => FieldSpec::new(*kind, None),
            FieldDef::Detailed { kind, column, .. } => FieldSpec::new(
                *kind,
                Some(column.clone().unwrap_or_else(|| key.to_snake_case())),
            ),
        }
    }
}

impl From<FieldKind> for FieldDef {
    fn from(kind: FieldKind) -> Self {
        FieldDef::Kind(kind)
    }
}

/// A resolved field: its kind and storage column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub kind: FieldKind,
    /// `None` for hidden fields, which have no filterable column.
    pub column: Option<String>,
}

impl FieldSpec {
    pub fn new(kind: FieldKind, column: Option<String>) -> Self {
        Self { kind, column }
    }

    pub fn is_hidden(&self) -> bool {
        self.column.is_none()
    }
}
