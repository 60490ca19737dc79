//! SET, ORDER BY, GROUP BY, LIMIT and OFFSET clauses.
//!
//! Every compiler here returns an empty string when it has nothing to emit.

use serde::Serialize;

use super::placeholder::placeholder;
use super::value::SqlValue;

// =============================================================================
// SET
// =============================================================================

/// One `column = value` assignment of an UPDATE.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SetClause {
    pub column: String,
    pub value: SqlValue,
}

impl SetClause {
    pub fn new(column: &str, value: impl Into<SqlValue>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }
}

/// Compiled SET clause.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompiledSet {
    pub text: String,
    pub values: Vec<SqlValue>,
    pub next_offset: usize,
}

/// Compile `set a = $n, b = $n+1` with values in declaration order.
///
/// Placeholders are 1-indexed; an `offset` of 0 starts at `$1`.
pub fn compile_set(clauses: &[SetClause], offset: usize) -> CompiledSet {
    let offset = offset.max(1);
    if clauses.is_empty() {
        return CompiledSet {
            next_offset: offset,
            ..CompiledSet::default()
        };
    }

    let assignments: Vec<String> = clauses
        .iter()
        .enumerate()
        .map(|(i, clause)| format!("{} = {}", clause.column, placeholder(offset + i)))
        .collect();

    CompiledSet {
        text: format!("set {}", assignments.join(", ")),
        values: clauses.iter().map(|c| c.value.clone()).collect(),
        next_offset: offset + clauses.len(),
    }
}

// =============================================================================
// ORDER BY / GROUP BY
// =============================================================================

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

impl SortDir {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDir::Asc => "asc",
            SortDir::Desc => "desc",
        }
    }
}

/// An ORDER BY item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderBy {
    pub table: String,
    pub column: String,
    pub dir: SortDir,
}

impl OrderBy {
    pub fn asc(table: &str, column: &str) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
            dir: SortDir::Asc,
        }
    }

    pub fn desc(table: &str, column: &str) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
            dir: SortDir::Desc,
        }
    }
}

/// A GROUP BY item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupBy {
    pub table: String,
    pub column: String,
}

impl GroupBy {
    pub fn new(table: &str, column: &str) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
        }
    }
}

pub fn compile_order_by(items: &[OrderBy]) -> String {
    if items.is_empty() {
        return String::new();
    }
    let columns: Vec<String> = items
        .iter()
        .map(|o| format!("{}.{} {}", o.table, o.column, o.dir.as_str()))
        .collect();
    format!("order by {}", columns.join(", "))
}

pub fn compile_group_by(items: &[GroupBy]) -> String {
    if items.is_empty() {
        return String::new();
    }
    let columns: Vec<String> = items
        .iter()
        .map(|g| format!("{}.{}", g.table, g.column))
        .collect();
    format!("group by {}", columns.join(", "))
}

// =============================================================================
// LIMIT / OFFSET
// =============================================================================

/// `limit N`, only for a positive `N`.
pub fn compile_limit(limit: Option<u64>) -> String {
    match limit {
        Some(n) if n > 0 => format!("limit {n}"),
        _ => String::new(),
    }
}

/// `offset N`, only for a positive `N`.
pub fn compile_offset(offset: Option<u64>) -> String {
    match offset {
        Some(n) if n > 0 => format!("offset {n}"),
        _ => String::new(),
    }
}
