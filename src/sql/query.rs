//! SELECT and UPDATE assembly.
//!
//! Assemblers glue the clause compilers together and return the statement text
//! with its ordered bind values. Only WHERE and SET clauses bind values; joins,
//! ordering and grouping are identifiers only.

use serde::Serialize;

use crate::error::{FilterError, FilterResult};

use super::clause::{
    compile_group_by, compile_limit, compile_offset, compile_order_by, compile_set, GroupBy,
    OrderBy, SetClause,
};
use super::join::{compile_joins, JoinSpec};
use super::value::SqlValue;
use super::where_clause::{compile_where_at, CompiledWhere, WhereClause};

/// Statement text plus its positional bind values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryValues {
    pub query: String,
    pub values: Vec<SqlValue>,
}

// =============================================================================
// SELECT
// =============================================================================

/// Options for [`build_select`].
#[derive(Debug, Clone, PartialEq, Default)]
#[must_use = "builders have no effect until used"]
pub struct SelectOptions {
    /// Empty means `*`.
    pub columns: Vec<String>,
    pub from_table: String,
    pub joins: Vec<JoinSpec>,
    pub where_clause: Option<WhereClause>,
    pub group_by: Vec<GroupBy>,
    pub order_by: Vec<OrderBy>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl SelectOptions {
    pub fn new(from_table: &str) -> Self {
        Self {
            from_table: from_table.into(),
            ..Self::default()
        }
    }

    pub fn columns<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.columns.extend(columns.into_iter().map(Into::into));
        self
    }

    pub fn join(mut self, join: JoinSpec) -> Self {
        self.joins.push(join);
        self
    }

    pub fn filter(mut self, clause: impl Into<WhereClause>) -> Self {
        self.where_clause = Some(clause.into());
        self
    }

    pub fn group_by(mut self, item: GroupBy) -> Self {
        self.group_by.push(item);
        self
    }

    pub fn order_by(mut self, item: OrderBy) -> Self {
        self.order_by.push(item);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn build(&self) -> FilterResult<QueryValues> {
        build_select(self)
    }
}

/// Assemble `select … from … [joins] [where] [group by] [order by] [limit] [offset]`.
pub fn build_select(options: &SelectOptions) -> FilterResult<QueryValues> {
    let compiled = compile_optional_where(options.where_clause.as_ref(), 1)?;

    let columns = if options.columns.is_empty() {
        "*".to_string()
    } else {
        options.columns.join(", ")
    };

    let query = join_parts([
        format!("select {columns}"),
        format!("from {}", options.from_table),
        compile_joins(&options.joins),
        compiled.text,
        compile_group_by(&options.group_by),
        compile_order_by(&options.order_by),
        compile_limit(options.limit),
        compile_offset(options.offset),
    ]);

    tracing::debug!(table = %options.from_table, values = compiled.values.len(), "assembled select");
    Ok(QueryValues {
        query,
        values: compiled.values,
    })
}

// =============================================================================
// UPDATE
// =============================================================================

/// Options for [`build_update`].
#[derive(Debug, Clone, PartialEq, Default)]
#[must_use = "builders have no effect until used"]
pub struct UpdateOptions {
    pub table: String,
    pub set_clauses: Vec<SetClause>,
    pub joins: Vec<JoinSpec>,
    pub where_clause: Option<WhereClause>,
}

impl UpdateOptions {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.into(),
            ..Self::default()
        }
    }

    pub fn set(mut self, column: &str, value: impl Into<SqlValue>) -> Self {
        self.set_clauses.push(SetClause::new(column, value));
        self
    }

    pub fn join(mut self, join: JoinSpec) -> Self {
        self.joins.push(join);
        self
    }

    pub fn filter(mut self, clause: impl Into<WhereClause>) -> Self {
        self.where_clause = Some(clause.into());
        self
    }

    pub fn build(&self) -> FilterResult<QueryValues> {
        build_update(self)
    }
}

/// Assemble `update <table> set … [joins] [where] returning *`.
///
/// SET placeholders are numbered first, WHERE placeholders continue after
/// them, and the values follow the same order.
///
/// # Errors
///
/// [`FilterError::NoUpdateFields`] when there are no SET clauses, plus any
/// WHERE compilation error.
pub fn build_update(options: &UpdateOptions) -> FilterResult<QueryValues> {
    if options.set_clauses.is_empty() {
        return Err(FilterError::NoUpdateFields {
            table: options.table.clone(),
        });
    }

    let set = compile_set(&options.set_clauses, 1);
    let compiled = compile_optional_where(options.where_clause.as_ref(), set.next_offset)?;

    let query = join_parts([
        format!("update {}", options.table),
        set.text,
        compile_joins(&options.joins),
        compiled.text,
        "returning *".to_string(),
    ]);

    let mut values = set.values;
    values.extend(compiled.values);

    tracing::debug!(table = %options.table, values = values.len(), "assembled update");
    Ok(QueryValues { query, values })
}

/// Compile an optional WHERE clause. The text is used as compiled: a bare
/// composition stays a bare parenthesized fragment, so callers that want a
/// `where` wrap it as a [`WhereTerm`](super::where_clause::WhereTerm).
fn compile_optional_where(clause: Option<&WhereClause>, offset: usize) -> FilterResult<CompiledWhere> {
    match clause {
        Some(clause) => compile_where_at(clause, offset),
        None => Ok(CompiledWhere {
            next_offset: offset,
            ..CompiledWhere::default()
        }),
    }
}

fn join_parts<const N: usize>(parts: [String; N]) -> String {
    parts
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
