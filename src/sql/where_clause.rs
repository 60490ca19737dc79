//! WHERE clause compilation.
//!
//! Predicates compile to `table.column <op> <placeholder(s)>`. Placeholder
//! offsets are threaded left to right across the whole clause, so the indices
//! used by a clause starting at offset `n` are exactly `n..n+k` where `k` is the
//! total number of bound values.
//!
//! Two clause shapes exist, and they render differently:
//!
//! - a predicate list joins its terms with `and` and is prefixed with `where `;
//! - a [`WhereComposition`] joins its predicates with its mode and is wrapped in
//!   parentheses, with no `where`. Compositions are fragments meant to sit
//!   inside a larger predicate list (see [`WhereTerm::Composition`]).

use serde::Serialize;

use crate::error::FilterResult;

use super::operator::SqlOperator;
use super::placeholder::{allocate, Placeholders};
use super::value::{PredicateValue, SqlValue};

/// A single `table.column <op> value` condition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WherePredicate {
    pub table: String,
    pub column: String,
    pub operator: SqlOperator,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<PredicateValue>,
}

impl WherePredicate {
    pub fn new(table: impl Into<String>, column: impl Into<String>, operator: SqlOperator) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
            operator,
            value: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<PredicateValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// `table.column`
    pub fn column_ref(&self) -> String {
        format!("{}.{}", self.table, self.column)
    }

    /// Check the operator/value pairing without rendering anything.
    pub fn validate(&self) -> FilterResult<()> {
        allocate(self.operator, self.value.as_ref(), 1).map(|_| ())
    }

    /// Compile this predicate with placeholders starting at `offset`
    /// (`0` is treated as `1`).
    pub fn compile(&self, offset: usize) -> FilterResult<CompiledCondition> {
        let offset = offset.max(1);
        let allocation = allocate(self.operator, self.value.as_ref(), offset)?;
        let column_ref = self.column_ref();
        let text = match &allocation.placeholders {
            Placeholders::None => format!("{column_ref} {}", self.operator),
            placeholders => format!("{column_ref} {} {placeholders}", self.operator),
        };
        let values = match (&allocation.placeholders, &self.value) {
            (Placeholders::None, _) | (_, None) => Vec::new(),
            (_, Some(value)) => value.to_values(),
        };
        Ok(CompiledCondition {
            text,
            values,
            consumed: allocation.consumed,
        })
    }
}

/// Output of compiling one predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledCondition {
    pub text: String,
    pub values: Vec<SqlValue>,
    pub consumed: usize,
}

/// Boolean connective of a composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Conjunction {
    And,
    Or,
}

impl Conjunction {
    pub fn as_str(self) -> &'static str {
        match self {
            Conjunction::And => "and",
            Conjunction::Or => "or",
        }
    }
}

/// A flat AND/OR combination of predicates. Compositions do not nest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WhereComposition {
    pub mode: Conjunction,
    pub predicates: Vec<WherePredicate>,
}

impl WhereComposition {
    pub fn and(predicates: impl IntoIterator<Item = WherePredicate>) -> Self {
        Self {
            mode: Conjunction::And,
            predicates: predicates.into_iter().collect(),
        }
    }

    pub fn or(predicates: impl IntoIterator<Item = WherePredicate>) -> Self {
        Self {
            mode: Conjunction::Or,
            predicates: predicates.into_iter().collect(),
        }
    }

    /// Compile to `(p1 <mode> p2 ...)`. An empty composition renders nothing.
    /// Placeholders start at `offset`, or `$1` when `offset` is 0.
    pub fn compile(&self, offset: usize) -> FilterResult<CompiledWhere> {
        let offset = offset.max(1);
        let (conditions, values, next_offset) = compile_conditions(self.predicates.iter(), offset)?;
        let text = if conditions.is_empty() {
            String::new()
        } else {
            format!("({})", conditions.join(&format!(" {} ", self.mode.as_str())))
        };
        Ok(CompiledWhere {
            text,
            values,
            next_offset,
        })
    }
}

/// One `and`-joined term of a predicate list.
#[derive(Debug, Clone, PartialEq)]
pub enum WhereTerm {
    Predicate(WherePredicate),
    Composition(WhereComposition),
}

impl From<WherePredicate> for WhereTerm {
    fn from(predicate: WherePredicate) -> Self {
        WhereTerm::Predicate(predicate)
    }
}

impl From<WhereComposition> for WhereTerm {
    fn from(composition: WhereComposition) -> Self {
        WhereTerm::Composition(composition)
    }
}

/// A complete WHERE definition.
#[derive(Debug, Clone, PartialEq)]
pub enum WhereClause {
    /// Rendered as `where t1 and t2 ...`.
    Predicates(Vec<WhereTerm>),
    /// Rendered as a parenthesized fragment without `where`.
    Composition(WhereComposition),
}

impl WhereClause {
    pub fn is_empty(&self) -> bool {
        match self {
            WhereClause::Predicates(terms) => terms.is_empty(),
            WhereClause::Composition(c) => c.predicates.is_empty(),
        }
    }
}

impl From<Vec<WherePredicate>> for WhereClause {
    fn from(predicates: Vec<WherePredicate>) -> Self {
        WhereClause::Predicates(predicates.into_iter().map(WhereTerm::from).collect())
    }
}

impl From<Vec<WhereTerm>> for WhereClause {
    fn from(terms: Vec<WhereTerm>) -> Self {
        WhereClause::Predicates(terms)
    }
}

impl From<WhereComposition> for WhereClause {
    fn from(composition: WhereComposition) -> Self {
        WhereClause::Composition(composition)
    }
}

/// Compiled WHERE text plus its bind values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompiledWhere {
    pub text: String,
    pub values: Vec<SqlValue>,
    /// First placeholder index not used by this clause.
    pub next_offset: usize,
}

/// Compile a clause with placeholders starting at `$1`.
pub fn compile_where(clause: &WhereClause) -> FilterResult<CompiledWhere> {
    compile_where_at(clause, 1)
}

/// Compile a clause with placeholders starting at `$offset`.
///
/// Placeholders are 1-indexed; an `offset` of 0 starts at `$1`.
pub fn compile_where_at(clause: &WhereClause, offset: usize) -> FilterResult<CompiledWhere> {
    let offset = offset.max(1);
    match clause {
        WhereClause::Composition(composition) => composition.compile(offset),
        WhereClause::Predicates(terms) => {
            let mut conditions = Vec::with_capacity(terms.len());
            let mut values = Vec::new();
            let mut next_offset = offset;

            for term in terms {
                match term {
                    WhereTerm::Predicate(predicate) => {
                        let compiled = predicate.compile(next_offset)?;
                        next_offset += compiled.consumed;
                        values.extend(compiled.values);
                        conditions.push(compiled.text);
                    }
                    WhereTerm::Composition(composition) => {
                        let compiled = composition.compile(next_offset)?;
                        next_offset = compiled.next_offset;
                        values.extend(compiled.values);
                        if !compiled.text.is_empty() {
                            conditions.push(compiled.text);
                        }
                    }
                }
            }

            let text = if conditions.is_empty() {
                String::new()
            } else {
                format!("where {}", conditions.join(" and "))
            };
            Ok(CompiledWhere {
                text,
                values,
                next_offset,
            })
        }
    }
}

fn compile_conditions<'a>(
    predicates: impl Iterator<Item = &'a WherePredicate>,
    offset: usize,
) -> FilterResult<(Vec<String>, Vec<SqlValue>, usize)> {
    let mut conditions = Vec::new();
    let mut values = Vec::new();
    let mut next_offset = offset;

    for predicate in predicates {
        let compiled = predicate.compile(next_offset)?;
        next_offset += compiled.consumed;
        values.extend(compiled.values);
        conditions.push(compiled.text);
    }

    Ok((conditions, values, next_offset))
}
