//! Domain filter compilation.
//!
//! Turns an entity name plus a raw filter into a flat list of WHERE predicates:
//!
//! ```text
//! raw JSON → parse (registry) → direct fields ─────────────────┐
//!                             └→ reference graph → chains → nested fields → predicates
//! ```
//!
//! Two algorithms are available. [`Algorithm::Graph`] is canonical: it builds
//! the [`ReferenceGraph`], enumerates chains and walks each one. The
//! [`Algorithm::Stack`] compiler pops nested filters off a work stack instead
//! and is kept as a reference the graph compiler is tested against. Both
//! produce the same predicate set on acyclic filters where every entity is
//! reached by one nested filter per path. The graph compiler repeats the
//! predicates of a prefix shared by several chains, once per chain, and drops
//! a reference the first-visit rule skips (see [`crate::graph`]).
//!
//! # Example
//!
//! ```ignore
//! use domain_filter::compile::FilterCompiler;
//! use domain_filter::registry::Registry;
//! use serde_json::json;
//!
//! let registry = Registry::recruiting()?;
//! let predicates = FilterCompiler::new(registry).compile(
//!     "user",
//!     &json!({"email": {"equals": "a@b.com"}, "address": {"state": {"equals": "CA"}}}),
//! )?;
//! ```

mod chain;
mod stack;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::FilterResult;
use crate::graph::{ReferenceChain, ReferenceGraph};
use crate::registry::{ParsedFilter, Registry};
use crate::sql::query::SelectOptions;
use crate::sql::where_clause::WherePredicate;

// ============================================================================
// Algorithm
// ============================================================================

/// Which compiler walks nested reference filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    #[default]
    Graph,
    Stack,
}

impl Algorithm {
    pub fn as_str(self) -> &'static str {
        match self {
            Algorithm::Graph => "graph",
            Algorithm::Stack => "stack",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "graph" => Ok(Algorithm::Graph),
            "stack" => Ok(Algorithm::Stack),
            other => Err(format!("unknown algorithm: {other}")),
        }
    }
}

// ============================================================================
// Compiler
// ============================================================================

/// Compiles raw filters against a registry.
#[derive(Debug, Clone, Copy)]
pub struct FilterCompiler<'r> {
    registry: &'r Registry,
    algorithm: Algorithm,
}

impl<'r> FilterCompiler<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            algorithm: Algorithm::default(),
        }
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Validate a raw filter without compiling it.
    pub fn parse(&self, entity: &str, raw: &Value) -> FilterResult<ParsedFilter> {
        self.registry.parse_filter(entity, raw)
    }

    /// Compile with the configured algorithm.
    ///
    /// # Errors
    ///
    /// `UnknownDomain` and `InvalidFilterShape` from parsing, and
    /// `MissingValue` / `ArrayRequired` from predicate expansion. Nothing is
    /// returned on failure.
    pub fn compile(&self, entity: &str, raw: &Value) -> FilterResult<Vec<WherePredicate>> {
        self.compile_with(self.algorithm, entity, raw)
    }

    pub fn compile_with(
        &self,
        algorithm: Algorithm,
        entity: &str,
        raw: &Value,
    ) -> FilterResult<Vec<WherePredicate>> {
        let parsed = self.parse(entity, raw)?;
        let predicates = self.compile_parsed_with(algorithm, &parsed)?;
        tracing::debug!(
            entity,
            %algorithm,
            predicates = predicates.len(),
            "compiled filter"
        );
        Ok(predicates)
    }

    /// Compile an already parsed filter with the configured algorithm.
    pub fn compile_parsed(&self, filter: &ParsedFilter) -> FilterResult<Vec<WherePredicate>> {
        self.compile_parsed_with(self.algorithm, filter)
    }

    fn compile_parsed_with(
        &self,
        algorithm: Algorithm,
        filter: &ParsedFilter,
    ) -> FilterResult<Vec<WherePredicate>> {
        match algorithm {
            Algorithm::Graph => chain::compile(self.registry, filter),
            Algorithm::Stack => stack::compile(self.registry, filter),
        }
    }

    /// Reference chains of a raw filter, root first.
    pub fn reference_chains(&self, entity: &str, raw: &Value) -> FilterResult<Vec<ReferenceChain>> {
        let parsed = self.parse(entity, raw)?;
        Ok(ReferenceGraph::build(&parsed).chains())
    }

    /// A SELECT on the entity's table filtered by the compiled predicates.
    ///
    /// Predicates on referenced entities name their own tables, so callers add
    /// the matching joins to the returned options.
    pub fn select_for<S: Into<String>>(
        &self,
        entity: &str,
        raw: &Value,
        columns: impl IntoIterator<Item = S>,
    ) -> FilterResult<SelectOptions> {
        let table = self.registry.entry(entity)?.table();
        let predicates = self.compile(entity, raw)?;
        Ok(SelectOptions::new(table).columns(columns).filter(predicates))
    }
}

/// Compile `raw` for `entity` with the graph algorithm.
pub fn compile(registry: &Registry, entity: &str, raw: &Value) -> FilterResult<Vec<WherePredicate>> {
    FilterCompiler::new(registry).compile(entity, raw)
}

/// Predicates for the direct fields of one filter, one per operator.
pub(crate) fn field_predicates(
    registry: &Registry,
    filter: &ParsedFilter,
) -> FilterResult<Vec<WherePredicate>> {
    let table = registry.entry(filter.entity())?.table();
    let mut predicates = Vec::new();

    for field in filter.partition().fields {
        for condition in &field.conditions {
            let predicate = WherePredicate {
                table: table.to_string(),
                column: field.column.clone(),
                operator: condition.operator.to_sql(),
                value: condition.operand.to_predicate_value(),
            };
            predicate.validate()?;
            tracing::trace!(
                column = %predicate.column_ref(),
                operator = %predicate.operator,
                "predicate"
            );
            predicates.push(predicate);
        }
    }

    Ok(predicates)
}
