//! # domain-filter
//!
//! Compiles nested, entity-level filter objects into parameterized SQL
//! predicates for PostgreSQL.
//!
//! ## Architecture
//!
//! Filters are written in business vocabulary (`email`, `address.state`) and
//! compiled to `table.column <op> $n` predicates plus an ordered value list:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │        Raw filter (JSON, keyed by domain keys)           │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [registry]
//! ┌─────────────────────────────────────────────────────────┐
//! │        ParsedFilter (validated per field kind)           │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [graph]
//! ┌─────────────────────────────────────────────────────────┐
//! │        ReferenceGraph + reference chains                 │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [compile]
//! ┌─────────────────────────────────────────────────────────┐
//! │        WherePredicate list                               │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [sql]
//! ┌─────────────────────────────────────────────────────────┐
//! │        SELECT / UPDATE text + bind values                │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here executes SQL. All state is per call except the [`Registry`],
//! which is immutable once built.
//!
//! [`Registry`]: registry::Registry

pub mod compile;
pub mod config;
pub mod error;
pub mod graph;
pub mod registry;
pub mod sql;

pub use error::{FilterError, FilterResult};

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::compile::{compile, Algorithm, FilterCompiler};
    pub use crate::error::{FilterError, FilterResult};
    pub use crate::graph::{ReferenceChain, ReferenceGraph};
    pub use crate::registry::{EntityDef, FieldKind, ParsedFilter, Registry, RegistryError};
    pub use crate::sql::{
        build_select, build_update, compile_where, compile_where_at, FilterOperator, GroupBy,
        JoinSpec, OrderBy, PredicateValue, QueryValues, SelectOptions, SqlOperator, SqlValue,
        UpdateOptions, WhereClause, WhereComposition, WherePredicate,
    };
}
