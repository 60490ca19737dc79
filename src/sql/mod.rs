//! SQL generation module.
//!
//! Pure functions from typed clause descriptors to SQL text plus bind values.
//! It includes:
//!
//! - [`operator`] - domain filter operators and their SQL tokens
//! - [`placeholder`] - `$n` placeholder allocation
//! - [`where_clause`] - WHERE predicates and AND/OR compositions
//! - [`join`] - JOIN clauses
//! - [`clause`] - SET, ORDER BY, GROUP BY, LIMIT and OFFSET
//! - [`query`] - SELECT / UPDATE assembly
//! - [`check`] - sqlparser-based syntax check

pub mod check;
pub mod clause;
pub mod join;
pub mod operator;
pub mod placeholder;
pub mod query;
pub mod value;
pub mod where_clause;

// Re-export commonly used types at the sql module level
pub use clause::{GroupBy, OrderBy, SetClause, SortDir};
pub use join::{JoinKind, JoinSpec};
pub use operator::{translate, FilterOperator, SqlOperator};
pub use placeholder::{allocate, placeholder, Allocation, Placeholders};
pub use query::{build_select, build_update, QueryValues, SelectOptions, UpdateOptions};
pub use value::{PredicateValue, SqlValue};
pub use where_clause::{
    compile_where, compile_where_at, CompiledWhere, Conjunction, WhereClause, WhereComposition,
    WherePredicate, WhereTerm,
};
