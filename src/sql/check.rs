//! Syntax checking for generated SQL.
//!
//! Parses emitted statements with sqlparser-rs. `$n` placeholders parse as
//! PostgreSQL parameters, so statements can be checked without binding values.

use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::parser::Parser;

/// Validates that a SQL string parses as PostgreSQL.
pub fn validate_sql(sql: &str) -> Result<(), String> {
    Parser::parse_sql(&PostgreSqlDialect {}, sql)
        .map(|_| ())
        .map_err(|e| format!("Invalid SQL: {}\nSQL: {}", e, sql))
}
