//! JOIN clause compilation.
//!
//! Joins only reference identifiers, so they never bind values.

use serde::Serialize;

/// Join flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinKind {
    #[default]
    Join,
    LeftJoin,
    RightJoin,
}

impl JoinKind {
    pub fn as_str(self) -> &'static str {
        match self {
            JoinKind::Join => "join",
            JoinKind::LeftJoin => "left join",
            JoinKind::RightJoin => "right join",
        }
    }
}

/// A join from `source_table` to `target_table` on column pairs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[must_use = "builders have no effect until used"]
pub struct JoinSpec {
    pub kind: JoinKind,
    pub source_table: String,
    pub target_table: String,
    /// `(source_column, target_column)` pairs, `and`-joined.
    pub column_pairs: Vec<(String, String)>,
}

impl JoinSpec {
    pub fn new(kind: JoinKind, source_table: &str, target_table: &str) -> Self {
        Self {
            kind,
            source_table: source_table.into(),
            target_table: target_table.into(),
            column_pairs: Vec::new(),
        }
    }

    pub fn join(source_table: &str, target_table: &str) -> Self {
        Self::new(JoinKind::Join, source_table, target_table)
    }

    pub fn left(source_table: &str, target_table: &str) -> Self {
        Self::new(JoinKind::LeftJoin, source_table, target_table)
    }

    pub fn right(source_table: &str, target_table: &str) -> Self {
        Self::new(JoinKind::RightJoin, source_table, target_table)
    }

    /// Add a `source.source_column = target.target_column` condition.
    pub fn on(mut self, source_column: &str, target_column: &str) -> Self {
        self.column_pairs
            .push((source_column.into(), target_column.into()));
        self
    }

    /// `<kind> <target> on s.a = t.b and s.c = t.d`
    pub fn to_sql(&self) -> String {
        let conditions: Vec<String> = self
            .column_pairs
            .iter()
            .map(|(source, target)| {
                format!(
                    "{}.{source} = {}.{target}",
                    self.source_table, self.target_table
                )
            })
            .collect();

        if conditions.is_empty() {
            format!("{} {}", self.kind.as_str(), self.target_table)
        } else {
            format!(
                "{} {} on {}",
                self.kind.as_str(),
                self.target_table,
                conditions.join(" and ")
            )
        }
    }
}

/// Compile a sequence of joins, space separated.
pub fn compile_joins(joins: &[JoinSpec]) -> String {
    joins
        .iter()
        .map(JoinSpec::to_sql)
        .collect::<Vec<_>>()
        .join(" ")
}
