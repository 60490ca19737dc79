//! Raw filter parsing.
//!
//! A raw filter is a JSON object keyed by domain keys. Field keys map to an
//! operator object (`{"equals": "a@b.com", "isNull": true}`); reference keys map
//! to a nested filter of the referenced entity (or `null`). Parsing validates
//! the whole tree against the registry once and produces a [`ParsedFilter`],
//! which keeps the raw key order.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value};

use crate::error::{FilterError, FilterResult};
use crate::sql::operator::FilterOperator;
use crate::sql::value::{PredicateValue, SqlValue};

use super::field::FieldKind;
use super::{EntityEntry, Registry};

// =============================================================================
// Parsed tree
// =============================================================================

/// A validated filter for one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFilter {
    entity: String,
    entries: Vec<FilterEntry>,
}

/// One key of a parsed filter.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterEntry {
    Field(FieldFilter),
    Reference(ParsedFilter),
}

/// Direct-field and reference entries of a filter, in key order.
#[derive(Debug, Clone, Default)]
pub struct KeyPartition<'a> {
    pub fields: Vec<&'a FieldFilter>,
    pub references: Vec<&'a ParsedFilter>,
}

impl ParsedFilter {
    /// A filter with no keys.
    pub fn empty(entity: &str) -> Self {
        Self {
            entity: entity.to_string(),
            entries: Vec::new(),
        }
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn entries(&self) -> &[FilterEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The nested filter stored under the reference key `entity`.
    pub fn reference(&self, entity: &str) -> Option<&ParsedFilter> {
        self.entries.iter().find_map(|entry| match entry {
            FilterEntry::Reference(nested) if nested.entity == entity => Some(nested),
            _ => None,
        })
    }

    /// Split into direct-field keys and reference keys.
    pub fn partition(&self) -> KeyPartition<'_> {
        let mut partition = KeyPartition::default();
        for entry in &self.entries {
            match entry {
                FilterEntry::Field(field) => partition.fields.push(field),
                FilterEntry::Reference(nested) => partition.references.push(nested),
            }
        }
        partition
    }
}

/// Conditions on one direct field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    pub key: String,
    pub column: String,
    pub kind: FieldKind,
    /// Non-empty, in raw key order.
    pub conditions: Vec<Condition>,
}

/// One `operator: operand` pair under a field.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub operator: FilterOperator,
    pub operand: Operand,
}

/// Operand of a condition, already checked against the field kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Null checks. Only the flag's presence matters.
    Flag(bool),
    Value(OperandValue),
    List(Vec<OperandValue>),
}

impl Operand {
    /// Bind value for the predicate, `None` for null checks.
    pub fn to_predicate_value(&self) -> Option<PredicateValue> {
        match self {
            Operand::Flag(_) => None,
            Operand::Value(v) => Some(PredicateValue::Scalar(v.to_sql_value())),
            Operand::List(vs) => Some(PredicateValue::List(
                vs.iter().map(OperandValue::to_sql_value).collect(),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OperandValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Date(DateTime<Utc>),
}

impl OperandValue {
    /// Dates are normalized to ISO-8601 text here.
    pub fn to_sql_value(&self) -> SqlValue {
        match self {
            OperandValue::Text(s) => SqlValue::Text(s.clone()),
            OperandValue::Integer(n) => SqlValue::Integer(*n),
            OperandValue::Float(n) => SqlValue::Float(*n),
            OperandValue::Boolean(b) => SqlValue::Boolean(*b),
            OperandValue::Date(ts) => SqlValue::timestamp(ts),
        }
    }
}

// =============================================================================
// Parsing
// =============================================================================

pub(crate) fn parse(registry: &Registry, entity: &str, raw: &Value) -> FilterResult<ParsedFilter> {
    let entry = registry.entry(entity)?;
    let object = raw
        .as_object()
        .ok_or_else(|| FilterError::invalid_shape(entity, None, "filter must be an object"))?;

    let mut entries = Vec::with_capacity(object.len());
    for (key, value) in object {
        if entry.references(key) {
            let nested = match value {
                Value::Null => ParsedFilter::empty(key),
                Value::Object(_) => parse(registry, key, value)?,
                _ => {
                    return Err(FilterError::invalid_shape(
                        entity,
                        Some(key),
                        "reference filter must be an object or null",
                    ))
                }
            };
            entries.push(FilterEntry::Reference(nested));
        } else {
            entries.push(FilterEntry::Field(parse_field(entry, key, value)?));
        }
    }

    Ok(ParsedFilter {
        entity: entity.to_string(),
        entries,
    })
}

fn parse_field(entry: &EntityEntry, key: &str, value: &Value) -> FilterResult<FieldFilter> {
    let entity = entry.name();
    let spec = entry
        .field(key)
        .ok_or_else(|| FilterError::invalid_shape(entity, Some(key), "unknown filter key"))?;
    let column = spec
        .column
        .clone()
        .ok_or_else(|| FilterError::invalid_shape(entity, Some(key), "field is not filterable"))?;

    let operators = value.as_object().ok_or_else(|| {
        FilterError::invalid_shape(entity, Some(key), "expected an object of filter operators")
    })?;
    if operators.is_empty() {
        return Err(FilterError::invalid_shape(
            entity,
            Some(key),
            "at least one filter operator must be provided",
        ));
    }

    let conditions = parse_conditions(entity, key, spec.kind, operators)?;
    Ok(FieldFilter {
        key: key.to_string(),
        column,
        kind: spec.kind,
        conditions,
    })
}

fn parse_conditions(
    entity: &str,
    key: &str,
    kind: FieldKind,
    operators: &Map<String, Value>,
) -> FilterResult<Vec<Condition>> {
    operators
        .iter()
        .map(|(name, operand)| {
            let path = format!("{key}.{name}");
            let operator: FilterOperator = name.parse().map_err(|_| {
                FilterError::invalid_shape(entity, Some(&path), "unknown filter operator")
            })?;
            if !kind.allows(operator) {
                return Err(FilterError::invalid_shape(
                    entity,
                    Some(&path),
                    format!("operator not allowed on {kind} fields"),
                ));
            }
            let operand = parse_operand(kind, operator, operand)
                .map_err(|reason| FilterError::invalid_shape(entity, Some(&path), reason))?;
            Ok(Condition { operator, operand })
        })
        .collect()
}

fn parse_operand(kind: FieldKind, operator: FilterOperator, raw: &Value) -> Result<Operand, String> {
    if raw.is_null() {
        return Err("value must not be null".to_string());
    }

    match operator {
        FilterOperator::IsNull | FilterOperator::IsNotNull => raw
            .as_bool()
            .map(Operand::Flag)
            .ok_or_else(|| "expected a boolean flag".to_string()),
        FilterOperator::In | FilterOperator::NotIn => {
            let items = raw
                .as_array()
                .ok_or_else(|| format!("expected an array of {kind} values"))?;
            items
                .iter()
                .map(|item| parse_scalar(kind, item))
                .collect::<Result<Vec<_>, _>>()
                .map(Operand::List)
        }
        _ => parse_scalar(kind, raw).map(Operand::Value),
    }
}

fn parse_scalar(kind: FieldKind, raw: &Value) -> Result<OperandValue, String> {
    let mismatch = || format!("expected a {kind} value");
    match kind {
        FieldKind::String => raw
            .as_str()
            .map(|s| OperandValue::Text(s.to_string()))
            .ok_or_else(mismatch),
        FieldKind::Number => match raw {
            Value::Number(n) => n
                .as_i64()
                .map(OperandValue::Integer)
                .or_else(|| n.as_f64().map(OperandValue::Float))
                .ok_or_else(mismatch),
            _ => Err(mismatch()),
        },
        FieldKind::Boolean => raw.as_bool().map(OperandValue::Boolean).ok_or_else(mismatch),
        FieldKind::Date => {
            let text = raw.as_str().ok_or_else(mismatch)?;
            parse_date(text)
                .map(OperandValue::Date)
                .ok_or_else(|| format!("invalid date: {text}"))
        }
    }
}

/// Accepts RFC 3339 timestamps, `YYYY-MM-DDTHH:MM:SS[.fff]` (taken as UTC),
/// and bare `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
