//! Domain registry: the static table of filterable entities.
//!
//! Each [`EntityEntry`] knows its table, how domain keys translate to columns,
//! which keys reference other entities, and how to validate a raw filter. A
//! [`Registry`] is built once (from TOML or the builder) and is immutable
//! afterwards, so it can be shared freely between concurrent compiles.
//!
//! ```toml
//! [entities.user]
//! table = "users"
//! references = ["address"]
//!
//! [entities.user.fields]
//! email = "string"
//! firstName = { kind = "string", column = "first_name" }
//! passwordHash = { kind = "string", hidden = true }
//! ```

mod catalog;
mod field;
mod filter;

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;

use crate::error::{FilterError, FilterResult};

pub use catalog::{catalog, CATALOGS};
pub use field::{FieldDef, FieldKind, FieldSpec};
pub use filter::{
    parse_date, Condition, FieldFilter, FilterEntry, KeyPartition, Operand, OperandValue,
    ParsedFilter,
};

/// Errors raised while building a registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Failed to read registry file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse registry: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Duplicate entity: {0}")]
    DuplicateEntity(String),

    #[error("Duplicate field {field} on entity {entity}")]
    DuplicateField { entity: String, field: String },

    #[error("Entity {entity} references unregistered entity {reference}")]
    UnknownReference { entity: String, reference: String },

    #[error("Entity {0} references itself")]
    SelfReference(String),

    #[error("Entity {entity} declares {key} as both a field and a reference")]
    AmbiguousKey { entity: String, key: String },

    #[error("Unknown catalog: {0}")]
    UnknownCatalog(String),
}

// =============================================================================
// Entries
// =============================================================================

/// Static configuration for one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityEntry {
    name: String,
    table: String,
    fields: BTreeMap<String, FieldSpec>,
    references: Vec<String>,
}

impl EntityEntry {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn field(&self, key: &str) -> Option<&FieldSpec> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldSpec)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Column for a domain key. `None` for unknown, hidden and reference keys.
    pub fn translate_key(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(|f| f.column.as_deref())
    }

    /// Whether `key` is a direct field rather than a reference to another entity.
    pub fn is_domain_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Whether `key` names an entity this one filters through.
    pub fn references(&self, key: &str) -> bool {
        self.references.iter().any(|r| r == key)
    }

    pub fn reference_keys(&self) -> &[String] {
        &self.references
    }
}

// =============================================================================
// Definitions
// =============================================================================

/// Unvalidated entity definition, as written in TOML or via the builder.
#[derive(Debug, Clone, Default, PartialEq)]
#[must_use = "builders have no effect until used"]
pub struct EntityDef {
    pub table: String,
    pub fields: Vec<(String, FieldDef)>,
    pub references: Vec<String>,
}

impl EntityDef {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.into(),
            ..Self::default()
        }
    }

    pub fn field(mut self, key: &str, kind: FieldKind) -> Self {
        self.fields.push((key.into(), FieldDef::Kind(kind)));
        self
    }

    pub fn column(mut self, key: &str, kind: FieldKind, column: &str) -> Self {
        self.fields.push((
            key.into(),
            FieldDef::Detailed {
                kind,
                column: Some(column.into()),
                hidden: false,
            },
        ));
        self
    }

    pub fn hidden(mut self, key: &str, kind: FieldKind) -> Self {
        self.fields.push((
            key.into(),
            FieldDef::Detailed {
                kind,
                column: None,
                hidden: true,
            },
        ));
        self
    }

    pub fn references(mut self, entity: &str) -> Self {
        self.references.push(entity.into());
        self
    }
}

#[derive(Debug, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    entities: BTreeMap<String, RawEntity>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawEntity {
    table: String,
    #[serde(default)]
    references: Vec<String>,
    #[serde(default)]
    fields: BTreeMap<String, FieldDef>,
}

impl From<RawEntity> for EntityDef {
    fn from(raw: RawEntity) -> Self {
        EntityDef {
            table: raw.table,
            fields: raw.fields.into_iter().collect(),
            references: raw.references,
        }
    }
}

/// Collects entity definitions and validates them as a whole.
#[derive(Debug, Clone, Default)]
#[must_use = "builders have no effect until used"]
pub struct RegistryBuilder {
    entities: Vec<(String, EntityDef)>,
}

impl RegistryBuilder {
    pub fn entity(mut self, name: &str, def: EntityDef) -> Self {
        self.entities.push((name.into(), def));
        self
    }

    pub fn build(self) -> Result<Registry, RegistryError> {
        let names: HashSet<&str> = self.entities.iter().map(|(n, _)| n.as_str()).collect();
        let mut entities = BTreeMap::new();

        for (name, def) in &self.entities {
            if entities.contains_key(name) {
                return Err(RegistryError::DuplicateEntity(name.clone()));
            }

            let mut fields = BTreeMap::new();
            for (key, field) in &def.fields {
                if fields.insert(key.clone(), field.resolve(key)).is_some() {
                    return Err(RegistryError::DuplicateField {
                        entity: name.clone(),
                        field: key.clone(),
                    });
                }
            }

            for reference in &def.references {
                if reference == name {
                    return Err(RegistryError::SelfReference(name.clone()));
                }
                if !names.contains(reference.as_str()) {
                    return Err(RegistryError::UnknownReference {
                        entity: name.clone(),
                        reference: reference.clone(),
                    });
                }
                if fields.contains_key(reference) {
                    return Err(RegistryError::AmbiguousKey {
                        entity: name.clone(),
                        key: reference.clone(),
                    });
                }
            }

            entities.insert(
                name.clone(),
                EntityEntry {
                    name: name.clone(),
                    table: def.table.clone(),
                    fields,
                    references: def.references.clone(),
                },
            );
        }

        tracing::debug!(entities = entities.len(), "built domain registry");
        Ok(Registry { entities })
    }
}

// =============================================================================
// Registry
// =============================================================================

/// Immutable set of entity entries keyed by entity name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Registry {
    entities: BTreeMap<String, EntityEntry>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Parse a registry from TOML text.
    pub fn from_toml_str(source: &str) -> Result<Self, RegistryError> {
        let file: RegistryFile = toml::from_str(source)?;
        file.entities
            .into_iter()
            .fold(Registry::builder(), |builder, (name, raw)| {
                builder.entity(&name, raw.into())
            })
            .build()
    }

    /// Load a registry from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RegistryError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| RegistryError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// The built-in recruiting catalog, built on first use.
    pub fn recruiting() -> Result<&'static Registry, RegistryError> {
        catalog::recruiting()
    }

    /// Look up an entity's entry.
    ///
    /// # Errors
    ///
    /// [`FilterError::UnknownDomain`] when `entity` is not registered.
    pub fn entry(&self, entity: &str) -> FilterResult<&EntityEntry> {
        self.entities
            .get(entity)
            .ok_or_else(|| FilterError::UnknownDomain(entity.to_string()))
    }

    pub fn is_registered(&self, entity: &str) -> bool {
        self.entities.contains_key(entity)
    }

    pub fn entities(&self) -> impl Iterator<Item = &EntityEntry> {
        self.entities.values()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Validate a raw filter for `entity`, recursing into reference keys.
    ///
    /// # Errors
    ///
    /// [`FilterError::UnknownDomain`] for an unregistered entity and
    /// [`FilterError::InvalidFilterShape`] for anything that does not match the
    /// entity's fields and operators.
    pub fn parse_filter(&self, entity: &str, raw: &Value) -> FilterResult<ParsedFilter> {
        filter::parse(self, entity, raw)
    }
}
