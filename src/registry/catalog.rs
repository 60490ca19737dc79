//! Built-in entity catalogs.

use once_cell::sync::OnceCell;

use super::{Registry, RegistryError};

const RECRUITING: &str = include_str!("recruiting.toml");

/// Names of the built-in catalogs.
pub const CATALOGS: &[&str] = &["recruiting"];

static RECRUITING_REGISTRY: OnceCell<Registry> = OnceCell::new();

pub(super) fn recruiting() -> Result<&'static Registry, RegistryError> {
    RECRUITING_REGISTRY.get_or_try_init(|| Registry::from_toml_str(RECRUITING))
}

/// Look up a built-in catalog by name.
pub fn catalog(name: &str) -> Result<&'static Registry, RegistryError> {
    match name {
        "recruiting" => recruiting(),
        other => Err(RegistryError::UnknownCatalog(other.to_string())),
    }
}
