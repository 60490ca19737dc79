//! TOML-based configuration for filterc.
//!
//! Supports a config file (filterc.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! [registry]
//! catalog = "recruiting"
//! path = "${FILTERC_REGISTRY}"
//!
//! [compiler]
//! algorithm = "graph"
//!
//! [logging]
//! filter = "domain_filter=debug"
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::compile::Algorithm;
use crate::registry::{self, Registry, RegistryError};

/// Names a settings file that overrides the search paths.
pub const CONFIG_ENV: &str = "FILTERC_CONFIG";

const LOCAL_CONFIG: &str = "filterc.toml";

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Where entity definitions come from.
    pub registry: RegistrySettings,

    /// Compiler options.
    pub compiler: CompilerSettings,

    /// Log filter used when `RUST_LOG` is unset.
    pub logging: LoggingSettings,
}

/// Registry source.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RegistrySettings {
    /// Built-in catalog, used when `path` is not set.
    pub catalog: String,

    /// Registry TOML file (supports ${ENV_VAR} expansion).
    pub path: Option<String>,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            catalog: "recruiting".to_string(),
            path: None,
        }
    }
}

impl RegistrySettings {
    /// Get the registry path with environment variables expanded.
    pub fn resolved_path(&self) -> Result<Option<PathBuf>, SettingsError> {
        self.path
            .as_deref()
            .map(|p| expand_env_vars(p).map(PathBuf::from))
            .transpose()
    }
}

/// Compiler configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CompilerSettings {
    pub algorithm: Algorithm,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `tracing_subscriber::EnvFilter` directive.
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "warn".to_string(),
        }
    }
}

impl Settings {
    /// Read settings from `path`. Missing sections take their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => SettingsError::FileNotFound(path.to_path_buf()),
            _ => SettingsError::ReadError(e),
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// Settings for the CLI: the file named by `FILTERC_CONFIG` if set, else
    /// the first of `./filterc.toml` and `<config_dir>/filterc/config.toml`
    /// that exists, else defaults.
    pub fn load() -> Result<Self, SettingsError> {
        if let Some(path) = env::var_os(CONFIG_ENV) {
            return Self::from_file(PathBuf::from(path));
        }

        match Self::search_paths().into_iter().find(|p| p.is_file()) {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading settings");
                Self::from_file(path)
            }
            None => Ok(Settings::default()),
        }
    }

    fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG)];
        paths.extend(dirs::config_dir().map(|dir| dir.join("filterc").join("config.toml")));
        paths
    }

    /// Build the configured registry: the file at `registry.path` when set,
    /// otherwise the named built-in catalog.
    pub fn load_registry(&self) -> Result<Registry, SettingsError> {
        match self.registry.resolved_path()? {
            Some(path) => {
                if !path.exists() {
                    return Err(SettingsError::FileNotFound(path));
                }
                Ok(Registry::from_file(&path)?)
            }
            None => {
                if self.registry.catalog.is_empty() {
                    return Err(SettingsError::InvalidConfig(
                        "registry.catalog or registry.path must be set".to_string(),
                    ));
                }
                Ok(registry::catalog(&self.registry.catalog)?.clone())
            }
        }
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let var_name: String = if chars.next_if_eq(&'{').is_some() {
            let name: String = chars.by_ref().take_while(|&ch| ch != '}').collect();
            name
        } else {
            // $VAR (ends at non-alphanumeric/underscore)
            let mut name = String::new();
            while let Some(ch) = chars.next_if(|ch| ch.is_alphanumeric() || *ch == '_') {
                name.push(ch);
            }
            if name.is_empty() {
                // Just a lone $, keep it
                result.push('$');
                continue;
            }
            name
        };

        let value =
            env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}
