//! Configuration module for filterc.
//!
//! Handles the settings file, environment variable expansion, and registry
//! selection.

mod settings;

pub use settings::{
    expand_env_vars, CompilerSettings, LoggingSettings, RegistrySettings, Settings, SettingsError,
};
