// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, TaskslotError};

/// Load a configuration file from a given path and return the raw config.
///
/// This only performs TOML deserialization; use [`load_and_validate`] to
/// also parse durations and check values.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| {
        TaskslotError::ConfigError(format!("reading config file at {:?}: {e}", path))
    })?;

    let config: RawConfigFile = toml::from_str(&contents)?;
    Ok(config)
}

/// Load a configuration file from path and run validation.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw = load_from_path(&path)?;
    ConfigFile::try_from(raw)
}

/// Resolve the configuration for the binary.
///
/// - An explicit path must exist and be valid.
/// - Otherwise [`default_config_path`] is used if present, and built-in
///   defaults if not.
pub fn load_or_default(explicit: Option<&Path>) -> Result<ConfigFile> {
    if let Some(path) = explicit {
        return load_and_validate(path);
    }

    let fallback = default_config_path();
    if fallback.is_file() {
        debug!(path = ?fallback, "loading default config file");
        load_and_validate(&fallback)
    } else {
        debug!(path = ?fallback, "no config file; using defaults");
        Ok(ConfigFile::default())
    }
}

/// `Taskslot.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Taskslot.toml")
}
