// src/config/validate.rs

use std::time::Duration;

use crate::config::model::{parse_duration, ConfigFile, RawConfigFile};
use crate::errors::{Result, TaskslotError};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::TaskslotError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let poll_interval = validate_poll_interval(&raw.monitor.poll_interval)?;
        validate_file_name(&raw.output.file_name)?;
        validate_label(&raw.task.label)?;
        Ok(ConfigFile::new_unchecked(poll_interval, raw.output, raw.task))
    }
}

/// Validate a raw config without keeping the result.
pub fn validate_config(cfg: &RawConfigFile) -> Result<()> {
    ConfigFile::try_from(cfg.clone()).map(|_| ())
}

pub fn validate_poll_interval(raw: &str) -> Result<Duration> {
    let interval = parse_duration(raw).map_err(|e| {
        TaskslotError::ConfigError(format!("[monitor].poll_interval: {e}"))
    })?;

    if interval.is_zero() {
        return Err(TaskslotError::ConfigError(format!(
            "[monitor].poll_interval must be greater than zero (got {raw:?})"
        )));
    }

    Ok(interval)
}

fn validate_file_name(name: &str) -> Result<()> {
    let name = name.trim();
    if name.is_empty() {
        return Err(TaskslotError::ConfigError(
            "[output].file_name must not be empty".to_string(),
        ));
    }

    // The artifact always lives directly in the working directory.
    if name.contains('/') || name.contains('\\') || name == "." || name == ".." {
        return Err(TaskslotError::ConfigError(format!(
            "[output].file_name must be a plain file name, got {name:?}"
        )));
    }

    Ok(())
}

fn validate_label(label: &str) -> Result<()> {
    if label.trim().is_empty() {
        return Err(TaskslotError::ConfigError(
            "[task].label must not be empty".to_string(),
        ));
    }
    Ok(())
}
