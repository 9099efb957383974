// src/errors.rs

//! Crate-wide error aliases and helpers.

use std::path::PathBuf;

use thiserror::Error;

use crate::engine::ExecutionId;

#[derive(Error, Debug)]
pub enum TaskslotError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Working directory does not exist or is not a directory: {0:?}")]
    InvalidWorkingDirectory(PathBuf),

    /// The host runtime refused to start the command. Fatal for the request.
    #[error("Failed to launch command: {0}")]
    LaunchFailure(String),

    /// Preempting a previous execution failed. Callers log this and move on.
    #[error("Failed to terminate execution: {0}")]
    TerminationFailure(String),

    #[error("Unknown execution: {0}")]
    UnknownExecution(ExecutionId),

    #[error("Completion monitor for execution {0} stopped without a report")]
    MonitorDropped(ExecutionId),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, TaskslotError>;
