// src/config/mod.rs

//! Configuration loading and validation for taskslot.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate values like the poll interval and artifact name (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, load_or_default};
pub use model::{
    parse_duration, ConfigFile, MonitorSection, OutputSection, RawConfigFile, TaskSection,
};
pub use validate::{validate_config, validate_poll_interval};
