#![allow(dead_code)]

use std::time::Duration;

use taskslot::config::{ConfigFile, RawConfigFile};
use taskslot::engine::ControllerOptions;
use taskslot::types::ShellKind;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn poll_interval(mut self, raw: &str) -> Self {
        self.config.monitor.poll_interval = raw.to_string();
        self
    }

    pub fn file_name(mut self, name: &str) -> Self {
        self.config.output.file_name = name.to_string();
        self
    }

    pub fn append(mut self, val: bool) -> Self {
        self.config.output.append = val;
        self
    }

    pub fn label(mut self, label: &str) -> Self {
        self.config.task.label = label.to_string();
        self
    }

    pub fn shell(mut self, shell: ShellKind) -> Self {
        self.config.task.shell = shell;
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Controller options with a custom poll interval and defaults otherwise.
pub fn options_with_interval(poll_interval: Duration) -> ControllerOptions {
    ControllerOptions {
        poll_interval,
        ..ControllerOptions::default()
    }
}
