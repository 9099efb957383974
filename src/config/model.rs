// src/config/model.rs

use std::time::Duration;

use serde::Deserialize;

use crate::engine::controller::{ControllerOptions, DEFAULT_ARTIFACT_NAME, DEFAULT_POLL_INTERVAL};
use crate::types::ShellKind;

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [monitor]
/// poll_interval = "5s"
///
/// [output]
/// file_name = "output.txt"
/// append = false
///
/// [task]
/// label = "taskslot"
/// shell = "sh"
/// ```
///
/// All sections are optional and have the defaults shown above.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub monitor: MonitorSection,

    #[serde(default)]
    pub output: OutputSection,

    #[serde(default)]
    pub task: TaskSection,
}

/// `[monitor]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorSection {
    /// How long to wait after a command starts before reporting it as still
    /// running. Duration string like `"250ms"`, `"5s"`, `"1m"`.
    #[serde(default = "default_poll_interval")]
    pub poll_interval: String,
}

fn default_poll_interval() -> String {
    format!("{}s", DEFAULT_POLL_INTERVAL.as_secs())
}

impl Default for MonitorSection {
    fn default() -> Self {
        Self {
            poll_interval: default_poll_interval(),
        }
    }
}

/// `[output]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OutputSection {
    /// Name of the artifact file created inside the working directory.
    #[serde(default = "default_file_name")]
    pub file_name: String,

    /// Append to the artifact (`tee -a`) instead of truncating it.
    #[serde(default)]
    pub append: bool,
}

fn default_file_name() -> String {
    DEFAULT_ARTIFACT_NAME.to_string()
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            file_name: default_file_name(),
            append: false,
        }
    }
}

/// `[task]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TaskSection {
    /// Label attached to every execution (shows up in logs).
    #[serde(default = "default_label")]
    pub label: String,

    #[serde(default)]
    pub shell: ShellKind,
}

fn default_label() -> String {
    "taskslot".to_string()
}

impl Default for TaskSection {
    fn default() -> Self {
        Self {
            label: default_label(),
            shell: ShellKind::default(),
        }
    }
}

/// Validated configuration.
///
/// Build one from a [`RawConfigFile`] with `ConfigFile::try_from`, which
/// parses the poll interval and checks the output file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    pub poll_interval: Duration,
    pub output: OutputSection,
    pub task: TaskSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        poll_interval: Duration,
        output: OutputSection,
        task: TaskSection,
    ) -> Self {
        Self {
            poll_interval,
            output,
            task,
        }
    }

    pub fn controller_options(&self) -> ControllerOptions {
        ControllerOptions {
            poll_interval: self.poll_interval,
            artifact_name: self.output.file_name.clone(),
            append: self.output.append,
            label: self.task.label.clone(),
            shell: self.task.shell,
        }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::new_unchecked(
            DEFAULT_POLL_INTERVAL,
            OutputSection::default(),
            TaskSection::default(),
        )
    }
}

/// Parse a simple duration string like `"3s"`, `"250ms"`, `"1m"`, `"2h"`.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    // Find the boundary between digits and suffix.
    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| "duration missing unit suffix".to_string())?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
    let unit = unit_part.trim().to_lowercase();

    match unit.as_str() {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        "m" => Ok(Duration::from_secs(value * 60)),
        "h" => Ok(Duration::from_secs(value * 60 * 60)),
        _ => Err(format!(
            "unsupported duration unit '{}'; expected ms, s, m, or h",
            unit
        )),
    }
}
