// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `taskslot`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "taskslot",
    version,
    about = "Run one shell command at a time and report on its captured output.",
    long_about = "Runs a shell command with its combined output teed into a fixed \
                  artifact file, preempting any command that is still running. \
                  Prints a report once the command ends or the poll interval \
                  elapses. Without COMMAND, commands are read line by line from \
                  stdin. The running command is terminated when taskslot exits."
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Taskslot.toml` in the current working directory, if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory to run commands in (the artifact is written here).
    ///
    /// Default: the current working directory.
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Override `[monitor].poll_interval` (e.g. "500ms", "5s").
    #[arg(long, value_name = "DURATION")]
    pub poll_interval: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `TASKSLOT_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Resolve config and print the effective settings, but don't run anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Command to run once. Joined with spaces and handed to the shell.
    #[arg(
        value_name = "COMMAND",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub command: Vec<String>,
}

impl CliArgs {
    /// The one-shot command, if any was given.
    pub fn command_line(&self) -> Option<String> {
        if self.command.is_empty() {
            None
        } else {
            Some(self.command.join(" "))
        }
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
