// tests/config_loading.rs

mod common;
use crate::common::init_tracing;

use std::error::Error;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use tempfile::NamedTempFile;

use taskslot::cli::{CliArgs, LogLevel};
use taskslot::config::{load_and_validate, load_or_default, parse_duration, ConfigFile};
use taskslot::errors::TaskslotError;
use taskslot::logging::resolve_level;
use taskslot::types::ShellKind;
use taskslot_test_utils::builders::ConfigFileBuilder;

type TestResult = Result<(), Box<dyn Error>>;

fn config_file(contents: &str) -> Result<NamedTempFile, Box<dyn Error>> {
    let mut file = NamedTempFile::new()?;
    write!(file, "{contents}")?;
    Ok(file)
}

#[test]
fn demo_config_is_parsed_correctly() -> TestResult {
    init_tracing();

    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let cfg = load_and_validate(manifest_dir.join("demos/Taskslot.toml"))?;

    assert_eq!(cfg.poll_interval, Duration::from_secs(3));
    assert_eq!(cfg.output.file_name, "taskslot-output.txt");
    assert!(!cfg.output.append);
    assert_eq!(cfg.task.label, "demo");
    assert_eq!(cfg.task.shell, ShellKind::Bash);

    Ok(())
}

#[test]
fn empty_file_uses_defaults() -> TestResult {
    let file = config_file("")?;
    let cfg = load_and_validate(file.path())?;

    assert_eq!(cfg, ConfigFile::default());
    assert_eq!(cfg.poll_interval, Duration::from_secs(5));
    assert_eq!(cfg.output.file_name, "output.txt");
    assert_eq!(cfg.task.label, "taskslot");

    Ok(())
}

#[test]
fn controller_options_follow_the_config() {
    let cfg = ConfigFileBuilder::new()
        .poll_interval("750ms")
        .file_name("log.txt")
        .append(true)
        .label("builder")
        .shell(ShellKind::Bash)
        .build();

    let options = cfg.controller_options();
    assert_eq!(options.poll_interval, Duration::from_millis(750));
    assert_eq!(options.artifact_name, "log.txt");
    assert!(options.append);
    assert_eq!(options.label, "builder");
    assert_eq!(options.shell, ShellKind::Bash);
}

#[test]
fn invalid_poll_interval_is_a_config_error() -> TestResult {
    let file = config_file("[monitor]\npoll_interval = \"soon\"\n")?;

    match load_and_validate(file.path()) {
        Err(TaskslotError::ConfigError(msg)) => assert!(msg.contains("poll_interval")),
        other => panic!("expected ConfigError, got {other:?}"),
    }
    Ok(())
}

#[test]
fn zero_poll_interval_is_rejected() {
    let raw = ConfigFileBuilder::new().poll_interval("0s").raw();

    match ConfigFile::try_from(raw) {
        Err(TaskslotError::ConfigError(msg)) => assert!(msg.contains("greater than zero")),
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn artifact_name_must_be_a_plain_file_name() {
    for bad in ["", "  ", "logs/output.txt", "..", "a\\b"] {
        let raw = ConfigFileBuilder::new().file_name(bad).raw();
        assert!(
            matches!(ConfigFile::try_from(raw), Err(TaskslotError::ConfigError(_))),
            "file name {bad:?} should be rejected"
        );
    }
}

#[test]
fn unknown_shell_is_a_toml_error() -> TestResult {
    let file = config_file("[task]\nshell = \"fish\"\n")?;

    let result = load_and_validate(file.path());
    assert!(
        matches!(result, Err(TaskslotError::TomlError(_))),
        "expected TomlError, got {result:?}"
    );
    Ok(())
}

#[test]
fn explicit_missing_config_is_an_error() {
    let result = load_or_default(Some(Path::new("/definitely/not/Taskslot.toml")));
    assert!(matches!(result, Err(TaskslotError::ConfigError(_))));
}

#[test]
fn duration_strings_support_common_units() {
    assert_eq!(parse_duration("250ms"), Ok(Duration::from_millis(250)));
    assert_eq!(parse_duration(" 5s "), Ok(Duration::from_secs(5)));
    assert_eq!(parse_duration("2m"), Ok(Duration::from_secs(120)));
    assert_eq!(parse_duration("1h"), Ok(Duration::from_secs(3600)));
    assert!(parse_duration("5").is_err());
    assert!(parse_duration("5d").is_err());
    assert!(parse_duration("").is_err());
}

#[test]
fn shell_names_parse_case_insensitively() {
    assert_eq!("SH".parse::<ShellKind>(), Ok(ShellKind::Sh));
    assert_eq!("pwsh".parse::<ShellKind>(), Ok(ShellKind::PowerShell));
    assert!("zsh".parse::<ShellKind>().is_err());
}

#[test]
fn log_level_prefers_the_cli_flag() {
    assert_eq!(
        resolve_level(Some(LogLevel::Debug), Some("error")),
        tracing::Level::DEBUG
    );
    assert_eq!(resolve_level(None, Some("warning")), tracing::Level::WARN);
    assert_eq!(resolve_level(None, Some("bogus")), tracing::Level::INFO);
    assert_eq!(resolve_level(None, None), tracing::Level::INFO);
}

#[test]
fn cli_collects_the_trailing_command() -> TestResult {
    let args = CliArgs::try_parse_from([
        "taskslot",
        "--cwd",
        "/tmp",
        "--poll-interval",
        "1s",
        "ls",
        "-la",
        "src",
    ])?;

    assert_eq!(args.cwd, Some(PathBuf::from("/tmp")));
    assert_eq!(args.poll_interval.as_deref(), Some("1s"));
    assert_eq!(args.command_line().as_deref(), Some("ls -la src"));

    let interactive = CliArgs::try_parse_from(["taskslot", "--dry-run"])?;
    assert!(interactive.dry_run);
    assert_eq!(interactive.command_line(), None);

    Ok(())
}
