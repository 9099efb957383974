// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod types;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error, info};

use crate::cli::CliArgs;
use crate::config::{load_or_default, validate_poll_interval, ConfigFile};
use crate::engine::ExecutionController;
use crate::exec::ShellTaskRuntime;
use crate::fs::{FileSystem, RealFileSystem};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (plus CLI overrides)
/// - the shell task runtime and the execution controller
/// - one-shot or line-by-line command input
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let mut cfg = load_or_default(args.config.as_deref())?;
    if let Some(raw) = args.poll_interval.as_deref() {
        cfg.poll_interval = validate_poll_interval(raw)?;
    }

    let workspace_root = match args.cwd.clone() {
        Some(dir) => dir,
        None => std::env::current_dir().context("resolving current directory")?,
    };

    if args.dry_run {
        print_dry_run(&cfg, &workspace_root, args.command_line().as_deref());
        return Ok(());
    }

    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let mut controller =
        ExecutionController::new(ShellTaskRuntime::new(), fs, cfg.controller_options());

    let result = match args.command_line() {
        Some(command) => run_once(&mut controller, &command, &workspace_root).await,
        None => run_interactive(&mut controller, &workspace_root).await,
    };

    controller.shutdown().await;
    result
}

/// Run a single command and print its report.
async fn run_once(
    controller: &mut ExecutionController<ShellTaskRuntime>,
    command: &str,
    workspace_root: &Path,
) -> Result<()> {
    tokio::select! {
        report = controller.execute_task(command, workspace_root) => {
            println!("{}", report?);
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Ctrl-C received; stopping");
        }
    }
    Ok(())
}

/// Read commands from stdin, one per line. Each one preempts the previous.
///
/// A command that fails to launch is reported and the loop continues.
async fn run_interactive(
    controller: &mut ExecutionController<ShellTaskRuntime>,
    workspace_root: &Path,
) -> Result<()> {
    info!(root = ?workspace_root, "reading commands from stdin");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("reading command from stdin")?,
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl-C received; stopping");
                break;
            }
        };

        let Some(line) = line else {
            debug!("stdin closed");
            break;
        };

        let command = line.trim();
        if command.is_empty() {
            continue;
        }

        tokio::select! {
            report = controller.execute_task(command, workspace_root) => match report {
                Ok(text) => println!("{text}"),
                Err(err) => {
                    error!(cmd = %command, error = %err, "command failed");
                    eprintln!("taskslot: {err}");
                }
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl-C received; stopping");
                break;
            }
        }
    }

    Ok(())
}

/// Simple dry-run output: print the effective settings.
fn print_dry_run(cfg: &ConfigFile, workspace_root: &Path, command: Option<&str>) {
    println!("taskslot dry-run");
    println!("  monitor.poll_interval = {:?}", cfg.poll_interval);
    println!("  output.file_name = {}", cfg.output.file_name);
    println!("  output.append = {}", cfg.output.append);
    println!("  task.label = {}", cfg.task.label);
    println!("  task.shell = {}", cfg.task.shell);
    println!();
    println!(
        "artifact: {}",
        workspace_root.join(&cfg.output.file_name).display()
    );
    match command {
        Some(cmd) => println!("command: {cmd}"),
        None => println!("command: <read from stdin>"),
    }

    debug!("dry-run complete (no execution)");
}
