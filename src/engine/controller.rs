// src/engine/controller.rs

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

use crate::errors::{Result, TaskslotError};
use crate::exec::shell::wrap_with_tee;
use crate::exec::{ShellTask, TaskRuntime};
use crate::fs::FileSystem;
use crate::types::ShellKind;

use super::monitor::CompletionMonitor;
use super::poller::run_monitor;
use super::report::Report;
use super::slot::ExecutionSlot;
use super::{ExecutionHandle, ExecutionId};

/// Default period between artifact polls once a command has started.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Default fixed name of the output artifact inside the working directory.
pub const DEFAULT_ARTIFACT_NAME: &str = "output.txt";

/// Knobs for an [`ExecutionController`], usually built from `ConfigFile`.
#[derive(Debug, Clone)]
pub struct ControllerOptions {
    pub poll_interval: Duration,
    pub artifact_name: String,
    /// Append to the artifact instead of truncating it on each launch.
    pub append: bool,
    pub label: String,
    pub shell: ShellKind,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            artifact_name: DEFAULT_ARTIFACT_NAME.to_string(),
            append: false,
            label: "taskslot".to_string(),
            shell: ShellKind::default(),
        }
    }
}

/// Owns the single execution slot and launches commands through a
/// [`TaskRuntime`].
///
/// Each launch gets its own completion monitor running as a Tokio task and
/// its own [`PendingReport`]; a monitor left behind by a preempted execution
/// can only ever resolve its own request.
pub struct ExecutionController<R: TaskRuntime> {
    runtime: R,
    fs: Arc<dyn FileSystem>,
    slot: ExecutionSlot,
    options: ControllerOptions,
}

impl<R: TaskRuntime> fmt::Debug for ExecutionController<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionController")
            .field("slot", &self.slot)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<R: TaskRuntime> ExecutionController<R> {
    pub fn new(runtime: R, fs: Arc<dyn FileSystem>, options: ControllerOptions) -> Self {
        Self {
            runtime,
            fs,
            slot: ExecutionSlot::new(),
            options,
        }
    }

    pub fn options(&self) -> &ControllerOptions {
        &self.options
    }

    /// The most recently launched execution, if any.
    pub fn current(&self) -> Option<&ExecutionHandle> {
        self.slot.current()
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    /// Path of the output artifact for a given working directory.
    pub fn artifact_path(&self, working_dir: &Path) -> PathBuf {
        working_dir.join(&self.options.artifact_name)
    }

    /// Run `command` in `workspace_root` and wait for its report text.
    ///
    /// Resolves after the first poll interval if the command is still
    /// running, or as soon as it ends, whichever comes first.
    pub async fn execute_task(&mut self, command: &str, workspace_root: &Path) -> Result<String> {
        let pending = self.run(command, workspace_root).await?;
        let report = pending.wait().await?;
        Ok(report.to_string())
    }

    /// Preempt the current execution (best effort), launch `command`, and
    /// return the pending report for this request.
    ///
    /// Only a launch failure is returned as an error; a failed termination of
    /// the previous execution is logged and the launch goes ahead.
    pub async fn run(&mut self, command: &str, working_dir: &Path) -> Result<PendingReport> {
        if !self.fs.is_dir(working_dir) {
            return Err(TaskslotError::InvalidWorkingDirectory(
                working_dir.to_path_buf(),
            ));
        }

        let artifact = self.artifact_path(working_dir);
        let wrapped = wrap_with_tee(self.options.shell, command, &artifact, self.options.append);

        self.terminate_current().await;

        // Subscribe before launching so the start event cannot be missed.
        let events = self.runtime.subscribe();

        let task = ShellTask {
            label: self.options.label.clone(),
            command: wrapped,
            shell: self.options.shell,
            working_dir: working_dir.to_path_buf(),
        };

        let handle = match self.runtime.execute(task).await {
            Ok(handle) => handle,
            Err(err) => {
                error!(cmd = %command, error = %err, "failed to launch command");
                return Err(err);
            }
        };

        info!(
            execution = %handle.id,
            label = %handle.label,
            cmd = %command,
            artifact = ?artifact,
            "command launched"
        );

        let execution = handle.id;
        self.slot.occupy(handle);

        let monitor = CompletionMonitor::new(execution, artifact);
        let fs = Arc::clone(&self.fs);
        let poll_interval = self.options.poll_interval;
        let (tx, rx) = oneshot::channel::<Report>();

        tokio::spawn(async move {
            let report = run_monitor(monitor, events, fs, poll_interval).await;
            if tx.send(report).is_err() {
                debug!(execution = %execution, "report receiver dropped before resolution");
            }
        });

        Ok(PendingReport { execution, rx })
    }

    /// Terminate whatever occupies the slot. Used at teardown.
    pub async fn shutdown(&mut self) {
        self.terminate_current().await;
        self.slot.take();
    }

    async fn terminate_current(&mut self) {
        let Some(previous) = self.slot.current().map(|h| h.id) else {
            return;
        };

        info!(execution = %previous, "terminating previous execution");
        if let Err(err) = self.runtime.terminate(previous).await {
            warn!(
                execution = %previous,
                error = %err,
                "failed to terminate previous execution; continuing"
            );
        }
    }
}

/// The one outstanding result of a [`ExecutionController::run`] call.
#[derive(Debug)]
pub struct PendingReport {
    execution: ExecutionId,
    rx: oneshot::Receiver<Report>,
}

impl PendingReport {
    pub fn execution(&self) -> ExecutionId {
        self.execution
    }

    /// Wait for the monitor to resolve.
    pub async fn wait(self) -> Result<Report> {
        let execution = self.execution;
        self.rx
            .await
            .map_err(|_| TaskslotError::MonitorDropped(execution))
    }
}
