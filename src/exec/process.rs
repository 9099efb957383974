// src/exec/process.rs

//! Production task runtime backed by `tokio::process`.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Child;
use tokio::sync::{broadcast, oneshot};
use tracing::{debug, info, warn};

use crate::engine::{ExecutionHandle, ExecutionId, LifecycleEvent};
use crate::errors::{Result, TaskslotError};

use super::backend::{ShellTask, TaskRuntime};
use super::shell::shell_command;

/// Buffered lifecycle events per subscriber before it starts lagging.
const EVENT_CAPACITY: usize = 64;

/// Internal handle for a launched process.
///
/// - `cancel` is used to request that the process be stopped.
/// - `handle` is the Tokio task waiting on the child.
/// - `pid` is the shell's pid, which is also its process group id on Unix.
struct ActiveExecution {
    cancel: Option<oneshot::Sender<()>>,
    handle: tokio::task::JoinHandle<()>,
    pid: Option<u32>,
}

/// Runs shell tasks as child processes and broadcasts their lifecycle.
///
/// Every execution gets a fresh [`ExecutionId`]. `Started` is broadcast once
/// the child is spawned; `Ended` when it exits on its own or after it was
/// killed by [`TaskRuntime::terminate`]. Dropping the runtime kills all
/// children that are still running.
pub struct ShellTaskRuntime {
    events: broadcast::Sender<LifecycleEvent>,
    active: HashMap<ExecutionId, ActiveExecution>,
    next_id: u64,
}

impl fmt::Debug for ShellTaskRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShellTaskRuntime")
            .field("active", &self.active.len())
            .field("next_id", &self.next_id)
            .finish_non_exhaustive()
    }
}

impl Default for ShellTaskRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl ShellTaskRuntime {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            events,
            active: HashMap::new(),
            next_id: 1,
        }
    }

    fn prune_finished(&mut self) {
        self.active.retain(|_, a| !a.handle.is_finished());
    }

    fn launch(&mut self, task: ShellTask) -> Result<ExecutionHandle> {
        self.prune_finished();

        let id = ExecutionId(self.next_id);
        self.next_id += 1;

        let mut child = shell_command(task.shell, &task.command, &task.working_dir)
            .spawn()
            .map_err(|e| {
                TaskslotError::LaunchFailure(format!(
                    "spawning {} for '{}' in {:?}: {e}",
                    task.shell, task.label, task.working_dir
                ))
            })?;

        let pid = child.id();
        info!(
            execution = %id,
            label = %task.label,
            pid = ?pid,
            "spawned shell process"
        );

        // Always consume output so pipe buffers don't fill; log at debug.
        if let Some(stdout) = child.stdout.take() {
            drain_lines(id, "stdout", stdout);
        }
        if let Some(stderr) = child.stderr.take() {
            drain_lines(id, "stderr", stderr);
        }

        let (cancel_tx, cancel_rx) = oneshot::channel::<()>();
        let events = self.events.clone();
        let handle = tokio::spawn(async move {
            wait_for_exit(id, child, cancel_rx, events).await;
            debug!(execution = %id, "process watcher finished");
        });

        self.active.insert(
            id,
            ActiveExecution {
                cancel: Some(cancel_tx),
                handle,
                pid,
            },
        );

        Ok(ExecutionHandle {
            id,
            label: task.label,
            command: task.command,
        })
    }

    fn request_termination(&mut self, execution: ExecutionId) -> Result<()> {
        let Some(existing) = self.active.get_mut(&execution) else {
            return Err(TaskslotError::UnknownExecution(execution));
        };

        if existing.handle.is_finished() {
            debug!(execution = %execution, "process already exited; nothing to terminate");
            return Ok(());
        }

        match existing.cancel.take() {
            Some(cancel) => {
                if cancel.send(()).is_err() {
                    debug!(
                        execution = %execution,
                        "process finished while terminating"
                    );
                }
            }
            None => {
                debug!(
                    execution = %execution,
                    "termination already requested for this execution"
                );
            }
        }

        Ok(())
    }
}

impl TaskRuntime for ShellTaskRuntime {
    fn execute(
        &mut self,
        task: ShellTask,
    ) -> Pin<Box<dyn Future<Output = Result<ExecutionHandle>> + Send + '_>> {
        Box::pin(async move { self.launch(task) })
    }

    fn terminate(
        &mut self,
        execution: ExecutionId,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move { self.request_termination(execution) })
    }

    fn subscribe(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.events.subscribe()
    }
}

impl Drop for ShellTaskRuntime {
    fn drop(&mut self) {
        // Aborting the watcher drops the child, and `kill_on_drop` kills the
        // shell; the rest of its pipeline is signalled through the group.
        for (id, active) in self.active.drain() {
            if !active.handle.is_finished() {
                debug!(execution = %id, "runtime dropped; killing process");
                if let Some(pid) = active.pid {
                    signal_process_group(pid);
                }
                active.handle.abort();
            }
        }
    }
}

/// Wait for the child to exit or for a termination request, then broadcast
/// `Ended`.
async fn wait_for_exit(
    id: ExecutionId,
    mut child: Child,
    mut cancel_rx: oneshot::Receiver<()>,
    events: broadcast::Sender<LifecycleEvent>,
) {
    // No subscribers is fine: nobody is waiting on this execution.
    let _ = events.send(LifecycleEvent::Started { execution: id });

    let exit_code = tokio::select! {
        status_res = child.wait() => {
            match status_res {
                Ok(status) => {
                    info!(
                        execution = %id,
                        exit_code = ?status.code(),
                        success = status.success(),
                        "shell process exited"
                    );
                    status.code()
                }
                Err(e) => {
                    warn!(execution = %id, error = %e, "failed to wait for shell process");
                    None
                }
            }
        }

        cancel = &mut cancel_rx => {
            if cancel.is_ok() {
                info!(execution = %id, "termination requested; killing process");
            } else {
                debug!(execution = %id, "cancel channel closed; killing process");
            }
            if let Err(e) = kill_process_tree(&mut child).await {
                warn!(execution = %id, error = %e, "failed to kill shell process");
            }
            None
        }
    };

    let _ = events.send(LifecycleEvent::Ended {
        execution: id,
        exit_code,
    });
}

/// Kill the shell and everything in its process group, then reap it.
async fn kill_process_tree(child: &mut Child) -> std::io::Result<()> {
    if let Some(pid) = child.id() {
        if signal_process_group(pid) {
            child.wait().await?;
            return Ok(());
        }
    }
    child.kill().await
}

#[cfg(unix)]
fn signal_process_group(pid: u32) -> bool {
    // The shell was spawned with `process_group(0)`, so its pid is the pgid.
    unsafe { libc::kill(-(pid as libc::pid_t), libc::SIGKILL) == 0 }
}

#[cfg(not(unix))]
fn signal_process_group(_pid: u32) -> bool {
    false
}

/// Keep reading a child pipe to EOF, logging each line at debug.
///
/// Reading must never stop early: closing the pipe would hand `tee` a
/// SIGPIPE and kill the user's command mid-run.
fn drain_lines<R>(id: ExecutionId, stream: &'static str, reader: R)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buf);
                    debug!(execution = %id, stream, "{}", line.trim_end());
                }
                Err(err) => {
                    warn!(
                        execution = %id,
                        stream,
                        error = %err,
                        "reading output failed; discarding the rest"
                    );
                    if let Err(err) = tokio::io::copy(&mut reader, &mut tokio::io::sink()).await {
                        warn!(execution = %id, stream, error = %err, "output pipe closed early");
                    }
                    break;
                }
            }
        }
    });
}
