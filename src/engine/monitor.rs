// src/engine/monitor.rs

//! Pure completion-monitor state machine.
//!
//! One [`CompletionMonitor`] exists per request. It consumes lifecycle
//! events and poll ticks, and returns a [`MonitorCommand`] telling the async
//! shell ([`super::poller`]) what to do next:
//!
//! ```text
//! Idle --start--> Started --tick--> Resolved (is_running = true)
//! Idle|Started --end--> Ended --read--> Resolved (is_running = false)
//! ```
//!
//! `Resolved` is terminal. Whichever of {first tick, end event} arrives
//! second finds the monitor already past the point of resolving and gets
//! [`MonitorCommand::None`] back.
//!
//! No Tokio types, no timers, no filesystem: artifact contents are handed
//! in by the caller, which keeps the race rules unit-testable.

use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use super::report::Report;
use super::{ExecutionId, LifecycleEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    /// Waiting for the start event of our execution.
    Idle,
    /// Start seen; the poll timer is armed.
    Started,
    /// End seen; the final artifact read is pending.
    Ended,
    /// Report produced. Terminal.
    Resolved,
}

/// What the async shell should do after feeding a signal into the monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorCommand {
    /// Nothing to do (unrelated, duplicate or stale signal).
    None,
    /// Arm the repeating poll timer.
    StartPolling,
    /// Cancel the timer, read the artifact and call [`CompletionMonitor::resolve`].
    Resolve { is_running: bool },
}

#[derive(Debug)]
pub struct CompletionMonitor {
    execution: ExecutionId,
    artifact_path: PathBuf,
    state: MonitorState,
    last_observed: String,
}

impl CompletionMonitor {
    /// Monitor for `execution`, comparing against empty prior content.
    pub fn new(execution: ExecutionId, artifact_path: impl Into<PathBuf>) -> Self {
        Self::with_previous_content(execution, artifact_path, String::new())
    }

    pub fn with_previous_content(
        execution: ExecutionId,
        artifact_path: impl Into<PathBuf>,
        previous: String,
    ) -> Self {
        Self {
            execution,
            artifact_path: artifact_path.into(),
            state: MonitorState::Idle,
            last_observed: previous,
        }
    }

    pub fn execution(&self) -> ExecutionId {
        self.execution
    }

    pub fn artifact_path(&self) -> &Path {
        &self.artifact_path
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    pub fn last_observed(&self) -> &str {
        &self.last_observed
    }

    pub fn is_resolved(&self) -> bool {
        self.state == MonitorState::Resolved
    }

    /// Feed a lifecycle event from the task runtime.
    pub fn on_lifecycle(&mut self, event: &LifecycleEvent) -> MonitorCommand {
        if event.execution() != self.execution {
            trace!(
                execution = %self.execution,
                other = %event.execution(),
                "ignoring lifecycle event for another execution"
            );
            return MonitorCommand::None;
        }

        match (self.state, event) {
            (MonitorState::Idle, LifecycleEvent::Started { .. }) => {
                debug!(execution = %self.execution, "execution started; polling artifact");
                self.state = MonitorState::Started;
                MonitorCommand::StartPolling
            }
            // The end event may overtake the start event; it still resolves.
            (MonitorState::Idle | MonitorState::Started, LifecycleEvent::Ended { exit_code, .. }) => {
                debug!(
                    execution = %self.execution,
                    exit_code = ?exit_code,
                    "execution ended before the first poll"
                );
                self.state = MonitorState::Ended;
                MonitorCommand::Resolve { is_running: false }
            }
            _ => MonitorCommand::None,
        }
    }

    /// Feed a poll tick.
    pub fn on_tick(&mut self) -> MonitorCommand {
        match self.state {
            MonitorState::Started => MonitorCommand::Resolve { is_running: true },
            _ => MonitorCommand::None,
        }
    }

    /// The runtime's event stream closed; no end event will ever arrive.
    pub fn on_runtime_closed(&mut self) -> MonitorCommand {
        match self.state {
            MonitorState::Idle | MonitorState::Started => {
                debug!(execution = %self.execution, "lifecycle events closed; treating as ended");
                self.state = MonitorState::Ended;
                MonitorCommand::Resolve { is_running: false }
            }
            _ => MonitorCommand::None,
        }
    }

    /// Produce the report from a fresh artifact read.
    ///
    /// A failed read keeps the last observed content and reports no change.
    /// Returns `None` once resolved, so a second resolution is a no-op.
    pub fn resolve(
        &mut self,
        is_running: bool,
        read: anyhow::Result<String>,
    ) -> Option<Report> {
        if self.is_resolved() {
            return None;
        }

        let (content, has_changes) = match read {
            Ok(current) => {
                let changed = current != self.last_observed;
                (current, changed)
            }
            Err(err) => {
                debug!(
                    execution = %self.execution,
                    artifact = ?self.artifact_path,
                    error = %err,
                    "artifact not readable; keeping previous content"
                );
                (self.last_observed.clone(), false)
            }
        };

        self.last_observed = content.clone();
        self.state = MonitorState::Resolved;

        Some(Report {
            is_running,
            artifact_path: self.artifact_path.clone(),
            content,
            has_changes,
        })
    }
}
