// src/engine/mod.rs

//! Execution engine for taskslot.
//!
//! This module ties together:
//! - the single execution slot (at most one tracked command at a time)
//! - the execution controller that preempts and launches commands
//! - the completion monitor that turns lifecycle events and poll ticks into
//!   exactly one [`Report`] per request
//!
//! The pure monitor state machine lives in [`monitor`]; the async shell that
//! drives it from timers and event subscriptions is in [`poller`].

use std::fmt;

/// Opaque identity of one launched execution.
///
/// Handed out by the task runtime at launch and compared by value to route
/// lifecycle events to the right monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExecutionId(pub u64);

impl fmt::Display for ExecutionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle for a launched execution, as returned by the task runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionHandle {
    pub id: ExecutionId,
    /// Human-readable label (from `[task].label`).
    pub label: String,
    /// The wrapped command line actually handed to the shell.
    pub command: String,
}

/// Lifecycle notifications delivered by the task runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// The execution's process is running.
    Started { execution: ExecutionId },
    /// The execution's process exited or was terminated.
    Ended {
        execution: ExecutionId,
        exit_code: Option<i32>,
    },
}

impl LifecycleEvent {
    pub fn execution(&self) -> ExecutionId {
        match self {
            LifecycleEvent::Started { execution } => *execution,
            LifecycleEvent::Ended { execution, .. } => *execution,
        }
    }
}

pub mod controller;
pub mod monitor;
pub mod poller;
pub mod report;
pub mod slot;

pub use controller::{ControllerOptions, ExecutionController, PendingReport};
pub use monitor::{CompletionMonitor, MonitorCommand, MonitorState};
pub use poller::run_monitor;
pub use report::Report;
pub use slot::ExecutionSlot;
