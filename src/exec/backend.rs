// src/exec/backend.rs

//! Pluggable task runtime abstraction.
//!
//! The execution controller talks to a `TaskRuntime` instead of spawning
//! processes itself. This makes it easy to swap in a fake runtime in tests
//! while keeping the production implementation in [`super::process`].
//!
//! - `ShellTaskRuntime` is the default implementation used by `taskslot`.
//!   It spawns the wrapped command through a shell and broadcasts
//!   `LifecycleEvent`s as the process starts and exits.
//! - Tests can provide their own `TaskRuntime` that, for example, records
//!   launches and terminations and emits lifecycle events on demand.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use tokio::sync::broadcast;

use crate::engine::{ExecutionHandle, ExecutionId, LifecycleEvent};
use crate::errors::Result;
use crate::types::ShellKind;

/// A fully wrapped command ready to hand to a task runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellTask {
    pub label: String,
    /// Script passed to the shell (already includes the `tee` redirection).
    pub command: String,
    pub shell: ShellKind,
    pub working_dir: PathBuf,
}

/// Host facility that runs shell tasks and reports their lifecycle.
pub trait TaskRuntime: Send {
    /// Request execution of `task`.
    ///
    /// An error here means the command could not be started at all and is
    /// fatal for the request that asked for it.
    fn execute(
        &mut self,
        task: ShellTask,
    ) -> Pin<Box<dyn Future<Output = Result<ExecutionHandle>> + Send + '_>>;

    /// Request termination of a previously launched execution.
    ///
    /// Callers treat failures as non-fatal.
    fn terminate(
        &mut self,
        execution: ExecutionId,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;

    /// Subscribe to start/end events for all executions of this runtime.
    ///
    /// Dropping the receiver releases the subscription.
    fn subscribe(&self) -> broadcast::Receiver<LifecycleEvent>;
}
