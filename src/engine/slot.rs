// src/engine/slot.rs

use super::ExecutionHandle;

/// Single-occupancy record of the most recently launched execution.
///
/// Not cleared when the command exits on its own: the handle stays as a
/// "last execution" marker until the next launch replaces it, so the next
/// request always attempts to terminate it first.
#[derive(Debug, Default)]
pub struct ExecutionSlot {
    current: Option<ExecutionHandle>,
}

impl ExecutionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&ExecutionHandle> {
        self.current.as_ref()
    }

    /// Record a new execution, returning the one it replaces.
    pub fn occupy(&mut self, handle: ExecutionHandle) -> Option<ExecutionHandle> {
        self.current.replace(handle)
    }

    pub fn take(&mut self) -> Option<ExecutionHandle> {
        self.current.take()
    }
}
