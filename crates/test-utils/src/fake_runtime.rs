use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;
use taskslot::engine::{ExecutionHandle, ExecutionId, LifecycleEvent};
use taskslot::errors::{Result, TaskslotError};
use taskslot::exec::{ShellTask, TaskRuntime};

/// One call the controller made into the runtime, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeCall {
    Execute { id: ExecutionId, task: ShellTask },
    /// A launch that was rejected (see [`FakeRuntimeProbe::fail_launches`]).
    RejectedExecute { task: ShellTask },
    Terminate(ExecutionId),
}

#[derive(Debug, Default)]
struct Flags {
    fail_launch: AtomicBool,
    fail_terminate: AtomicBool,
}

/// A fake task runtime that:
/// - records every execute/terminate call in order
/// - never spawns processes and never emits events on its own; tests drive
///   the lifecycle through the paired [`FakeRuntimeProbe`].
pub struct FakeTaskRuntime {
    events: broadcast::Sender<LifecycleEvent>,
    calls: Arc<Mutex<Vec<RuntimeCall>>>,
    flags: Arc<Flags>,
    next_id: u64,
}

/// Test-side handle for a [`FakeTaskRuntime`].
#[derive(Clone)]
pub struct FakeRuntimeProbe {
    events: broadcast::Sender<LifecycleEvent>,
    calls: Arc<Mutex<Vec<RuntimeCall>>>,
    flags: Arc<Flags>,
}

impl FakeTaskRuntime {
    pub fn new() -> (Self, FakeRuntimeProbe) {
        let (events, _) = broadcast::channel(64);
        let calls = Arc::new(Mutex::new(Vec::new()));
        let flags = Arc::new(Flags::default());

        let probe = FakeRuntimeProbe {
            events: events.clone(),
            calls: Arc::clone(&calls),
            flags: Arc::clone(&flags),
        };

        let runtime = Self {
            events,
            calls,
            flags,
            next_id: 1,
        };

        (runtime, probe)
    }
}

impl TaskRuntime for FakeTaskRuntime {
    fn execute(
        &mut self,
        task: ShellTask,
    ) -> Pin<Box<dyn Future<Output = Result<ExecutionHandle>> + Send + '_>> {
        Box::pin(async move {
            if self.flags.fail_launch.load(Ordering::SeqCst) {
                self.calls
                    .lock()
                    .unwrap()
                    .push(RuntimeCall::RejectedExecute { task });
                return Err(TaskslotError::LaunchFailure("rejected by fake runtime".to_string()));
            }

            let id = ExecutionId(self.next_id);
            self.next_id += 1;

            self.calls.lock().unwrap().push(RuntimeCall::Execute {
                id,
                task: task.clone(),
            });

            Ok(ExecutionHandle {
                id,
                label: task.label,
                command: task.command,
            })
        })
    }

    fn terminate(
        &mut self,
        execution: ExecutionId,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            self.calls
                .lock()
                .unwrap()
                .push(RuntimeCall::Terminate(execution));

            if self.flags.fail_terminate.load(Ordering::SeqCst) {
                return Err(TaskslotError::TerminationFailure(format!(
                    "fake runtime refused to terminate {execution}"
                )));
            }
            Ok(())
        })
    }

    fn subscribe(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.events.subscribe()
    }
}

impl FakeRuntimeProbe {
    pub fn calls(&self) -> Vec<RuntimeCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Ids of successful launches, in order.
    pub fn launched(&self) -> Vec<ExecutionId> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                RuntimeCall::Execute { id, .. } => Some(id),
                _ => None,
            })
            .collect()
    }

    pub fn terminated(&self) -> Vec<ExecutionId> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                RuntimeCall::Terminate(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    pub fn fail_launches(&self, fail: bool) {
        self.flags.fail_launch.store(fail, Ordering::SeqCst);
    }

    pub fn fail_terminations(&self, fail: bool) {
        self.flags.fail_terminate.store(fail, Ordering::SeqCst);
    }

    pub fn emit(&self, event: LifecycleEvent) {
        let _ = self.events.send(event);
    }

    pub fn start(&self, execution: ExecutionId) {
        self.emit(LifecycleEvent::Started { execution });
    }

    pub fn end(&self, execution: ExecutionId, exit_code: Option<i32>) {
        self.emit(LifecycleEvent::Ended {
            execution,
            exit_code,
        });
    }
}
