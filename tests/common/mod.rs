#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use taskslot::engine::{ControllerOptions, ExecutionController};
use taskslot::fs::mock::MockFileSystem;
use taskslot::types::ShellKind;
use taskslot_test_utils::builders::options_with_interval;
use taskslot_test_utils::fake_runtime::{FakeRuntimeProbe, FakeTaskRuntime};

pub use taskslot_test_utils::{init_tracing, with_timeout};

pub const WORKSPACE: &str = "/work";
pub const POLL: Duration = Duration::from_secs(5);

/// Everything a controller test needs, wired to fakes.
pub struct Harness {
    pub controller: ExecutionController<FakeTaskRuntime>,
    pub probe: FakeRuntimeProbe,
    pub fs: MockFileSystem,
    pub root: PathBuf,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_poll_interval(POLL)
    }

    pub fn with_poll_interval(poll_interval: Duration) -> Self {
        let fs = MockFileSystem::new();
        fs.add_dir(WORKSPACE);

        let (runtime, probe) = FakeTaskRuntime::new();
        let controller = ExecutionController::new(
            runtime,
            Arc::new(fs.clone()),
            ControllerOptions {
                shell: ShellKind::Sh,
                ..options_with_interval(poll_interval)
            },
        );

        Self {
            controller,
            probe,
            fs,
            root: PathBuf::from(WORKSPACE),
        }
    }

    pub fn artifact(&self) -> PathBuf {
        self.root.join("output.txt")
    }
}
