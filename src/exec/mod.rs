// src/exec/mod.rs

//! Process execution layer.
//!
//! This module is responsible for actually running the wrapped commands,
//! using `tokio::process::Command`, and reporting their lifecycle back to
//! the engine via `LifecycleEvent`s.
//!
//! - [`backend`] provides the `TaskRuntime` trait the controller talks to,
//!   which tests replace with a fake implementation.
//! - [`shell`] builds the `tee` wrapper and the platform shell invocation.
//! - [`process`] contains `ShellTaskRuntime`, the implementation used in
//!   production.

pub mod backend;
pub mod process;
pub mod shell;

pub use backend::{ShellTask, TaskRuntime};
pub use process::ShellTaskRuntime;
pub use shell::{shell_command, wrap_with_tee};
