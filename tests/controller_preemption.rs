// tests/controller_preemption.rs

mod common;
use crate::common::{init_tracing, with_timeout, Harness};

use std::error::Error;
use std::path::Path;

use taskslot::engine::ExecutionId;
use taskslot::errors::TaskslotError;
use taskslot::exec::shell::wrap_with_tee;
use taskslot::types::ShellKind;
use taskslot_test_utils::fake_runtime::RuntimeCall;

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test(start_paused = true)]
async fn first_launch_does_not_terminate_anything() -> TestResult {
    init_tracing();
    let mut h = Harness::new();

    let pending = h.controller.run("echo hello", &h.root).await?;

    assert_eq!(pending.execution(), ExecutionId(1));
    assert!(h.probe.terminated().is_empty());
    assert_eq!(h.probe.launched(), vec![ExecutionId(1)]);
    assert_eq!(h.controller.current().map(|c| c.id), Some(ExecutionId(1)));

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn terminate_is_requested_before_the_next_launch() -> TestResult {
    init_tracing();
    let mut h = Harness::new();

    let first = h.controller.run("sleep 100", &h.root).await?;
    let second = h.controller.run("echo second", &h.root).await?;

    let calls = h.probe.calls();
    assert_eq!(calls.len(), 3, "unexpected calls: {calls:?}");
    match (&calls[0], &calls[1], &calls[2]) {
        (
            RuntimeCall::Execute { id: launched_first, .. },
            RuntimeCall::Terminate(terminated),
            RuntimeCall::Execute { id: launched_second, .. },
        ) => {
            assert_eq!(*launched_first, first.execution());
            assert_eq!(*terminated, first.execution());
            assert_eq!(*launched_second, second.execution());
        }
        other => panic!("expected execute, terminate, execute; got {other:?}"),
    }

    assert_eq!(h.controller.current().map(|c| c.id), Some(second.execution()));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn failed_termination_does_not_block_the_new_launch() -> TestResult {
    init_tracing();
    let mut h = Harness::new();

    let first = h.controller.run("sleep 100", &h.root).await?;
    h.probe.fail_terminations(true);

    let second = h.controller.run("echo second", &h.root).await?;

    assert_eq!(h.probe.terminated(), vec![first.execution()]);
    assert_eq!(
        h.probe.launched(),
        vec![first.execution(), second.execution()]
    );
    assert_eq!(h.controller.current().map(|c| c.id), Some(second.execution()));

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn launch_failure_propagates_without_a_report() -> TestResult {
    init_tracing();
    let mut h = Harness::new();
    h.probe.fail_launches(true);

    let result = h.controller.run("echo hello", &h.root).await;
    assert!(
        matches!(result, Err(TaskslotError::LaunchFailure(_))),
        "expected LaunchFailure, got {result:?}"
    );
    assert!(h.controller.current().is_none());

    let text = h.controller.execute_task("echo hello", &h.root).await;
    assert!(matches!(text, Err(TaskslotError::LaunchFailure(_))));

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn launch_failure_still_preempts_the_previous_execution() -> TestResult {
    init_tracing();
    let mut h = Harness::new();

    let first = h.controller.run("sleep 100", &h.root).await?;
    h.probe.fail_launches(true);

    let result = h.controller.run("echo second", &h.root).await;
    assert!(result.is_err());
    assert_eq!(h.probe.terminated(), vec![first.execution()]);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn missing_working_directory_is_rejected_before_any_runtime_call() -> TestResult {
    init_tracing();
    let mut h = Harness::new();

    let result = h.controller.run("echo hello", Path::new("/nowhere")).await;
    match result {
        Err(TaskslotError::InvalidWorkingDirectory(dir)) => {
            assert_eq!(dir, Path::new("/nowhere"));
        }
        other => panic!("expected InvalidWorkingDirectory, got {other:?}"),
    }
    assert!(h.probe.calls().is_empty());

    Ok(())
}

#[test]
fn artifact_path_is_quoted_literally() {
    let artifact = Path::new("/tmp/it's $HOME `x`/output.txt");

    assert_eq!(
        wrap_with_tee(ShellKind::Sh, "make", artifact, true),
        r"(make) 2>&1 | tee -a '/tmp/it'\''s $HOME `x`/output.txt'"
    );
    assert_eq!(
        wrap_with_tee(ShellKind::PowerShell, "make", artifact, false),
        "& { make } 2>&1 | Tee-Object -FilePath '/tmp/it''s $HOME `x`/output.txt'"
    );
}

#[tokio::test(start_paused = true)]
async fn command_is_wrapped_to_tee_into_the_artifact() -> TestResult {
    init_tracing();
    let mut h = Harness::new();

    h.controller.run("cargo test", &h.root).await?;

    match h.probe.calls().first() {
        Some(RuntimeCall::Execute { task, .. }) => {
            assert_eq!(task.command, "(cargo test) 2>&1 | tee '/work/output.txt'");
            assert_eq!(task.working_dir, h.root);
            assert_eq!(task.label, "taskslot");
        }
        other => panic!("expected an execute call, got {other:?}"),
    }

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn slot_keeps_the_last_execution_after_it_completes() -> TestResult {
    init_tracing();
    let mut h = Harness::new();

    let first = h.controller.run("echo one", &h.root).await?;
    h.probe.start(first.execution());
    h.probe.end(first.execution(), Some(0));
    let report = with_timeout(first.wait()).await?;
    assert!(!report.is_running);

    // Natural completion does not clear the slot.
    assert_eq!(h.controller.current().map(|c| c.id), Some(ExecutionId(1)));

    h.controller.run("echo two", &h.root).await?;
    assert_eq!(h.probe.terminated(), vec![ExecutionId(1)]);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn stale_monitor_only_resolves_its_own_request() -> TestResult {
    init_tracing();
    let mut h = Harness::new();
    let artifact = h.artifact();

    let first = h.controller.run("sleep 100", &h.root).await?;
    let second = h.controller.run("echo second", &h.root).await?;

    // The preempted execution ends; only the first request completes.
    h.probe.start(first.execution());
    h.probe.start(second.execution());
    h.probe.end(first.execution(), None);

    let stale = with_timeout(first.wait()).await?;
    assert!(!stale.is_running);

    h.fs.add_file(&artifact, "second\n");
    h.probe.end(second.execution(), Some(0));

    let fresh = with_timeout(second.wait()).await?;
    assert!(!fresh.is_running);
    assert_eq!(fresh.content, "second\n");

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn shutdown_terminates_the_occupied_slot() -> TestResult {
    init_tracing();
    let mut h = Harness::new();

    let pending = h.controller.run("sleep 100", &h.root).await?;
    h.controller.shutdown().await;

    assert_eq!(h.probe.terminated(), vec![pending.execution()]);
    assert!(h.controller.current().is_none());

    // Nothing left to terminate.
    h.controller.shutdown().await;
    assert_eq!(h.probe.terminated().len(), 1);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn execute_task_returns_the_report_text() -> TestResult {
    init_tracing();
    let mut h = Harness::new();
    h.fs.add_file(h.artifact(), "hello\n");

    // Play the host runtime: start and end whatever gets launched.
    let probe = h.probe.clone();
    tokio::spawn(async move {
        loop {
            if let Some(id) = probe.launched().first().copied() {
                probe.start(id);
                probe.end(id, Some(0));
                break;
            }
            tokio::task::yield_now().await;
        }
    });

    let text = with_timeout(h.controller.execute_task("echo hello", &h.root)).await?;
    assert_eq!(
        text,
        "Execute command complete. Command execution output from /work/output.txt\nhello\n"
    );

    Ok(())
}
