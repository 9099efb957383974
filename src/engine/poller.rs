// src/engine/poller.rs

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::fs::FileSystem;

use super::monitor::{CompletionMonitor, MonitorCommand};
use super::report::Report;
use super::LifecycleEvent;

const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Drive a [`CompletionMonitor`] until it produces its report.
///
/// Two sources race here: the lifecycle subscription and the poll timer
/// (armed on our start event). The event branch is polled first so an end
/// event that is already queued wins over a tick that is due at the same
/// instant. Both the subscription and the timer are dropped on return.
pub async fn run_monitor(
    mut monitor: CompletionMonitor,
    mut events: broadcast::Receiver<LifecycleEvent>,
    fs: Arc<dyn FileSystem>,
    poll_interval: Duration,
) -> Report {
    // `interval_at` panics on a zero period.
    let poll_interval = poll_interval.max(MIN_POLL_INTERVAL);
    let mut timer: Option<Interval> = None;

    loop {
        let command = tokio::select! {
            biased;

            received = events.recv() => match received {
                Ok(event) => monitor.on_lifecycle(&event),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(
                        execution = %monitor.execution(),
                        skipped,
                        "lifecycle subscription lagged; some events were dropped"
                    );
                    MonitorCommand::None
                }
                Err(RecvError::Closed) => monitor.on_runtime_closed(),
            },

            _ = next_tick(&mut timer) => monitor.on_tick(),
        };

        match command {
            MonitorCommand::None => {}
            MonitorCommand::StartPolling => {
                let mut interval = interval_at(Instant::now() + poll_interval, poll_interval);
                interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                timer = Some(interval);
            }
            MonitorCommand::Resolve { is_running } => {
                timer = None;
                let read = read_artifact(&fs, monitor.artifact_path()).await;
                if let Some(report) = monitor.resolve(is_running, read) {
                    info!(
                        execution = %monitor.execution(),
                        is_running,
                        has_changes = report.has_changes,
                        bytes = report.content.len(),
                        "execution report ready"
                    );
                    return report;
                }
                debug!(execution = %monitor.execution(), "monitor already resolved");
            }
        }
    }
}

/// Read the artifact off the async workers.
async fn read_artifact(fs: &Arc<dyn FileSystem>, path: &Path) -> anyhow::Result<String> {
    let fs = Arc::clone(fs);
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || fs.read_text(&path))
        .await
        .map_err(|err| anyhow::anyhow!("artifact read task failed: {err}"))?
}

/// Wait for the next poll tick, or forever while no timer is armed.
async fn next_tick(timer: &mut Option<Interval>) {
    match timer {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
