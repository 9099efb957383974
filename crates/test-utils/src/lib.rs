//! Shared helpers for taskslot's integration tests.

pub mod builders;
pub mod fake_runtime;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

/// Upper bound for any single awaited step in a test.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(10);

static TRACING: Once = Once::new();

/// Install a test-captured subscriber once per test binary.
///
/// Filter comes from `TASKSLOT_LOG` (then `RUST_LOG`), defaulting to
/// `taskslot=debug`. Output shows up only for failing tests unless run with
/// `--nocapture`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let directives = std::env::var("TASKSLOT_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| "warn,taskslot=debug".to_string());

        // Another harness may already own the global subscriber.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new(directives))
            .with_test_writer()
            .try_init();
    });
}

/// Await `fut`, panicking if it takes longer than [`TEST_TIMEOUT`].
pub async fn with_timeout<F: Future>(fut: F) -> F::Output {
    match tokio::time::timeout(TEST_TIMEOUT, fut).await {
        Ok(out) => out,
        Err(_) => panic!("test step timed out after {TEST_TIMEOUT:?}"),
    }
}
