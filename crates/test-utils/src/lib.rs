//! Shared helpers for persistrig's integration tests.

pub mod builders;
pub mod failing_store;
pub mod fake_sink;
pub mod harness;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt};

static INIT: Once = Once::new();

/// Upper bound for any single awaited step in async tests.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Install a test subscriber once per test binary.
///
/// Output goes through `with_test_writer()`, so it only shows for failing
/// tests (or with `-- --nocapture`). Filter with `PERSISTRIG_LOG`, falling
/// back to `RUST_LOG`, e.g. `PERSISTRIG_LOG=persistrig::engine=debug`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env("PERSISTRIG_LOG")
            .or_else(|_| EnvFilter::try_from_default_env())
            .unwrap_or_else(|_| EnvFilter::new("warn"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}

/// Await `f`, failing the test after [`TEST_TIMEOUT`].
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    match tokio::time::timeout(TEST_TIMEOUT, f).await {
        Ok(value) => value,
        Err(_) => panic!("test step timed out after {TEST_TIMEOUT:?}"),
    }
}
