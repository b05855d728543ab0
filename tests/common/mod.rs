//! Shared helpers for integration tests.

use tracing_subscriber::filter::LevelFilter;

/// Route `tracing` output to the test harness so it shows up for failing
/// tests only.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(LevelFilter::TRACE)
        .try_init();
}
