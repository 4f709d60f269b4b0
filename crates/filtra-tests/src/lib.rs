//! Integration tests for filtra crates.
//!
//! This crate contains end-to-end tests that exercise filters through the
//! public API of `filtra-ops`, across storage formats and pipeline setups.
//!
//! Set `RUST_LOG=filtra_ops=debug` to see stage-level events while the tests
//! run.

use tracing_subscriber::EnvFilter;

/// Installs a test-friendly tracing subscriber once per process.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
