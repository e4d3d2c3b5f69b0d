//! Tracing setup shared by the harness binary and its tests

use tracing_subscriber::{EnvFilter, fmt};

/// Initialize the tracing subscriber for the harness.
///
/// Safe to call more than once; later calls are no-ops, which lets tests
/// initialize logging independently.
pub fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("verifier=debug,shared=debug,info")
    } else {
        EnvFilter::new("verifier=info,shared=info")
    };

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();

    tracing::debug!(verbose, "tracing initialized");
}
