//! Run state shared with the Ctrl+C handler.
//!
//! - `SHUTDOWN`: Has shutdown been requested? (first Ctrl+C)
//!
//! A second Ctrl+C exits immediately without waiting for running spaces.

use std::sync::atomic::{AtomicBool, Ordering};

/// Shutdown has been requested (Ctrl+C received)
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// Setup the global Ctrl+C handler. Call once at program start
///
/// The first signal only sets the SHUTDOWN flag: spaces already in flight
/// finish and write their reports, pending spaces are skipped.
pub fn setup_shutdown_handler() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        if SHUTDOWN.swap(true, Ordering::SeqCst) {
            std::process::exit(130);
        }
        crate::log!("audit"; "interrupted, finishing spaces in progress (Ctrl+C again to abort)");
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))
}

/// Check if shutdown has been requested
///
/// Uses Relaxed ordering: the worst case is starting one more space
pub fn is_shutdown() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}

