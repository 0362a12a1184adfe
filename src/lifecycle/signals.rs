//! OS signal handling.
//!
//! # Responsibilities
//! - Register the interrupt handler (SIGINT/ctrl-c)
//! - Translate it into the internal shutdown signal

use crate::lifecycle::Shutdown;

/// Spawn a task that triggers shutdown on ctrl-c.
pub fn install(shutdown: &Shutdown) {
    let shutdown = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Interrupt received, shutting down");
                shutdown.trigger();
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for interrupt signal");
            }
        }
    });
}
