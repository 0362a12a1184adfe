//! RPC server subsystem.
//!
//! # Data Flow
//! ```text
//! Listener accepts
//!     → one session task per connection (session.rs)
//!     → FrameBuffer reassembles requests from partial reads
//!     → Service::process turns a body into a response body
//!     → response frame written back, fully, before the next request
//!
//! Failure handling:
//!     transport / protocol error → that connection closes, others unaffected
//!     service error              → empty-body error response, connection open
//!     fatal service error        → graceful process shutdown after drain
//! ```
//!
//! # Design Decisions
//! - One cooperative task per connection; no threads, no locks on the hot path
//! - Requests on one connection are serviced strictly in arrival order;
//!   no ordering exists across connections
//! - No idle-connection timeout: a connection lives until EOF, a protocol
//!   violation, or process shutdown

mod session;

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::error::Result;
use crate::lifecycle::Shutdown;
use crate::net::{ConnectionTracker, Listener};
use crate::service::Service;

/// The RPC server: owns the accept loop and the set of live sessions.
pub struct RpcServer {
    config: ServerConfig,
    service: Arc<dyn Service>,
}

impl RpcServer {
    pub fn new(config: ServerConfig, service: Arc<dyn Service>) -> Self {
        Self { config, service }
    }

    /// Accept connections until shutdown is triggered, then wait for every
    /// session to finish flushing and close.
    pub async fn run(self, listener: Listener, shutdown: Shutdown) -> Result<()> {
        let tracker = ConnectionTracker::new();
        let mut shutdown_rx = shutdown.subscribe();

        tracing::info!(
            service = self.service.name(),
            address = %listener.local_addr()?,
            "RPC server ready"
        );

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    tracing::info!("Shutdown triggered, no longer accepting");
                    break;
                }
                accepted = listener.accept() => {
                    let (stream, peer_addr, permit) = match accepted {
                        Ok(conn) => conn,
                        Err(e) => {
                            tracing::error!(error = %e, "Accept failed");
                            continue;
                        }
                    };

                    let guard = tracker.track();
                    let service = Arc::clone(&self.service);
                    let protocol = self.config.protocol.clone();
                    let shutdown = shutdown.clone();
                    tokio::spawn(async move {
                        session::run(stream, peer_addr, &guard, service, protocol, shutdown)
                            .await;
                        drop(guard);
                        drop(permit);
                    });
                }
            }
        }

        tracing::info!(live = tracker.live_count(), "Draining connections");
        tracker.wait_until_idle().await;
        tracing::info!("All connections closed");
        Ok(())
    }
}
