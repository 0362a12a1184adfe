//! Per-connection session loop.
//!
//! # Responsibilities
//! - Read socket bytes and feed the framing state machine
//! - Dispatch each reassembled request to the service, in arrival order
//! - Write each response frame fully before touching the next request
//! - Tear down on EOF, transport error, or protocol violation
//!
//! Errors here are connection-scoped: they are logged with the peer address
//! and resolved by closing this connection only. Service failures are the
//! one exception; they degrade to an empty error response instead.

use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::config::ProtocolConfig;
use crate::lifecycle::Shutdown;
use crate::net::ConnectionGuard;
use crate::protocol::wire::{self, STATUS_OK, STATUS_SERVICE_ERROR};
use crate::protocol::{Frame, FrameBuffer};
use crate::service::{Service, ServiceError};

/// Drive one connection until it closes.
pub(crate) async fn run(
    mut stream: TcpStream,
    peer_addr: SocketAddr,
    guard: &ConnectionGuard,
    service: Arc<dyn Service>,
    protocol: ProtocolConfig,
    shutdown: Shutdown,
) {
    let mut shutdown_rx = shutdown.subscribe();
    let mut frames = FrameBuffer::requests(protocol.max_body_length);
    let mut read_buf = vec![0u8; protocol.read_buffer_bytes];

    tracing::info!(connection_id = %guard.id(), peer_addr = %peer_addr, "New client");

    'conn: loop {
        tokio::select! {
            _ = shutdown_rx.recv() => {
                tracing::debug!(peer_addr = %peer_addr, "Closing on shutdown");
                break 'conn;
            }
            read = stream.read(&mut read_buf) => {
                let count = match read {
                    Ok(n) => n,
                    Err(e) => {
                        tracing::warn!(peer_addr = %peer_addr, error = %e, "Read failed, closing");
                        break 'conn;
                    }
                };
                if count == 0 {
                    tracing::info!(peer_addr = %peer_addr, "Close EOF client");
                    break 'conn;
                }

                let requests = match frames.push(&read_buf[..count]) {
                    Ok(requests) => requests,
                    Err(e) => {
                        // No mid-stream resync exists; the connection is done.
                        tracing::warn!(peer_addr = %peer_addr, error = %e, "Protocol violation, closing");
                        break 'conn;
                    }
                };

                for request in requests {
                    let (status, body, fatal) = dispatch(service.as_ref(), peer_addr, &request);
                    let frame = wire::encode_response(request.request_id(), status, &body);

                    if let Err(e) = stream.write_all(&frame).await {
                        tracing::warn!(peer_addr = %peer_addr, error = %e, "Write failed, closing");
                        break 'conn;
                    }

                    if fatal {
                        tracing::error!(peer_addr = %peer_addr, "Fatal service failure, triggering shutdown");
                        shutdown.trigger();
                        break 'conn;
                    }
                }
            }
        }
    }
}

/// Invoke the service and absorb its failures.
///
/// Returns the status byte, the response body, and whether the failure was
/// fatal to the process. A failing service yields an empty body and a
/// non-success status; the connection stays open.
fn dispatch(service: &dyn Service, peer_addr: SocketAddr, request: &Frame) -> (u8, Bytes, bool) {
    match service.process(request.request_id(), &request.body) {
        Ok(body) => (STATUS_OK, body, false),
        Err(e) => {
            tracing::error!(
                peer_addr = %peer_addr,
                request_id = request.request_id(),
                error = %e,
                "Service failed, degrading to error response"
            );
            let fatal = matches!(e, ServiceError::Fatal(_));
            (STATUS_SERVICE_ERROR, Bytes::new(), fatal)
        }
    }
}
