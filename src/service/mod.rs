//! Processing units.
//!
//! # Data Flow
//! ```text
//! Reassembled request body
//!     → Service::process (pure CPU work, synchronous)
//!     → response body bytes, or ServiceError
//!
//! ServiceError at the session boundary:
//!     Failed / Rejected → empty body, error status, connection stays open
//!     Fatal             → same response, then process-wide drain and exit
//! ```
//!
//! # Design Decisions
//! - Services never touch sockets or framing; they see body bytes only
//! - A service must not panic; recoverable failures are returned as errors
//! - One service is selected per server session, by name, at startup

pub mod always_fail;
pub mod text_join;

use std::sync::Arc;

use bytes::Bytes;
use thiserror::Error;

pub use always_fail::AlwaysFailService;
pub use text_join::TextJoinService;

/// Failure modes a service may report for one request.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Service-defined failure. Degraded to an empty error response; the
    /// connection stays open.
    #[error("{0}")]
    Failed(String),

    /// The request body could not be interpreted (truncated fields, bad
    /// UTF-8). Degraded exactly like `Failed`.
    #[error(transparent)]
    Rejected(#[from] crate::error::Error),

    /// Unrecoverable service condition. The caller still receives a
    /// degraded response, then the server drains and exits.
    #[error("fatal service failure: {0}")]
    Fatal(String),
}

/// The processing unit contract.
///
/// `process` receives a fully reassembled request body and the request id
/// (for logging only) and returns the bytes to place in the response body.
/// It runs on the connection's task and is expected to be short and
/// CPU-only; a blocking service stalls that connection, not the server.
pub trait Service: Send + Sync {
    /// Name this service is selectable by on the command line.
    fn name(&self) -> &'static str;

    /// Turn a request body into a response body.
    fn process(&self, request_id: u32, body: &[u8]) -> Result<Bytes, ServiceError>;
}

/// Instantiate a service by name.
pub fn create(name: &str) -> Option<Arc<dyn Service>> {
    match name {
        text_join::NAME => Some(Arc::new(TextJoinService::new())),
        always_fail::NAME => Some(Arc::new(AlwaysFailService)),
        _ => None,
    }
}

/// Names accepted by [`create`], for usage output.
pub fn available() -> &'static [&'static str] {
    &[text_join::NAME, always_fail::NAME]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_knows_every_listed_service() {
        for name in available() {
            let service = create(name).expect("listed service must exist");
            assert_eq!(service.name(), *name);
        }
    }

    #[test]
    fn unknown_service_rejected() {
        assert!(create("no-such-service").is_none());
    }
}
