//! Crate-wide error taxonomy.
//!
//! Errors are scoped to a single connection or a single request; nothing in
//! here is ever fatal to the process. The server closes a connection on
//! `Protocol` and `Transport`, degrades a request to an error response on
//! `Encoding`, and the client tears down its session on `RequestIdMismatch`.

use thiserror::Error;

/// Errors produced by the codec, the framing state machine, and the
/// client/server transport paths.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed magic number or impossible length field. Always fatal to the
    /// connection: the stream cannot be resynchronized mid-frame.
    #[error("protocol violation: {0}")]
    Protocol(String),

    /// A body that is not valid UTF-8 where text is expected. Degraded to an
    /// empty error response at the service boundary; the connection stays open.
    #[error("invalid text body: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    /// Socket-level failure (reset, unexpected EOF). Closes that connection
    /// only.
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// Client side only: a response echoed an id that does not match the
    /// outstanding request.
    #[error("request id mismatch: expected {expected}, received {received}")]
    RequestIdMismatch { expected: u32, received: u32 },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Shorthand for a transport error describing a peer that closed the
    /// stream before a full frame arrived.
    pub(crate) fn closed(context: &str) -> Self {
        Error::Transport(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            context.to_string(),
        ))
    }
}
