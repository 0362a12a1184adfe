//! RPC client.
//!
//! # Data Flow
//! ```text
//! call(body)
//!     → assign next request id, encode frame, write fully
//!     → read until the response FrameBuffer yields one whole frame
//!     → verify echoed id, hand (status, body) to the caller
//! ```
//!
//! # Design Decisions
//! - One outstanding request at a time; the protocol has no pipelining
//! - Response reassembly reuses the same FrameBuffer as the server side
//! - An id mismatch is fatal to the session, not silently skipped

use bytes::Bytes;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, ToSocketAddrs};

use crate::config::ProtocolConfig;
use crate::error::{Error, Result};
use crate::protocol::{wire, FrameBuffer};

/// A connected RPC client session.
pub struct RpcClient {
    stream: TcpStream,
    frames: FrameBuffer,
    read_buf: Vec<u8>,
    request_counter: u32,
}

impl RpcClient {
    /// Connect with default protocol limits.
    pub async fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        Self::connect_with(addr, &ProtocolConfig::default()).await
    }

    /// Connect with explicit protocol limits.
    pub async fn connect_with<A: ToSocketAddrs>(
        addr: A,
        protocol: &ProtocolConfig,
    ) -> Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        Ok(Self {
            stream,
            frames: FrameBuffer::responses(protocol.max_body_length),
            read_buf: vec![0u8; protocol.read_buffer_bytes],
            request_counter: 0,
        })
    }

    /// Send one request body and wait for its response.
    ///
    /// Returns the status byte and the response body. Fails with
    /// `RequestIdMismatch` if the server echoes the wrong id, and with
    /// `Transport` if the connection closes before a full response arrives.
    pub async fn call(&mut self, body: &[u8]) -> Result<(u8, Bytes)> {
        self.request_counter += 1;
        let request_id = self.request_counter;

        let frame = wire::encode_request(request_id, body);
        self.stream.write_all(&frame).await?;

        let response = self.read_response().await?;
        if response.request_id() != request_id {
            return Err(Error::RequestIdMismatch {
                expected: request_id,
                received: response.request_id(),
            });
        }

        Ok((response.status(), response.body))
    }

    async fn read_response(&mut self) -> Result<crate::protocol::Frame> {
        loop {
            let count = self.stream.read(&mut self.read_buf).await?;
            if count == 0 {
                return Err(Error::closed("connection closed before full response"));
            }

            let frames = self.frames.push(&self.read_buf[..count])?;
            if let Some(frame) = frames.into_iter().next() {
                return Ok(frame);
            }
        }
    }
}
