//! Framing state machine for accumulating partial reads.
//!
//! A socket read can deliver any slice of the byte stream: half a header,
//! a header plus part of a body, or several whole frames at once. The
//! [`FrameBuffer`] absorbs whatever arrives and yields only complete
//! frames, in arrival order:
//! - `AwaitingHeader`: need at least 16 bytes before anything can be parsed
//! - `AwaitingBody`: header parsed, need `body_length` more bytes
//!
//! Bytes are never discarded, only consumed once a whole frame has been
//! extracted, so feeding the same stream in different fragmentations yields
//! the same frame sequence.

use bytes::{Bytes, BytesMut};

use super::wire::{Header, Kind, HEADER_LEN};
use crate::error::{Error, Result};

/// Read-side scratch capacity; matches the per-read socket buffer.
const INITIAL_CAPACITY: usize = 4096;

/// One fully reassembled frame.
#[derive(Debug, Clone)]
pub struct Frame {
    pub header: Header,
    pub body: Bytes,
}

impl Frame {
    pub fn request_id(&self) -> u32 {
        self.header.request_id
    }

    pub fn status(&self) -> u8 {
        self.header.status
    }
}

#[derive(Debug, Clone, Copy)]
enum State {
    AwaitingHeader,
    AwaitingBody { header: Header },
}

/// Accumulates inbound bytes and extracts complete frames.
///
/// One instance per connection, owned exclusively by the task driving that
/// connection's socket. The buffer is direction-aware: a server-side buffer
/// only accepts request magic, a client-side buffer only response magic.
pub struct FrameBuffer {
    buffer: BytesMut,
    state: State,
    expected: Kind,
    /// Upper bound on `body_length`; a header claiming more is a protocol
    /// violation rather than a license to buffer without bound.
    max_body_length: u32,
}

impl FrameBuffer {
    /// Buffer for the server side of a connection (expects `TRRQ`).
    pub fn requests(max_body_length: u32) -> Self {
        Self::new(Kind::Request, max_body_length)
    }

    /// Buffer for the client side of a connection (expects `TRRS`).
    pub fn responses(max_body_length: u32) -> Self {
        Self::new(Kind::Response, max_body_length)
    }

    fn new(expected: Kind, max_body_length: u32) -> Self {
        Self {
            buffer: BytesMut::with_capacity(INITIAL_CAPACITY),
            state: State::AwaitingHeader,
            expected,
            max_body_length,
        }
    }

    /// Append newly read bytes and extract every frame they complete.
    ///
    /// Returns the complete frames in arrival order; the vector is empty
    /// while a frame is still partial. A `Protocol` error means the stream
    /// is unrecoverable and the connection must be closed.
    pub fn push(&mut self, data: &[u8]) -> Result<Vec<Frame>> {
        self.buffer.extend_from_slice(data);

        let mut frames = Vec::new();
        while let Some(frame) = self.advance()? {
            frames.push(frame);
        }
        Ok(frames)
    }

    fn advance(&mut self) -> Result<Option<Frame>> {
        match self.state {
            State::AwaitingHeader => {
                if self.buffer.len() < HEADER_LEN {
                    return Ok(None);
                }

                let header = Header::decode(&self.buffer[..HEADER_LEN], self.expected)?;
                if header.body_length > self.max_body_length {
                    return Err(Error::Protocol(format!(
                        "declared body length {} exceeds maximum {}",
                        header.body_length, self.max_body_length
                    )));
                }

                let _ = self.buffer.split_to(HEADER_LEN);
                self.state = State::AwaitingBody { header };
                self.advance()
            }
            State::AwaitingBody { header } => {
                let needed = header.body_length as usize;
                if self.buffer.len() < needed {
                    return Ok(None);
                }

                let body = self.buffer.split_to(needed).freeze();
                self.state = State::AwaitingHeader;
                Ok(Some(Frame { header, body }))
            }
        }
    }

    /// Number of bytes buffered but not yet part of a complete frame.
    pub fn pending_len(&self) -> usize {
        self.buffer.len()
    }

    /// True when no partial frame is buffered.
    pub fn is_idle(&self) -> bool {
        self.buffer.is_empty() && matches!(self.state, State::AwaitingHeader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::wire::{encode_request, STATUS_OK};

    fn buffer() -> FrameBuffer {
        FrameBuffer::requests(1024 * 1024)
    }

    #[test]
    fn single_complete_frame() {
        let mut buf = buffer();
        let frames = buf.push(&encode_request(42, b"hello")).unwrap();

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].request_id(), 42);
        assert_eq!(&frames[0].body[..], b"hello");
        assert!(buf.is_idle());
    }

    #[test]
    fn empty_body_frame() {
        let mut buf = buffer();
        let frames = buf.push(&encode_request(1, b"")).unwrap();

        assert_eq!(frames.len(), 1);
        assert!(frames[0].body.is_empty());
        assert_eq!(frames[0].status(), STATUS_OK);
    }

    #[test]
    fn multiple_frames_in_one_push() {
        let mut buf = buffer();
        let mut stream = Vec::new();
        stream.extend_from_slice(&encode_request(1, b"first"));
        stream.extend_from_slice(&encode_request(2, b"second"));
        stream.extend_from_slice(&encode_request(3, b""));

        let frames = buf.push(&stream).unwrap();

        let ids: Vec<u32> = frames.iter().map(Frame::request_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert!(buf.is_idle());
    }

    #[test]
    fn fragmented_header() {
        let mut buf = buffer();
        let frame = encode_request(42, b"body");

        assert!(buf.push(&frame[..10]).unwrap().is_empty());
        assert_eq!(buf.pending_len(), 10);

        let frames = buf.push(&frame[10..]).unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(&frames[0].body[..], b"body");
    }

    #[test]
    fn fragmented_body() {
        let mut buf = buffer();
        let frame = encode_request(42, b"a body split across several reads");

        assert!(buf.push(&frame[..HEADER_LEN + 4]).unwrap().is_empty());
        assert!(buf.push(&frame[HEADER_LEN + 4..HEADER_LEN + 9]).unwrap().is_empty());
        let frames = buf.push(&frame[HEADER_LEN + 9..]).unwrap();

        assert_eq!(frames.len(), 1);
        assert_eq!(&frames[0].body[..], b"a body split across several reads");
    }

    #[test]
    fn byte_at_a_time_equals_one_shot() {
        let mut stream = Vec::new();
        stream.extend_from_slice(&encode_request(1, b"alpha"));
        stream.extend_from_slice(&encode_request(2, b""));
        stream.extend_from_slice(&encode_request(3, b"gamma"));

        let mut one_shot = buffer();
        let expected: Vec<(u32, Bytes)> = one_shot
            .push(&stream)
            .unwrap()
            .into_iter()
            .map(|f| (f.request_id(), f.body))
            .collect();

        let mut trickle = buffer();
        let mut got = Vec::new();
        for byte in &stream {
            for frame in trickle.push(std::slice::from_ref(byte)).unwrap() {
                got.push((frame.request_id(), frame.body));
            }
        }

        assert_eq!(got, expected);
    }

    #[test]
    fn bad_magic_is_fatal() {
        let mut buf = buffer();
        let mut frame = encode_request(1, b"x").to_vec();
        frame[0..4].copy_from_slice(b"XXXX");

        let err = buf.push(&frame).unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
    }

    #[test]
    fn oversize_body_length_is_fatal() {
        let mut buf = FrameBuffer::requests(100);
        let frame = encode_request(1, &[0u8; 200]);

        let err = buf.push(&frame[..HEADER_LEN]).unwrap_err();
        assert!(err.to_string().contains("exceeds maximum"));
    }

    #[test]
    fn direction_enforced() {
        let mut buf = FrameBuffer::responses(1024);
        let err = buf.push(&encode_request(1, b"x")).unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
    }
}
