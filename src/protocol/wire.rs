//! Wire format encoding and decoding.
//!
//! Implements the 16-byte header shared by both directions:
//! ```text
//! ┌──────────┬────────────┬─────────────┬────────┬──────────┐
//! │ Magic    │ Request ID │ Body length │ Status │ Reserved │
//! │ 4 bytes  │ 4 bytes    │ 4 bytes     │ 1 byte │ 3 bytes  │
//! │ ASCII    │ uint32 LE  │ uint32 LE   │        │ zeroed   │
//! └──────────┴────────────┴─────────────┴────────┴──────────┘
//! ```
//! Requests carry magic `TRRQ` and a zero status byte; responses carry
//! magic `TRRS` and the status set by the service. All multi-byte
//! integers are little endian.

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{Error, Result};

/// Header size in bytes (fixed, exactly 16).
pub const HEADER_LEN: usize = 16;

/// Magic for the client-to-server direction.
pub const REQUEST_MAGIC: [u8; 4] = *b"TRRQ";

/// Magic for the server-to-client direction.
pub const RESPONSE_MAGIC: [u8; 4] = *b"TRRS";

/// Status byte for a successfully serviced request.
pub const STATUS_OK: u8 = 0;

/// Status byte for a request the service failed to process.
pub const STATUS_SERVICE_ERROR: u8 = 1;

/// Which direction a frame belongs to. Decoding checks the magic against
/// the kind the stream expects, so a response frame arriving on the server
/// (or vice versa) is rejected outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Request,
    Response,
}

impl Kind {
    fn magic(self) -> [u8; 4] {
        match self {
            Kind::Request => REQUEST_MAGIC,
            Kind::Response => RESPONSE_MAGIC,
        }
    }
}

/// Decoded frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Direction this header was decoded as.
    pub kind: Kind,
    /// Client-assigned correlation id, echoed verbatim in the response.
    pub request_id: u32,
    /// Byte length of the body that follows the header.
    pub body_length: u32,
    /// Result status; meaningful on responses only.
    pub status: u8,
}

impl Header {
    /// Decode a header from the first [`HEADER_LEN`] bytes of `buf`,
    /// checking the magic against `expected`.
    pub fn decode(buf: &[u8], expected: Kind) -> Result<Self> {
        if buf.len() < HEADER_LEN {
            return Err(Error::Protocol(format!(
                "short header: expected {} bytes, got {}",
                HEADER_LEN,
                buf.len()
            )));
        }

        let magic = &buf[0..4];
        if magic != expected.magic() {
            return Err(Error::Protocol(format!(
                "illegal magic number: {:02x}{:02x}{:02x}{:02x}",
                magic[0], magic[1], magic[2], magic[3]
            )));
        }

        let request_id = u32::from_le_bytes(buf[4..8].try_into().expect("4-byte slice"));
        let body_length = u32::from_le_bytes(buf[8..12].try_into().expect("4-byte slice"));
        let status = buf[12];

        Ok(Self {
            kind: expected,
            request_id,
            body_length,
            status,
        })
    }
}

/// Build a complete request frame: header plus body in one buffer.
pub fn encode_request(request_id: u32, body: &[u8]) -> Bytes {
    encode(Kind::Request, request_id, STATUS_OK, body)
}

/// Build a complete response frame with the service's status byte.
pub fn encode_response(request_id: u32, status: u8, body: &[u8]) -> Bytes {
    encode(Kind::Response, request_id, status, body)
}

fn encode(kind: Kind, request_id: u32, status: u8, body: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(HEADER_LEN + body.len());
    buf.put_slice(&kind.magic());
    buf.put_u32_le(request_id);
    buf.put_u32_le(body.len() as u32);
    buf.put_u8(status);
    buf.put_slice(&[0u8; 3]);
    buf.put_slice(body);
    buf.freeze()
}

/// Extract `body_length` body bytes following the header.
///
/// Callers must not invoke this until at least `HEADER_LEN + body_length`
/// bytes have accumulated; a shorter buffer is a protocol violation here.
pub fn decode_body(buf: &[u8], body_length: u32) -> Result<&[u8]> {
    let end = HEADER_LEN + body_length as usize;
    if buf.len() < end {
        return Err(Error::Protocol(format!(
            "short frame: expected {} bytes, got {}",
            end,
            buf.len()
        )));
    }
    Ok(&buf[HEADER_LEN..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_round_trip() {
        let frame = encode_request(42, b"hello");
        assert_eq!(frame.len(), HEADER_LEN + 5);

        let header = Header::decode(&frame, Kind::Request).unwrap();
        assert_eq!(header.request_id, 42);
        assert_eq!(header.body_length, 5);
        assert_eq!(header.status, STATUS_OK);
        assert_eq!(decode_body(&frame, header.body_length).unwrap(), b"hello");
    }

    #[test]
    fn response_round_trip() {
        let frame = encode_response(7, STATUS_SERVICE_ERROR, b"");
        let header = Header::decode(&frame, Kind::Response).unwrap();
        assert_eq!(header.request_id, 7);
        assert_eq!(header.body_length, 0);
        assert_eq!(header.status, STATUS_SERVICE_ERROR);
    }

    #[test]
    fn layout_is_little_endian_with_zero_reserved() {
        let frame = encode_request(0x0102_0304, b"ab");
        assert_eq!(&frame[0..4], b"TRRQ");
        assert_eq!(&frame[4..8], &[0x04, 0x03, 0x02, 0x01]);
        assert_eq!(&frame[8..12], &[2, 0, 0, 0]);
        assert_eq!(&frame[12..16], &[0, 0, 0, 0]);
        assert_eq!(&frame[16..], b"ab");
    }

    #[test]
    fn wrong_direction_magic_rejected() {
        let frame = encode_request(1, b"x");
        let err = Header::decode(&frame, Kind::Response).unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
    }

    #[test]
    fn garbage_magic_rejected() {
        let mut frame = encode_request(1, b"x").to_vec();
        frame[0..4].copy_from_slice(b"XXXX");
        let err = Header::decode(&frame, Kind::Request).unwrap_err();
        assert!(err.to_string().contains("58585858"));
    }

    #[test]
    fn short_header_rejected() {
        let err = Header::decode(&[0u8; 10], Kind::Request).unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
    }

    #[test]
    fn short_body_rejected() {
        let frame = encode_request(1, b"hello");
        let err = decode_body(&frame[..HEADER_LEN + 2], 5).unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
    }
}
