//! Text join service.
//!
//! Request body layout: two little-endian u32 lengths, then that many
//! bytes of UTF-8 text each, back to back. The response body is the two
//! texts joined with a fixed separator.

use std::str;
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;

use crate::error::Error;
use crate::service::{Service, ServiceError};

pub const NAME: &str = "text-join";

const SEPARATOR: &str = "^.^";

/// Joins two length-prefixed UTF-8 blobs with [`SEPARATOR`].
#[derive(Debug, Default)]
pub struct TextJoinService {
    processed: AtomicU64,
}

impl TextJoinService {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Service for TextJoinService {
    fn name(&self) -> &'static str {
        NAME
    }

    fn process(&self, request_id: u32, body: &[u8]) -> Result<Bytes, ServiceError> {
        let count = self.processed.fetch_add(1, Ordering::Relaxed) + 1;

        let (first, second) = split_body(body)?;
        tracing::debug!(
            request_id,
            processed = count,
            first_len = first.len(),
            second_len = second.len(),
            "Joining texts"
        );

        Ok(Bytes::from(format!("{}{}{}", first, SEPARATOR, second)))
    }
}

fn split_body(body: &[u8]) -> Result<(&str, &str), ServiceError> {
    if body.len() < 8 {
        return Err(Error::Protocol(format!(
            "request body too short for length prefixes: {} bytes",
            body.len()
        ))
        .into());
    }

    let first_len = u32::from_le_bytes(body[0..4].try_into().expect("4-byte slice")) as usize;
    let second_len = u32::from_le_bytes(body[4..8].try_into().expect("4-byte slice")) as usize;

    let total = 8usize
        .checked_add(first_len)
        .and_then(|n| n.checked_add(second_len))
        .ok_or_else(|| Error::Protocol("length prefixes overflow".to_string()))?;
    if body.len() < total {
        return Err(Error::Protocol(format!(
            "request body truncated: declared {} bytes, got {}",
            total,
            body.len()
        ))
        .into());
    }

    let first = str::from_utf8(&body[8..8 + first_len]).map_err(Error::Encoding)?;
    let second =
        str::from_utf8(&body[8 + first_len..total]).map_err(Error::Encoding)?;

    Ok((first, second))
}

/// Build a request body in the layout this service expects. Shared by the
/// load-test driver and the integration tests.
pub fn encode_body(first: &str, second: &str) -> Vec<u8> {
    let mut body = Vec::with_capacity(8 + first.len() + second.len());
    body.extend_from_slice(&(first.len() as u32).to_le_bytes());
    body.extend_from_slice(&(second.len() as u32).to_le_bytes());
    body.extend_from_slice(first.as_bytes());
    body.extend_from_slice(second.as_bytes());
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_two_texts() {
        let service = TextJoinService::new();
        let body = encode_body("hello", "world");

        let result = service.process(1, &body).unwrap();
        assert_eq!(&result[..], b"hello^.^world");
    }

    #[test]
    fn empty_texts_join_to_separator() {
        let service = TextJoinService::new();
        let result = service.process(1, &encode_body("", "")).unwrap();
        assert_eq!(&result[..], b"^.^");
    }

    #[test]
    fn short_body_rejected() {
        let service = TextJoinService::new();
        let err = service.process(1, &[0u8; 4]).unwrap_err();
        assert!(matches!(err, ServiceError::Rejected(Error::Protocol(_))));
    }

    #[test]
    fn truncated_body_rejected() {
        let service = TextJoinService::new();
        let mut body = encode_body("hello", "world");
        body.truncate(body.len() - 3);

        let err = service.process(1, &body).unwrap_err();
        assert!(matches!(err, ServiceError::Rejected(Error::Protocol(_))));
    }

    #[test]
    fn non_utf8_text_rejected() {
        let service = TextJoinService::new();
        let mut body = encode_body("ok", "xx");
        let len = body.len();
        body[len - 1] = 0xFF;
        body[len - 2] = 0xFE;

        let err = service.process(1, &body).unwrap_err();
        assert!(matches!(err, ServiceError::Rejected(Error::Encoding(_))));
    }
}
