//! A service that fails every request.
//!
//! Exists to exercise the degradation path end to end: callers should see
//! a well-formed response with an empty body and a non-success status, and
//! the connection must stay open.

use bytes::Bytes;

use crate::service::{Service, ServiceError};

pub const NAME: &str = "always-fail";

#[derive(Debug, Default)]
pub struct AlwaysFailService;

impl Service for AlwaysFailService {
    fn name(&self) -> &'static str {
        NAME
    }

    fn process(&self, request_id: u32, _body: &[u8]) -> Result<Bytes, ServiceError> {
        Err(ServiceError::Failed(format!(
            "request {} refused: always-fail rejects every request",
            request_id
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_request_fails() {
        let service = AlwaysFailService;
        assert!(service.process(1, b"anything").is_err());
        assert!(service.process(2, b"").is_err());
    }
}
