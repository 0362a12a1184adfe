//! Wire protocol subsystem.
//!
//! # Data Flow
//! ```text
//! Outbound:
//!     request/response fields
//!         → wire.rs (encode header + body into one frame)
//!         → socket write
//!
//! Inbound:
//!     socket reads (arbitrarily fragmented)
//!         → framing.rs (accumulate, parse header, extract whole frames)
//!         → wire.rs (header decode, magic/length checks)
//!         → complete Frame handed to the service or the client caller
//! ```
//!
//! # Design Decisions
//! - Fixed 16-byte little-endian header, one magic per direction
//! - No pipelining guarantees are enforced here; frames come out in
//!   arrival order and callers process them sequentially
//! - A bad magic or an oversize length is unrecoverable for the stream

pub mod framing;
pub mod wire;

pub use framing::{Frame, FrameBuffer};
pub use wire::{Header, Kind, HEADER_LEN, STATUS_OK, STATUS_SERVICE_ERROR};
