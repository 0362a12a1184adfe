//! Length-prefixed binary RPC over TCP.
//!
//! A small request/response transport: 16-byte little-endian headers with
//! per-direction magic numbers, a framing state machine that reassembles
//! messages from arbitrarily fragmented reads, a per-connection session
//! loop that dispatches to a pluggable service, and a symmetric client.

pub mod client;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod net;
pub mod protocol;
pub mod server;
pub mod service;

pub use client::RpcClient;
pub use config::ServerConfig;
pub use error::{Error, Result};
pub use lifecycle::Shutdown;
pub use server::RpcServer;
