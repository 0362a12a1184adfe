//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     Trigger received → Stop accepting → Drain connections → Exit
//!
//! Signals (signals.rs):
//!     SIGINT/ctrl-c → Trigger graceful shutdown
//!
//! A service reporting a fatal condition triggers the same path.
//! ```
//!
//! # Design Decisions
//! - Ordered shutdown: stop accept, drain, close
//! - One broadcast channel; every long-running task subscribes

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
