//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     Signal received → broadcast → HTTP server drains and exits
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger
//! ```
//!
//! The service holds no state worth flushing: in-flight requests finish,
//! then the process exits.

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
