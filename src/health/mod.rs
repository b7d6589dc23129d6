//! Health reporting subsystem.
//!
//! # Data Flow
//! ```text
//! Sink handlers (console/file/database, external):
//!     → report state into state.rs (HandlerRegistry)
//!
//! Health check request:
//!     → reporter.rs snapshots the registry
//!     → check_health() → Healthy | Degraded | Unhealthy
//!     → http status: 200 / 200 / 503
//! ```
//!
//! # Design Decisions
//! - Status is a pure function of the three handler states
//! - Degraded still serves, so it keeps the 200 response code
//! - Only the server runtime has sinks to report on; others answer "not applicable"

pub mod reporter;
pub mod state;

pub use reporter::{check_health, HealthReport, HealthReporter, HealthResponse, HealthStatus};
pub use state::{HandlerAvailability, HandlerKind, HandlerRegistry, HandlerState};
