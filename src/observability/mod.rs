//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Scoped code produces:
//!     → logging.rs (structured events, context via scope span)
//!     → performance.rs (per-operation duration/error aggregates)
//!     → metrics.rs (same samples mirrored to Prometheus, optional)
//!
//! trace.rs supplies trace/span ids to the context façade.
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Request ID flows through every record inside a scope
//! - Aggregation is in-process and O(1) per sample
//! - Tracing backends are optional behind a provider trait

pub mod logging;
pub mod metrics;
pub mod performance;
pub mod trace;

pub use performance::{OperationMetric, PerformanceMonitor};
pub use trace::{NoopTracingProvider, ProviderKind, SpanTracingProvider, TraceIds, TracingProvider};
