//! Scoped log context propagation and in-process observability.

pub mod config;
pub mod context;
pub mod health;
pub mod http;
pub mod id;
pub mod lifecycle;
pub mod observability;
pub mod runtime;

pub use config::Config;
pub use context::{ContextFacade, ContextKey, LogContext};
pub use health::{check_health, HandlerAvailability, HandlerState, HealthStatus};
pub use id::generate_id;
pub use observability::{OperationMetric, PerformanceMonitor};
pub use runtime::{get_runtime, Runtime};
