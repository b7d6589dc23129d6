//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the `tracing` subscriber from config
//! - Build the scope span that carries log context fields
//!
//! # Design Decisions
//! - JSON format for production, pretty format for development
//! - `RUST_LOG` wins over the configured level
//! - Context reaches every record through the enclosing scope span, so
//!   call sites never pass it explicitly

use tracing::field::Empty;
use tracing::Span;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Layer};

use crate::config::{LogFormat, ObservabilityConfig};
use crate::context::LogContext;

/// Install the global subscriber.
pub fn init_logging(config: &ObservabilityConfig) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let fmt_layer = match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer().boxed(),
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(filter)
        .try_init()
}

/// Span for one context scope, with every present key recorded as a field.
pub fn scope_span(ctx: &LogContext) -> Span {
    let span = tracing::info_span!(
        "logscope.scope",
        request_id = Empty,
        trace_id = Empty,
        span_id = Empty,
        session_id = Empty,
        source = Empty,
        action = Empty,
        component = Empty,
        user_id = Empty,
        tenant_id = Empty,
        correlation_id = Empty,
    );
    record_context(&span, ctx);
    span
}

/// Record present keys on `span`. Fields the span does not declare are ignored.
pub fn record_context(span: &Span, ctx: &LogContext) {
    for (key, value) in ctx.iter() {
        span.record(key.field_name(), value);
    }
}
