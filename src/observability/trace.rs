//! Tracing providers.
//!
//! # Responsibilities
//! - Supply trace/span ids for log records that do not carry their own
//! - Hide whether a tracing backend is present at all
//!
//! # Design Decisions
//! - Provider is chosen once when the façade is built, never probed per call
//! - `NoopTracingProvider` is the safe default when no backend is wired in
//! - `SpanTracingProvider` reports the current `tracing` span id

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Ids contributed by a tracing backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceIds {
    pub trace_id: Option<String>,
    pub span_id: Option<String>,
}

/// Capability interface over an optional tracing backend.
pub trait TracingProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Ids of the span currently executing, if the backend knows one.
    fn current_ids(&self) -> Option<TraceIds>;
}

/// Provider used when no tracing backend is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTracingProvider;

impl TracingProvider for NoopTracingProvider {
    fn name(&self) -> &'static str {
        "noop"
    }

    fn current_ids(&self) -> Option<TraceIds> {
        None
    }
}

/// Reads the id of the current `tracing` span.
///
/// Span ids are only assigned while a subscriber is installed; without one
/// this behaves like [`NoopTracingProvider`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SpanTracingProvider;

impl TracingProvider for SpanTracingProvider {
    fn name(&self) -> &'static str {
        "span"
    }

    fn current_ids(&self) -> Option<TraceIds> {
        let id = tracing::Span::current().id()?;
        Some(TraceIds {
            trace_id: None,
            span_id: Some(format!("{:016x}", id.into_u64())),
        })
    }
}

/// Provider selection as written in config.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Noop,
    Span,
}

impl ProviderKind {
    pub fn build(self) -> Arc<dyn TracingProvider> {
        match self {
            ProviderKind::Noop => Arc::new(NoopTracingProvider),
            ProviderKind::Span => Arc::new(SpanTracingProvider),
        }
    }
}
