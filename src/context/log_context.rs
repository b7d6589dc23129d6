//! The log context value.
//!
//! A `LogContext` is a fixed set of optional correlation keys. Scopes never
//! replace a context wholesale; they derive a new value by merging a partial
//! context on top of the parent.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Recognized context keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContextKey {
    RequestId,
    TraceId,
    SpanId,
    SessionId,
    Source,
    Action,
    Component,
    UserId,
    TenantId,
    CorrelationId,
}

impl ContextKey {
    /// All keys, in declaration order.
    pub const ALL: [ContextKey; 10] = [
        ContextKey::RequestId,
        ContextKey::TraceId,
        ContextKey::SpanId,
        ContextKey::SessionId,
        ContextKey::Source,
        ContextKey::Action,
        ContextKey::Component,
        ContextKey::UserId,
        ContextKey::TenantId,
        ContextKey::CorrelationId,
    ];

    /// Name used on the wire and in serialized records (`requestId`, ...).
    pub fn wire_name(self) -> &'static str {
        match self {
            ContextKey::RequestId => "requestId",
            ContextKey::TraceId => "traceId",
            ContextKey::SpanId => "spanId",
            ContextKey::SessionId => "sessionId",
            ContextKey::Source => "source",
            ContextKey::Action => "action",
            ContextKey::Component => "component",
            ContextKey::UserId => "userId",
            ContextKey::TenantId => "tenantId",
            ContextKey::CorrelationId => "correlationId",
        }
    }

    /// Name of the matching field on `tracing` scope spans.
    pub fn field_name(self) -> &'static str {
        match self {
            ContextKey::RequestId => "request_id",
            ContextKey::TraceId => "trace_id",
            ContextKey::SpanId => "span_id",
            ContextKey::SessionId => "session_id",
            ContextKey::Source => "source",
            ContextKey::Action => "action",
            ContextKey::Component => "component",
            ContextKey::UserId => "user_id",
            ContextKey::TenantId => "tenant_id",
            ContextKey::CorrelationId => "correlation_id",
        }
    }
}

impl fmt::Display for ContextKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Correlation metadata attached to log records.
///
/// Absent keys are `None`; an empty string is a value like any other.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LogContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
}

impl LogContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Shallow merge: keys present in `partial` win, the rest keep `self`'s value.
    pub fn merge(&self, partial: &LogContext) -> LogContext {
        let mut merged = self.clone();
        for key in ContextKey::ALL {
            if let Some(value) = partial.get(key) {
                *merged.slot_mut(key) = Some(value.to_string());
            }
        }
        merged
    }

    /// Value for `key`, if present.
    pub fn get(&self, key: ContextKey) -> Option<&str> {
        self.slot(key).as_deref()
    }

    /// Set `key` to `value`.
    pub fn set(&mut self, key: ContextKey, value: impl Into<String>) {
        *self.slot_mut(key) = Some(value.into());
    }

    /// Remove `key`.
    pub fn remove(&mut self, key: ContextKey) -> Option<String> {
        self.slot_mut(key).take()
    }

    /// True when no key is present.
    pub fn is_empty(&self) -> bool {
        ContextKey::ALL.iter().all(|key| self.slot(*key).is_none())
    }

    /// Present key/value pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (ContextKey, &str)> + '_ {
        ContextKey::ALL
            .into_iter()
            .filter_map(move |key| self.get(key).map(|value| (key, value)))
    }

    pub fn with(mut self, key: ContextKey, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn with_request_id(self, value: impl Into<String>) -> Self {
        self.with(ContextKey::RequestId, value)
    }

    pub fn with_trace_id(self, value: impl Into<String>) -> Self {
        self.with(ContextKey::TraceId, value)
    }

    pub fn with_span_id(self, value: impl Into<String>) -> Self {
        self.with(ContextKey::SpanId, value)
    }

    pub fn with_session_id(self, value: impl Into<String>) -> Self {
        self.with(ContextKey::SessionId, value)
    }

    pub fn with_source(self, value: impl Into<String>) -> Self {
        self.with(ContextKey::Source, value)
    }

    pub fn with_action(self, value: impl Into<String>) -> Self {
        self.with(ContextKey::Action, value)
    }

    pub fn with_component(self, value: impl Into<String>) -> Self {
        self.with(ContextKey::Component, value)
    }

    pub fn with_user_id(self, value: impl Into<String>) -> Self {
        self.with(ContextKey::UserId, value)
    }

    pub fn with_tenant_id(self, value: impl Into<String>) -> Self {
        self.with(ContextKey::TenantId, value)
    }

    pub fn with_correlation_id(self, value: impl Into<String>) -> Self {
        self.with(ContextKey::CorrelationId, value)
    }

    fn slot(&self, key: ContextKey) -> &Option<String> {
        match key {
            ContextKey::RequestId => &self.request_id,
            ContextKey::TraceId => &self.trace_id,
            ContextKey::SpanId => &self.span_id,
            ContextKey::SessionId => &self.session_id,
            ContextKey::Source => &self.source,
            ContextKey::Action => &self.action,
            ContextKey::Component => &self.component,
            ContextKey::UserId => &self.user_id,
            ContextKey::TenantId => &self.tenant_id,
            ContextKey::CorrelationId => &self.correlation_id,
        }
    }

    fn slot_mut(&mut self, key: ContextKey) -> &mut Option<String> {
        match key {
            ContextKey::RequestId => &mut self.request_id,
            ContextKey::TraceId => &mut self.trace_id,
            ContextKey::SpanId => &mut self.span_id,
            ContextKey::SessionId => &mut self.session_id,
            ContextKey::Source => &mut self.source,
            ContextKey::Action => &mut self.action,
            ContextKey::Component => &mut self.component,
            ContextKey::UserId => &mut self.user_id,
            ContextKey::TenantId => &mut self.tenant_id,
            ContextKey::CorrelationId => &mut self.correlation_id,
        }
    }
}
