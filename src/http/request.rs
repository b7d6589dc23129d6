//! Request context middleware.
//!
//! # Responsibilities
//! - Take the request ID from `x-request-id` or issue a new one
//! - Pick up W3C `traceparent` and `x-correlation-id` when present
//! - Run the rest of the request inside a log context scope
//! - Time the request in the performance monitor
//! - Echo the request ID on the response
//!
//! # Design Decisions
//! - Request ID attached as early as possible for tracing
//! - Client-supplied IDs are accepted only if short and printable
//! - Operations are keyed by matched route, not raw path

use axum::{
    extract::{MatchedPath, Request, State},
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};

use crate::context::LogContext;
use crate::http::server::AppState;
use crate::id::generate_id;
use crate::observability::performance::OperationTimer;

pub const X_REQUEST_ID: &str = "x-request-id";
pub const X_CORRELATION_ID: &str = "x-correlation-id";
pub const TRACEPARENT: &str = "traceparent";

const MAX_CLIENT_ID_LEN: usize = 128;

/// Request ID of the current request, stored in request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

/// Trace and parent span IDs from a W3C `traceparent` header.
pub fn parse_traceparent(value: &str) -> Option<(String, String)> {
    let mut parts = value.trim().split('-');
    let version = parts.next()?;
    let trace_id = parts.next()?;
    let span_id = parts.next()?;
    let flags = parts.next()?;

    let is_hex = |s: &str, len: usize| {
        s.len() == len && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    };
    if !is_hex(version, 2) || version == "ff" || !is_hex(trace_id, 32) || !is_hex(span_id, 16) || !is_hex(flags, 2) {
        return None;
    }
    if trace_id.bytes().all(|b| b == b'0') || span_id.bytes().all(|b| b == b'0') {
        return None;
    }
    Some((trace_id.to_string(), span_id.to_string()))
}

fn client_id(headers: &HeaderMap, name: &str) -> Option<String> {
    let value = headers.get(name)?.to_str().ok()?.trim();
    let acceptable = !value.is_empty()
        && value.len() <= MAX_CLIENT_ID_LEN
        && value.bytes().all(|b| b.is_ascii_graphic());
    acceptable.then(|| value.to_string())
}

/// Build the scope context for an incoming request.
pub fn request_log_context(headers: &HeaderMap, request_id: &str, operation: &str) -> LogContext {
    let mut ctx = LogContext::new()
        .with_request_id(request_id)
        .with_source("http")
        .with_action(operation);
    if let Some((trace_id, span_id)) = headers
        .get(TRACEPARENT)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_traceparent)
    {
        ctx = ctx.with_trace_id(trace_id).with_span_id(span_id);
    }
    if let Some(correlation_id) = client_id(headers, X_CORRELATION_ID) {
        ctx = ctx.with_correlation_id(correlation_id);
    }
    ctx
}

/// Middleware: run the request inside its log context scope.
pub async fn request_context(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());
    let operation = format!("{} {}", request.method(), path);

    let request_id = client_id(request.headers(), X_REQUEST_ID)
        .unwrap_or_else(generate_id);
    let partial = request_log_context(request.headers(), &request_id, &operation);
    request.extensions_mut().insert(RequestId(request_id.clone()));

    // Dropped before a response (timeout, disconnect) counts as an error.
    let timer = OperationTimer::start(&state.monitor, &operation);
    let mut response = state
        .facade
        .scope(partial, async move {
            tracing::debug!("Handling request");
            let response = next.run(request).await;
            tracing::debug!(status = %response.status(), "Request handled");
            response
        })
        .await;

    timer.finish(response.status().is_server_error());

    match HeaderValue::from_str(&request_id) {
        Ok(value) => {
            response.headers_mut().insert(X_REQUEST_ID, value);
        }
        Err(e) => tracing::warn!(request_id = %request_id, error = %e, "Cannot echo request id"),
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::body::Body;
    use axum::http::{Request as HttpRequest, StatusCode};
    use axum::{middleware, routing::get, Router};
    use std::time::Duration;
    use tower::ServiceExt;
    use tower_http::timeout::TimeoutLayer;

    #[tokio::test]
    #[allow(deprecated)]
    async fn test_timed_out_request_is_recorded_as_error() {
        let state = AppState::from_config(&Config::default());
        let router = Router::new()
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_millis(200)).await;
                    "late"
                }),
            )
            .route_layer(middleware::from_fn_with_state(state.clone(), request_context))
            .with_state(state.clone())
            .layer(TimeoutLayer::new(Duration::from_millis(20)));

        let response = router
            .oneshot(HttpRequest::builder().uri("/slow").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);

        let metric = state.monitor.get("GET /slow").unwrap();
        assert_eq!(metric.count, 1);
        assert_eq!(metric.errors, 1);
    }

    #[test]
    fn test_parse_traceparent() {
        let parsed = parse_traceparent("00-0af7651916cd43dd8448eb211c80319c-b7ad6b7169203331-01");
        assert_eq!(
            parsed,
            Some((
                "0af7651916cd43dd8448eb211c80319c".to_string(),
                "b7ad6b7169203331".to_string()
            ))
        );

        assert!(parse_traceparent("00-00000000000000000000000000000000-b7ad6b7169203331-01").is_none());
        assert!(parse_traceparent("ff-0af7651916cd43dd8448eb211c80319c-b7ad6b7169203331-01").is_none());
        assert!(parse_traceparent("00-0AF7651916CD43DD8448EB211C80319C-b7ad6b7169203331-01").is_none());
        assert!(parse_traceparent("garbage").is_none());
    }

    #[test]
    fn test_client_ids_are_filtered() {
        let mut headers = HeaderMap::new();
        headers.insert(X_REQUEST_ID, HeaderValue::from_static("abc-123"));
        assert_eq!(client_id(&headers, X_REQUEST_ID).as_deref(), Some("abc-123"));

        headers.insert(X_REQUEST_ID, HeaderValue::from_static("has space"));
        assert!(client_id(&headers, X_REQUEST_ID).is_none());

        let long = "a".repeat(MAX_CLIENT_ID_LEN + 1);
        headers.insert(X_REQUEST_ID, HeaderValue::from_str(&long).unwrap());
        assert!(client_id(&headers, X_REQUEST_ID).is_none());
    }

    #[test]
    fn test_request_log_context() {
        let mut headers = HeaderMap::new();
        headers.insert(
            TRACEPARENT,
            HeaderValue::from_static("00-0af7651916cd43dd8448eb211c80319c-b7ad6b7169203331-01"),
        );
        headers.insert(X_CORRELATION_ID, HeaderValue::from_static("corr-7"));

        let ctx = request_log_context(&headers, "req-1", "GET /context");
        assert_eq!(ctx.request_id.as_deref(), Some("req-1"));
        assert_eq!(ctx.source.as_deref(), Some("http"));
        assert_eq!(ctx.action.as_deref(), Some("GET /context"));
        assert_eq!(ctx.trace_id.as_deref(), Some("0af7651916cd43dd8448eb211c80319c"));
        assert_eq!(ctx.correlation_id.as_deref(), Some("corr-7"));
    }
}
