//! Metrics exposition.
//!
//! # Responsibilities
//! - Install the Prometheus exporter when enabled
//! - Mirror performance monitor samples to the `metrics` facade
//!
//! # Metrics
//! - `logscope_operations_total` (counter): samples by operation
//! - `logscope_operation_errors_total` (counter): failed samples by operation
//! - `logscope_operation_duration_ms` (histogram): sample durations
//!
//! # Design Decisions
//! - Without an installed recorder every call here is a no-op
//! - The in-memory monitor stays the source of truth for `/metrics/operations`

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;

/// Install the Prometheus exporter with a scrape listener on `addr`.
///
/// Must be called from within a tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    describe_metrics();
    tracing::info!(address = %addr, "Prometheus exporter listening");
    Ok(())
}

fn describe_metrics() {
    describe_counter!(
        "logscope_operations_total",
        "Samples recorded by the performance monitor"
    );
    describe_counter!(
        "logscope_operation_errors_total",
        "Samples recorded with the error flag set"
    );
    describe_histogram!(
        "logscope_operation_duration_ms",
        Unit::Milliseconds,
        "Duration of monitored operations"
    );
}

pub(crate) fn record_operation(operation: &str, duration_ms: f64, is_error: bool) {
    let operation = operation.to_string();
    counter!("logscope_operations_total", "operation" => operation.clone()).increment(1);
    if is_error {
        counter!("logscope_operation_errors_total", "operation" => operation.clone()).increment(1);
    }
    histogram!("logscope_operation_duration_ms", "operation" => operation).record(duration_ms);
}
