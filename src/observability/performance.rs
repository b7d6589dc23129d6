//! In-process performance monitor.
//!
//! Aggregates duration and error counters per operation name. Nothing is
//! persisted; derived values are computed when a snapshot is taken.

use dashmap::DashMap;
use serde::Serialize;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use crate::observability::metrics;

/// Running totals for one operation name.
#[derive(Debug, Clone, Copy)]
struct OperationStats {
    count: u64,
    total_duration: f64,
    min_duration: f64,
    max_duration: f64,
    errors: u64,
}

impl OperationStats {
    fn first(duration_ms: f64, is_error: bool) -> Self {
        Self {
            count: 1,
            total_duration: duration_ms,
            min_duration: duration_ms,
            max_duration: duration_ms,
            errors: u64::from(is_error),
        }
    }

    fn add(&mut self, duration_ms: f64, is_error: bool) {
        self.count += 1;
        self.total_duration += duration_ms;
        self.min_duration = self.min_duration.min(duration_ms);
        self.max_duration = self.max_duration.max(duration_ms);
        if is_error {
            self.errors += 1;
        }
    }
}

/// Snapshot of one operation, durations in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationMetric {
    pub count: u64,
    pub total_duration: f64,
    pub avg_duration: f64,
    pub min_duration: f64,
    pub max_duration: f64,
    pub errors: u64,
    pub error_rate: f64,
}

impl From<&OperationStats> for OperationMetric {
    fn from(stats: &OperationStats) -> Self {
        let (avg_duration, error_rate) = if stats.count == 0 {
            (0.0, 0.0)
        } else {
            let count = stats.count as f64;
            (stats.total_duration / count, stats.errors as f64 / count)
        };
        Self {
            count: stats.count,
            total_duration: stats.total_duration,
            avg_duration,
            min_duration: stats.min_duration,
            max_duration: stats.max_duration,
            errors: stats.errors,
            error_rate,
        }
    }
}

/// Thread-safe per-operation aggregator.
///
/// Clones share the same counters. Each operation's totals sit behind its
/// map shard lock, so concurrent samples for one name are never lost.
#[derive(Debug, Clone, Default)]
pub struct PerformanceMonitor {
    inner: Arc<DashMap<String, OperationStats>>,
}

impl PerformanceMonitor {
    /// Create an empty monitor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one sample for `operation`.
    pub fn record(&self, operation: &str, duration_ms: f64, is_error: bool) {
        let duration_ms = if duration_ms.is_finite() {
            duration_ms.max(0.0)
        } else {
            0.0
        };

        match self.inner.get_mut(operation) {
            Some(mut stats) => stats.add(duration_ms, is_error),
            None => {
                self.inner
                    .entry(operation.to_string())
                    .and_modify(|stats| stats.add(duration_ms, is_error))
                    .or_insert_with(|| OperationStats::first(duration_ms, is_error));
            }
        }

        metrics::record_operation(operation, duration_ms, is_error);
    }

    /// Time `fut` and record it; `Err`, panic and cancellation count as errors.
    ///
    /// The result, or the panic, reaches the caller unchanged.
    pub async fn time_operation<F, T, E>(&self, operation: &str, fut: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
    {
        let timer = OperationTimer::start(self, operation);
        let result = fut.await;
        timer.finish(result.is_err());
        result
    }

    /// Synchronous [`time_operation`](Self::time_operation).
    pub fn time_operation_sync<T, E>(
        &self,
        operation: &str,
        f: impl FnOnce() -> Result<T, E>,
    ) -> Result<T, E> {
        let timer = OperationTimer::start(self, operation);
        let result = f();
        timer.finish(result.is_err());
        result
    }

    /// Snapshot of every operation recorded so far.
    pub fn get_metrics(&self) -> BTreeMap<String, OperationMetric> {
        self.inner
            .iter()
            .map(|entry| (entry.key().clone(), OperationMetric::from(entry.value())))
            .collect()
    }

    /// Snapshot of one operation.
    pub fn get(&self, operation: &str) -> Option<OperationMetric> {
        self.inner.get(operation).map(|entry| OperationMetric::from(entry.value()))
    }

    /// Drop all accumulated state. Meant for test isolation.
    pub fn reset(&self) {
        self.inner.clear();
    }
}

/// Records a sample on drop; unless finished, the sample is an error.
pub(crate) struct OperationTimer<'a> {
    monitor: &'a PerformanceMonitor,
    operation: &'a str,
    started: Instant,
    is_error: bool,
}

impl<'a> OperationTimer<'a> {
    pub(crate) fn start(monitor: &'a PerformanceMonitor, operation: &'a str) -> Self {
        Self {
            monitor,
            operation,
            started: Instant::now(),
            is_error: true,
        }
    }

    pub(crate) fn finish(mut self, is_error: bool) {
        self.is_error = is_error;
    }
}

impl Drop for OperationTimer<'_> {
    fn drop(&mut self) {
        let elapsed_ms = self.started.elapsed().as_secs_f64() * 1000.0;
        self.monitor.record(self.operation, elapsed_ms, self.is_error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_record_aggregates() {
        let monitor = PerformanceMonitor::new();
        monitor.record("op", 100.0, false);
        monitor.record("op", 300.0, true);

        let metrics = monitor.get_metrics();
        assert_eq!(
            metrics["op"],
            OperationMetric {
                count: 2,
                total_duration: 400.0,
                avg_duration: 200.0,
                min_duration: 100.0,
                max_duration: 300.0,
                errors: 1,
                error_rate: 0.5,
            }
        );
    }

    #[test]
    fn test_zero_count_does_not_divide() {
        let stats = OperationStats {
            count: 0,
            total_duration: 0.0,
            min_duration: 0.0,
            max_duration: 0.0,
            errors: 0,
        };
        let metric = OperationMetric::from(&stats);
        assert_eq!(metric.avg_duration, 0.0);
        assert_eq!(metric.error_rate, 0.0);
    }

    #[test]
    fn test_reset_clears_everything() {
        let monitor = PerformanceMonitor::new();
        monitor.record("a", 1.0, false);
        monitor.record("b", 2.0, true);
        monitor.reset();
        assert!(monitor.get_metrics().is_empty());
        assert!(monitor.get("a").is_none());
    }

    #[test]
    fn test_instances_are_isolated() {
        let a = PerformanceMonitor::new();
        let b = PerformanceMonitor::new();
        a.record("op", 5.0, false);
        assert!(b.get("op").is_none());

        let shared = a.clone();
        shared.record("op", 7.0, false);
        assert_eq!(a.get("op").unwrap().count, 2);
    }

    #[test]
    fn test_sync_error_propagates_unchanged() {
        let monitor = PerformanceMonitor::new();
        let result: Result<(), String> =
            monitor.time_operation_sync("x", || Err("bad input".to_string()));
        assert_eq!(result, Err("bad input".to_string()));
        assert_eq!(monitor.get("x").unwrap().errors, 1);

        let ok: Result<u32, String> = monitor.time_operation_sync("x", || Ok(7));
        assert_eq!(ok, Ok(7));
        let metric = monitor.get("x").unwrap();
        assert_eq!(metric.count, 2);
        assert_eq!(metric.errors, 1);
    }

    #[test]
    fn test_panic_is_recorded_and_resumed() {
        let monitor = PerformanceMonitor::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _: Result<(), ()> = monitor.time_operation_sync("p", || panic!("boom"));
        }));
        let payload = result.unwrap_err();
        assert_eq!(payload.downcast_ref::<&str>(), Some(&"boom"));
        assert_eq!(monitor.get("p").unwrap().errors, 1);
    }

    #[tokio::test]
    async fn test_async_timing() {
        let monitor = PerformanceMonitor::new();
        let result: Result<&str, std::io::Error> = monitor
            .time_operation("sleep", async {
                tokio::time::sleep(Duration::from_millis(20)).await;
                Ok("done")
            })
            .await;
        assert_eq!(result.unwrap(), "done");

        let metric = monitor.get("sleep").unwrap();
        assert_eq!(metric.count, 1);
        assert_eq!(metric.errors, 0);
        assert!(metric.min_duration >= 20.0);
    }

    #[tokio::test]
    async fn test_async_error_propagates_unchanged() {
        let monitor = PerformanceMonitor::new();
        let err = monitor
            .time_operation("x", async {
                Err::<(), _>(std::io::Error::new(std::io::ErrorKind::NotFound, "missing"))
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
        assert_eq!(err.to_string(), "missing");
        assert_eq!(monitor.get("x").unwrap().errors, 1);
    }

    #[tokio::test]
    async fn test_cancelled_operation_counts_as_error() {
        let monitor = PerformanceMonitor::new();
        let pending = monitor.time_operation("hang", async {
            std::future::pending::<Result<(), ()>>().await
        });
        assert!(tokio::time::timeout(Duration::from_millis(10), pending)
            .await
            .is_err());
        assert_eq!(monitor.get("hang").unwrap().errors, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_records_are_not_lost() {
        let monitor = PerformanceMonitor::new();
        let mut handles = Vec::new();
        for _ in 0..8 {
            let monitor = monitor.clone();
            handles.push(tokio::spawn(async move {
                for i in 0..1_000 {
                    monitor.record("hot", 1.0, i % 10 == 0);
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        let metric = monitor.get("hot").unwrap();
        assert_eq!(metric.count, 8_000);
        assert_eq!(metric.errors, 800);
        assert_eq!(metric.total_duration, 8_000.0);
    }
}
