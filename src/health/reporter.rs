//! Health status synthesis.

use serde::Serialize;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use crate::health::state::{HandlerAvailability, HandlerKind, HandlerRegistry, HandlerState};
use crate::runtime::Runtime;

/// Overall status of the logging pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum HealthStatus {
    Healthy = 0,
    Degraded = 1,
    Unhealthy = 2,
}

/// No check has run yet.
const NO_STATUS: u8 = u8::MAX;

impl HealthStatus {
    /// 200 while the system can serve (healthy or degraded), 503 otherwise.
    pub fn http_status(self) -> u16 {
        match self {
            HealthStatus::Healthy | HealthStatus::Degraded => 200,
            HealthStatus::Unhealthy => 503,
        }
    }
}

/// Combine handler states into one status.
///
/// Any handler in error makes the system unhealthy. Losing both durable
/// handlers (file and database) degrades it. Anything else is healthy.
pub fn check_health(availability: &HandlerAvailability) -> HealthStatus {
    if HandlerKind::ALL
        .iter()
        .any(|kind| availability.get(*kind) == HandlerState::Error)
    {
        return HealthStatus::Unhealthy;
    }

    let durable_down = HandlerKind::ALL
        .iter()
        .filter(|kind| kind.is_durable())
        .all(|kind| availability.get(*kind) == HandlerState::Unavailable);

    if durable_down {
        HealthStatus::Degraded
    } else {
        HealthStatus::Healthy
    }
}

/// Body of a health report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: HealthStatus,
    pub handlers: HandlerAvailability,
    /// Seconds since the Unix epoch.
    pub timestamp: u64,
    pub uptime_secs: u64,
}

impl HealthReport {
    pub fn http_status(&self) -> u16 {
        self.status.http_status()
    }
}

/// Result of a health check request.
#[derive(Debug, Clone)]
pub enum HealthResponse {
    Report(HealthReport),
    /// The runtime has no backing log sinks to check.
    NotApplicable { runtime: Runtime },
}

/// Produces health reports from the live handler registry.
pub struct HealthReporter {
    registry: Arc<HandlerRegistry>,
    runtime: Runtime,
    started: Instant,
    last_status: AtomicU8,
}

impl HealthReporter {
    pub fn new(registry: Arc<HandlerRegistry>, runtime: Runtime) -> Self {
        Self {
            registry,
            runtime,
            started: Instant::now(),
            last_status: AtomicU8::new(NO_STATUS),
        }
    }

    pub fn registry(&self) -> &Arc<HandlerRegistry> {
        &self.registry
    }

    pub fn report(&self) -> HealthResponse {
        if self.runtime != Runtime::Server {
            return HealthResponse::NotApplicable {
                runtime: self.runtime,
            };
        }

        let handlers = self.registry.snapshot();
        let status = check_health(&handlers);
        if self.status_changed(status) {
            match status {
                HealthStatus::Healthy => {
                    tracing::info!(handlers = ?handlers, "Logging pipeline healthy")
                }
                _ => tracing::warn!(status = ?status, handlers = ?handlers, "Logging pipeline not healthy"),
            }
        } else {
            tracing::debug!(status = ?status, "Health checked");
        }

        HealthResponse::Report(HealthReport {
            status,
            handlers,
            timestamp: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs(),
            uptime_secs: self.started.elapsed().as_secs(),
        })
    }

    fn status_changed(&self, status: HealthStatus) -> bool {
        self.last_status.swap(status as u8, Ordering::Relaxed) != status as u8
    }
}
