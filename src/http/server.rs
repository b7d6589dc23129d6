//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, timeout, request context)
//! - Serve until the shutdown signal fires

use axum::{extract::State, middleware, routing::get, Json, Router};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::Config;
use crate::context::{ContextFacade, LogContext};
use crate::health::{HandlerRegistry, HealthReporter, HealthResponse};
use crate::http::request::request_context;
use crate::observability::{OperationMetric, PerformanceMonitor};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub facade: ContextFacade,
    pub monitor: PerformanceMonitor,
    pub health: Arc<HealthReporter>,
}

impl AppState {
    /// Build every subsystem from config: store, provider, monitor, handler registry.
    pub fn from_config(config: &Config) -> Self {
        let runtime = config.runtime.resolve();
        let facade = ContextFacade::new(runtime)
            .with_provider(config.observability.tracing_provider.build());
        let registry = Arc::new(HandlerRegistry::new(&config.handlers));

        Self {
            facade,
            monitor: PerformanceMonitor::new(),
            health: Arc::new(HealthReporter::new(registry, runtime)),
        }
    }
}

/// HTTP server exposing health, operation metrics and context echo.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(config: &Config, state: AppState) -> Self {
        let router = Self::build_router(config, state);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &Config, state: AppState) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .route("/metrics/operations", get(operations_handler))
            .route("/context", get(context_handler))
            .route_layer(middleware::from_fn_with_state(state.clone(), request_context))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.server.request_timeout_secs,
            )))
            .layer(TraceLayer::new_for_http())
    }

    /// The configured router, e.g. for `tower::ServiceExt::oneshot`.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn health_handler(State(state): State<AppState>) -> HealthResponse {
    state.health.report()
}

async fn operations_handler(
    State(state): State<AppState>,
) -> Json<BTreeMap<String, OperationMetric>> {
    Json(state.monitor.get_metrics())
}

async fn context_handler(State(state): State<AppState>) -> Json<Option<LogContext>> {
    Json(state.facade.get_log_context())
}
