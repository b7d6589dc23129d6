//! logscope service.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ TraceLayer → TimeoutLayer → request_context ──▶ handler
//!                                                   │   scope(requestId, source, action)
//!                                                   │   timed in PerformanceMonitor
//!                                                   ▼
//!                              ┌────────────────────────────────────────┐
//!                              │ ContextFacade ── store chosen once     │
//!                              │   server  │ browser │ edge             │
//!                              ├────────────────────────────────────────┤
//!                              │ PerformanceMonitor ─▶ Prometheus (opt) │
//!                              │ HealthReporter  ◀── HandlerRegistry    │
//!                              └────────────────────────────────────────┘
//! ```
//!
//! Routes: `/health`, `/metrics/operations`, `/context`.

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use logscope::config::{load_config, Config};
use logscope::http::{AppState, HttpServer};
use logscope::lifecycle::Shutdown;
use logscope::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "logscope")]
#[command(about = "Log context propagation, operation metrics and health reporting", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `server.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };
    if let Some(bind) = cli.bind {
        config.server.bind_address = bind;
    }

    logging::init_logging(&config.observability)?;

    let state = AppState::from_config(&config);
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        runtime = %state.facade.runtime(),
        bind_address = %config.server.bind_address,
        tracing_provider = ?config.observability.tracing_provider,
        "logscope starting"
    );

    if config.observability.prometheus_enabled {
        match config.observability.prometheus_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to install Prometheus exporter");
                }
            }
            Err(_) => tracing::error!(
                prometheus_address = %config.observability.prometheus_address,
                "Failed to parse Prometheus address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();

    let server = HttpServer::new(&config, state);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
