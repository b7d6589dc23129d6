//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files, and
//! every section falls back to its defaults when omitted.

use serde::{Deserialize, Serialize};

use crate::observability::trace::ProviderKind;
use crate::runtime::{get_runtime, Runtime};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Config {
    /// Which context store to use.
    pub runtime: RuntimeSetting,

    /// Logging, tracing and metrics settings.
    pub observability: ObservabilityConfig,

    /// Which log sink handlers are enabled.
    pub handlers: HandlersConfig,

    /// HTTP surface of the binary.
    pub server: ServerConfig,
}

/// Runtime selection: detect or pin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeSetting {
    #[default]
    Auto,
    Server,
    Browser,
    Edge,
}

impl RuntimeSetting {
    pub fn resolve(self) -> Runtime {
        match self {
            RuntimeSetting::Auto => get_runtime(),
            RuntimeSetting::Server => Runtime::Server,
            RuntimeSetting::Browser => Runtime::Browser,
            RuntimeSetting::Edge => Runtime::Edge,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Filter directive (e.g. "info", "logscope=debug,tower_http=info").
    pub log_level: String,

    /// Output format.
    pub log_format: LogFormat,

    /// Tracing provider feeding trace/span ids.
    pub tracing_provider: ProviderKind,

    /// Install the Prometheus exporter.
    pub prometheus_enabled: bool,

    /// Prometheus scrape listener address.
    pub prometheus_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            tracing_provider: ProviderKind::Noop,
            prometheus_enabled: false,
            prometheus_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Log sink handlers.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HandlersConfig {
    pub console_enabled: bool,
    pub file_enabled: bool,
    pub database_enabled: bool,
}

impl Default for HandlersConfig {
    fn default() -> Self {
        Self {
            console_enabled: true,
            file_enabled: false,
            database_enabled: false,
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}
