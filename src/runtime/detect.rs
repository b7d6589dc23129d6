//! Runtime detector.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The three execution environments a store can be built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Runtime {
    /// Threaded/async host with a full server API surface.
    Server,
    /// Single-threaded event loop with a window-like global.
    Browser,
    /// Sandboxed, invocation-scoped host.
    Edge,
}

impl Runtime {
    pub fn as_str(self) -> &'static str {
        match self {
            Runtime::Server => "server",
            Runtime::Browser => "browser",
            Runtime::Edge => "edge",
        }
    }
}

impl fmt::Display for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown runtime `{0}` (expected server, browser or edge)")]
pub struct ParseRuntimeError(pub String);

impl FromStr for Runtime {
    type Err = ParseRuntimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "server" => Ok(Runtime::Server),
            "browser" => Ok(Runtime::Browser),
            "edge" => Ok(Runtime::Edge),
            other => Err(ParseRuntimeError(other.to_string())),
        }
    }
}

/// Markers observed about the host at process start.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuntimeProbe {
    /// A browser `window`-like global is present.
    pub has_window: bool,
    /// The full server API surface (threads, filesystem, sockets) is present.
    pub has_server_api: bool,
}

impl RuntimeProbe {
    /// Markers for the current build target.
    ///
    /// Native targets carry the server API. `wasm32` builds with the
    /// `browser` feature run under a window global; any other `wasm32`
    /// build is treated as an edge sandbox.
    pub const fn ambient() -> Self {
        Self {
            has_window: cfg!(all(target_family = "wasm", feature = "browser")),
            has_server_api: cfg!(not(target_family = "wasm")),
        }
    }
}

/// Classify a probe. Never fails; ambiguous input yields `Edge`.
pub fn detect(probe: &RuntimeProbe) -> Runtime {
    if probe.has_window {
        Runtime::Browser
    } else if probe.has_server_api {
        Runtime::Server
    } else {
        Runtime::Edge
    }
}

/// Runtime of the current process.
pub fn get_runtime() -> Runtime {
    detect(&RuntimeProbe::ambient())
}
