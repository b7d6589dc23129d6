//! HTTP surface.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, trace + timeout layers)
//!     → request.rs (request ID, log context scope, timing)
//!     → handlers: /health, /metrics/operations, /context
//!     → response.rs (health result → status code + JSON)
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{request_context, RequestId, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
