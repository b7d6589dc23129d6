//! Log context propagation subsystem.
//!
//! # Data Flow
//! ```text
//! Caller opens a unit of work
//!     → facade.rs scope(partial, fut): merge partial onto current context
//!     → store.rs picks the backend chosen at startup
//!         server.rs  (tokio task-local, follows the future)
//!         browser.rs (per-execution-context slot + root context)
//!         edge.rs    (per-invocation slot, nothing kept between invocations)
//!     → every log record inside the scope carries the context via its span
//!     → on exit (return, panic, cancellation) the parent context is current again
//! ```
//!
//! # Design Decisions
//! - One store per process, selected once, dispatched without re-probing
//! - Scopes derive a new context; the parent is never mutated by a child
//! - "No context" is `None`, not an empty default
//! - Restoration is tied to `Drop`, so it runs on every exit path

pub mod browser;
pub mod edge;
pub mod facade;
pub mod log_context;
pub mod server;
pub mod store;

pub use browser::BrowserContextStore;
pub use edge::EdgeContextStore;
pub use facade::ContextFacade;
pub use log_context::{ContextKey, LogContext};
pub use server::ServerContextStore;
pub use store::{ContextStore, ScopeCell};
