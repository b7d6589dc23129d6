//! Execution environment detection.
//!
//! # Data Flow
//! ```text
//! Process start
//!     → RuntimeProbe::ambient() (build target + features)
//!     → detect() (pure)
//!     → Runtime { Server | Browser | Edge }
//!     → ContextFacade picks its store once
//! ```
//!
//! # Design Decisions
//! - Detection is pure over the probe so it can be tested on any host
//! - Ambiguous environments resolve to Edge, the most restrictive store
//! - Config may pin the runtime instead of detecting it

pub mod detect;

pub use detect::{detect, get_runtime, Runtime, RuntimeProbe};
