//! Log sink handler state.
//!
//! # States
//! - Available: handler enabled and writing
//! - Unavailable: handler disabled or not reachable
//! - Error: handler enabled but failing
//!
//! # Design Decisions
//! - Sink handlers report from any thread; state lives in atomics
//! - A disabled handler is pinned to Unavailable
//! - State changes logged for observability

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

use crate::config::HandlersConfig;

/// The three downstream log sinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandlerKind {
    Console,
    File,
    Database,
}

impl HandlerKind {
    pub const ALL: [HandlerKind; 3] = [HandlerKind::Console, HandlerKind::File, HandlerKind::Database];

    /// File and database keep records beyond the process.
    pub fn is_durable(self) -> bool {
        matches!(self, HandlerKind::File | HandlerKind::Database)
    }
}

impl fmt::Display for HandlerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HandlerKind::Console => "console",
            HandlerKind::File => "file",
            HandlerKind::Database => "database",
        })
    }
}

/// Availability of one handler.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandlerState {
    Unavailable = 0,
    Available = 1,
    Error = 2,
}

impl From<u8> for HandlerState {
    fn from(val: u8) -> Self {
        match val {
            1 => HandlerState::Available,
            2 => HandlerState::Error,
            _ => HandlerState::Unavailable,
        }
    }
}

/// Point-in-time view of all three handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerAvailability {
    pub console: HandlerState,
    pub file: HandlerState,
    pub database: HandlerState,
}

impl HandlerAvailability {
    pub fn get(&self, kind: HandlerKind) -> HandlerState {
        match kind {
            HandlerKind::Console => self.console,
            HandlerKind::File => self.file,
            HandlerKind::Database => self.database,
        }
    }
}

struct HandlerSlot {
    enabled: bool,
    state: AtomicU8,
}

impl HandlerSlot {
    fn new(enabled: bool) -> Self {
        let initial = if enabled {
            HandlerState::Available
        } else {
            HandlerState::Unavailable
        };
        Self {
            enabled,
            state: AtomicU8::new(initial as u8),
        }
    }
}

/// Live handler states, shared with the sink handlers.
pub struct HandlerRegistry {
    console: HandlerSlot,
    file: HandlerSlot,
    database: HandlerSlot,
}

impl HandlerRegistry {
    /// Enabled handlers start Available, the rest Unavailable.
    pub fn new(config: &HandlersConfig) -> Self {
        Self {
            console: HandlerSlot::new(config.console_enabled),
            file: HandlerSlot::new(config.file_enabled),
            database: HandlerSlot::new(config.database_enabled),
        }
    }

    fn slot(&self, kind: HandlerKind) -> &HandlerSlot {
        match kind {
            HandlerKind::Console => &self.console,
            HandlerKind::File => &self.file,
            HandlerKind::Database => &self.database,
        }
    }

    pub fn is_enabled(&self, kind: HandlerKind) -> bool {
        self.slot(kind).enabled
    }

    /// Report a handler's state. Reports for disabled handlers are ignored.
    pub fn report(&self, kind: HandlerKind, state: HandlerState) {
        let slot = self.slot(kind);
        if !slot.enabled {
            tracing::debug!(handler = %kind, state = ?state, "Ignoring state report for disabled handler");
            return;
        }
        let previous = HandlerState::from(slot.state.swap(state as u8, Ordering::Relaxed));
        if previous != state {
            tracing::info!(handler = %kind, from = ?previous, to = ?state, "Handler state changed");
        }
    }

    pub fn get(&self, kind: HandlerKind) -> HandlerState {
        HandlerState::from(self.slot(kind).state.load(Ordering::Relaxed))
    }

    pub fn snapshot(&self) -> HandlerAvailability {
        HandlerAvailability {
            console: self.get(HandlerKind::Console),
            file: self.get(HandlerKind::File),
            database: self.get(HandlerKind::Database),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(console: bool, file: bool, database: bool) -> HandlersConfig {
        HandlersConfig {
            console_enabled: console,
            file_enabled: file,
            database_enabled: database,
        }
    }

    #[test]
    fn test_initial_states_follow_config() {
        let registry = HandlerRegistry::new(&config(true, false, true));
        assert_eq!(
            registry.snapshot(),
            HandlerAvailability {
                console: HandlerState::Available,
                file: HandlerState::Unavailable,
                database: HandlerState::Available,
            }
        );
    }

    #[test]
    fn test_reports_update_enabled_handlers_only() {
        let registry = HandlerRegistry::new(&config(true, false, true));
        registry.report(HandlerKind::Database, HandlerState::Error);
        registry.report(HandlerKind::File, HandlerState::Error);

        assert_eq!(registry.get(HandlerKind::Database), HandlerState::Error);
        assert_eq!(registry.get(HandlerKind::File), HandlerState::Unavailable);

        registry.report(HandlerKind::Database, HandlerState::Available);
        assert_eq!(registry.get(HandlerKind::Database), HandlerState::Available);
    }

    #[test]
    fn test_state_from_u8() {
        assert_eq!(HandlerState::from(1), HandlerState::Available);
        assert_eq!(HandlerState::from(2), HandlerState::Error);
        assert_eq!(HandlerState::from(9), HandlerState::Unavailable);
    }
}
