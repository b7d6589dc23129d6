//! Edge store: invocation-scoped storage.
//!
//! Edge hosts may reuse one sandbox for unrelated requests, so nothing is
//! kept across invocations. There is no root context: reads outside a scope
//! return nothing and writes outside a scope are dropped. When the
//! outermost scope exits the slot is empty again.

use std::cell::RefCell;
use std::future::Future;

use crate::context::log_context::LogContext;
use crate::context::store::{new_cell, slot_current, ScopeCell, Slot, SlotGuard, SlotScoped};

thread_local! {
    static EDGE_SLOT: Slot = const { RefCell::new(None) };
}

/// Stateless-per-invocation store for sandboxed edge runtimes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeContextStore;

impl EdgeContextStore {
    pub fn current(&self) -> Option<ScopeCell> {
        slot_current(&EDGE_SLOT)
    }

    pub fn enter<F: Future>(&self, cell: ScopeCell, fut: F) -> SlotScoped<F> {
        SlotScoped::new(&EDGE_SLOT, cell, fut)
    }

    pub fn enter_sync<R>(&self, cell: ScopeCell, f: impl FnOnce() -> R) -> R {
        let _guard = SlotGuard::enter(&EDGE_SLOT, cell);
        f()
    }

    /// Run one invocation from a clean context, whatever is currently installed.
    pub fn invocation<F: Future>(&self, fut: F) -> SlotScoped<F> {
        self.enter(new_cell(LogContext::default()), fut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(flavor = "current_thread")]
    async fn test_nothing_outlives_invocation() {
        let store = EdgeContextStore;
        assert!(store.current().is_none());

        store
            .invocation(async {
                let cell = store.current().unwrap();
                cell.store(std::sync::Arc::new(LogContext::new().with_request_id("first")));
                tokio::task::yield_now().await;
                assert_eq!(
                    store.current().unwrap().load().request_id.as_deref(),
                    Some("first")
                );
            })
            .await;

        assert!(store.current().is_none());

        // A reused slot starts clean.
        let seen = store
            .invocation(async { store.current().unwrap().load().request_id.clone() })
            .await;
        assert!(seen.is_none());
    }
}
