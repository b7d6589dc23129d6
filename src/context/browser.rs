//! Browser store: one slot per execution context.
//!
//! Each tab or worker runs its own thread of execution, so a thread-local
//! slot gives every execution context its own store. Async scopes install
//! their cell around each poll, which keeps the context attributed
//! correctly after the future resumes from a suspension.
//!
//! Besides scopes, the store keeps a root context: the single mutable
//! global of the execution context, written when no scope is active.

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::sync::Arc;

use crate::context::log_context::LogContext;
use crate::context::store::{new_cell, slot_current, ScopeCell, Slot, SlotGuard, SlotScoped};

thread_local! {
    static BROWSER_SLOT: Slot = const { RefCell::new(None) };
    static BROWSER_ROOT: ScopeCell = new_cell(LogContext::default());
    static BROWSER_ROOT_SET: Cell<bool> = const { Cell::new(false) };
}

/// Single-threaded event-loop store with a mutable root context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BrowserContextStore;

impl BrowserContextStore {
    /// The active scope, else the root context once anything was written to it.
    pub fn current(&self) -> Option<ScopeCell> {
        slot_current(&BROWSER_SLOT).or_else(|| {
            let written = BROWSER_ROOT_SET.try_with(Cell::get).unwrap_or(false);
            written.then(|| self.root())
        })
    }

    /// The active scope only, ignoring the root context.
    pub fn active(&self) -> Option<ScopeCell> {
        slot_current(&BROWSER_SLOT)
    }

    /// Root context of this execution context.
    pub fn root(&self) -> ScopeCell {
        BROWSER_ROOT
            .try_with(Arc::clone)
            .unwrap_or_else(|_| new_cell(LogContext::default()))
    }

    /// Root context, about to be written; reads see it from now on.
    pub fn write_root(&self) -> ScopeCell {
        let _ = BROWSER_ROOT_SET.try_with(|set| set.set(true));
        self.root()
    }

    /// Forget the root context, as on page reload.
    pub fn reset_root(&self) {
        let _ = BROWSER_ROOT.try_with(|root| root.store(Arc::new(LogContext::default())));
        let _ = BROWSER_ROOT_SET.try_with(|set| set.set(false));
    }

    pub fn enter<F: Future>(&self, cell: ScopeCell, fut: F) -> SlotScoped<F> {
        SlotScoped::new(&BROWSER_SLOT, cell, fut)
    }

    pub fn enter_sync<R>(&self, cell: ScopeCell, f: impl FnOnce() -> R) -> R {
        let _guard = SlotGuard::enter(&BROWSER_SLOT, cell);
        f()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_only_visible_after_write() {
        let store = BrowserContextStore;
        store.reset_root();
        assert!(store.current().is_none());

        store.write_root().rcu(|ctx| Arc::new(ctx.merge(&LogContext::new().with_session_id("s"))));
        let ctx = store.current().unwrap().load_full();
        assert_eq!(ctx.session_id.as_deref(), Some("s"));

        store.reset_root();
        assert!(store.current().is_none());
    }

    #[test]
    fn test_reading_root_does_not_mark_it_written() {
        let store = BrowserContextStore;
        store.reset_root();
        let _ = store.root();
        assert!(store.current().is_none());
        assert!(store.active().is_none());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_context_survives_suspension() {
        let store = BrowserContextStore;
        let cell = new_cell(LogContext::new().with_action("click"));
        let observed = store
            .enter(cell, async {
                tokio::task::yield_now().await;
                store.current().and_then(|c| c.load().action.clone())
            })
            .await;
        assert_eq!(observed.as_deref(), Some("click"));
        assert!(slot_current(&BROWSER_SLOT).is_none());
    }

    #[test]
    fn test_each_thread_has_its_own_root() {
        let store = BrowserContextStore;
        store.reset_root();
        store.write_root().store(Arc::new(LogContext::new().with_user_id("tab-1")));

        let other = std::thread::spawn(move || store.current().is_none())
            .join()
            .unwrap();
        assert!(other);
        store.reset_root();
    }
}
