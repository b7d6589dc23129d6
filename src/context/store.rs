//! Store selection and the thread-local slot shared by the browser and edge stores.

use arc_swap::ArcSwap;
use pin_project::pin_project;
use std::cell::RefCell;
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::thread::LocalKey;

use crate::context::browser::BrowserContextStore;
use crate::context::edge::EdgeContextStore;
use crate::context::log_context::LogContext;
use crate::context::server::ServerContextStore;
use crate::runtime::Runtime;

/// The context of one active scope.
///
/// Owned by one scope. Bound futures get their own copy; writes go through
/// `rcu` so a merge racing a request id issue is never lost.
pub type ScopeCell = Arc<ArcSwap<LogContext>>;

pub(crate) fn new_cell(ctx: LogContext) -> ScopeCell {
    Arc::new(ArcSwap::from_pointee(ctx))
}

/// Thread-local slot holding the scope currently installed on this thread.
pub(crate) type Slot = RefCell<Option<ScopeCell>>;

/// Installs a cell in a slot and puts the previous one back on drop.
///
/// Restoration runs on normal exit, unwinding and drop of a suspended
/// future alike. Guards are `!Send`: they never leave the thread whose slot
/// they modified.
pub(crate) struct SlotGuard {
    slot: &'static LocalKey<Slot>,
    installed: ScopeCell,
    previous: Option<ScopeCell>,
    _not_send: PhantomData<*const ()>,
}

impl SlotGuard {
    pub(crate) fn enter(slot: &'static LocalKey<Slot>, cell: ScopeCell) -> Self {
        let previous = slot.with(|s| s.borrow_mut().replace(Arc::clone(&cell)));
        Self {
            slot,
            installed: cell,
            previous,
            _not_send: PhantomData,
        }
    }
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        let previous = self.previous.take();
        let installed = &self.installed;
        // The slot is gone during thread teardown; nothing left to restore.
        let _ = self.slot.try_with(|s| {
            let current = s.replace(previous);
            let in_order = current
                .as_ref()
                .is_some_and(|c| Arc::ptr_eq(c, installed));
            if !std::thread::panicking() {
                debug_assert!(
                    in_order,
                    "log context scope restored out of order: another scope is current"
                );
            }
        });
    }
}

/// Future that installs its scope in a thread-local slot around every poll.
#[pin_project]
pub struct SlotScoped<F> {
    slot: &'static LocalKey<Slot>,
    cell: ScopeCell,
    #[pin]
    inner: F,
}

impl<F> SlotScoped<F> {
    pub(crate) fn new(slot: &'static LocalKey<Slot>, cell: ScopeCell, inner: F) -> Self {
        Self { slot, cell, inner }
    }
}

impl<F: Future> Future for SlotScoped<F> {
    type Output = F::Output;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        let _guard = SlotGuard::enter(*this.slot, Arc::clone(this.cell));
        this.inner.poll(cx)
    }
}

pub(crate) fn slot_current(slot: &'static LocalKey<Slot>) -> Option<ScopeCell> {
    slot.try_with(|s| s.borrow().clone()).ok().flatten()
}

/// One store per runtime, chosen once when the façade is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextStore {
    Server(ServerContextStore),
    Browser(BrowserContextStore),
    Edge(EdgeContextStore),
}

impl ContextStore {
    pub fn for_runtime(runtime: Runtime) -> Self {
        match runtime {
            Runtime::Server => ContextStore::Server(ServerContextStore),
            Runtime::Browser => ContextStore::Browser(BrowserContextStore),
            Runtime::Edge => ContextStore::Edge(EdgeContextStore),
        }
    }

    pub fn runtime(&self) -> Runtime {
        match self {
            ContextStore::Server(_) => Runtime::Server,
            ContextStore::Browser(_) => Runtime::Browser,
            ContextStore::Edge(_) => Runtime::Edge,
        }
    }

    /// Cell of the active scope, or the store's root cell if it keeps one.
    pub fn current(&self) -> Option<ScopeCell> {
        match self {
            ContextStore::Server(s) => s.current(),
            ContextStore::Browser(s) => s.current(),
            ContextStore::Edge(s) => s.current(),
        }
    }

    /// Cell of the active scope, never the root cell.
    pub fn active(&self) -> Option<ScopeCell> {
        match self {
            ContextStore::Server(s) => s.current(),
            ContextStore::Browser(s) => s.active(),
            ContextStore::Edge(s) => s.current(),
        }
    }

    /// Cell that receives writes made outside of any scope, if the store has one.
    ///
    /// On the browser store this marks the root as written.
    pub fn write_root(&self) -> Option<ScopeCell> {
        match self {
            ContextStore::Browser(s) => Some(s.write_root()),
            ContextStore::Server(_) | ContextStore::Edge(_) => None,
        }
    }

    /// Forget anything written outside of a scope.
    pub fn reset_root(&self) {
        if let ContextStore::Browser(s) = self {
            s.reset_root();
        }
    }

    pub async fn enter<F: Future>(&self, cell: ScopeCell, fut: F) -> F::Output {
        match self {
            ContextStore::Server(s) => s.enter(cell, fut).await,
            ContextStore::Browser(s) => s.enter(cell, fut).await,
            ContextStore::Edge(s) => s.enter(cell, fut).await,
        }
    }

    pub fn enter_sync<R>(&self, cell: ScopeCell, f: impl FnOnce() -> R) -> R {
        match self {
            ContextStore::Server(s) => s.enter_sync(cell, f),
            ContextStore::Browser(s) => s.enter_sync(cell, f),
            ContextStore::Edge(s) => s.enter_sync(cell, f),
        }
    }
}
