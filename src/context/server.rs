//! Server store: tokio task-local storage.
//!
//! The scope travels with the future itself, not with the thread polling
//! it, so interleaved tasks on a multi-thread runtime stay isolated.

use std::future::Future;
use std::sync::Arc;

use crate::context::store::ScopeCell;

tokio::task_local! {
    static SERVER_SCOPE: ScopeCell;
}

/// Continuation-local store for threaded/async server runtimes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServerContextStore;

impl ServerContextStore {
    #[inline]
    pub fn current(&self) -> Option<ScopeCell> {
        SERVER_SCOPE.try_with(Arc::clone).ok()
    }

    pub async fn enter<F: Future>(&self, cell: ScopeCell, fut: F) -> F::Output {
        SERVER_SCOPE.scope(cell, fut).await
    }

    pub fn enter_sync<R>(&self, cell: ScopeCell, f: impl FnOnce() -> R) -> R {
        SERVER_SCOPE.sync_scope(cell, f)
    }
}
