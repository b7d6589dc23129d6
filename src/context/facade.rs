//! Runtime-agnostic context API.
//!
//! Every caller goes through [`ContextFacade`]; which store backs it is
//! decided once, at construction.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use tracing::{Instrument, Span};

use crate::context::log_context::LogContext;
use crate::context::store::{new_cell, ContextStore, ScopeCell};
use crate::id::IdIssuer;
use crate::observability::logging::{record_context, scope_span};
use crate::observability::trace::{NoopTracingProvider, TracingProvider};
use crate::runtime::{get_runtime, Runtime};

/// Scoped log context API.
#[derive(Clone)]
pub struct ContextFacade {
    store: ContextStore,
    provider: Arc<dyn TracingProvider>,
    issuer: IdIssuer,
}

impl ContextFacade {
    /// Facade backed by the store for `runtime`, with no tracing backend.
    pub fn new(runtime: Runtime) -> Self {
        Self {
            store: ContextStore::for_runtime(runtime),
            provider: Arc::new(NoopTracingProvider),
            issuer: IdIssuer::default(),
        }
    }

    /// Facade for the detected runtime of this process.
    pub fn detect() -> Self {
        Self::new(get_runtime())
    }

    pub fn with_provider(mut self, provider: Arc<dyn TracingProvider>) -> Self {
        self.provider = provider;
        self
    }

    pub fn with_issuer(mut self, issuer: IdIssuer) -> Self {
        self.issuer = issuer;
        self
    }

    pub fn runtime(&self) -> Runtime {
        self.store.runtime()
    }

    pub fn store(&self) -> ContextStore {
        self.store
    }

    /// Run `fut` with `partial` merged onto the current context.
    ///
    /// The merged context is current for every poll of `fut` and for every
    /// future bound to it with [`bind`](Self::bind). The parent context is
    /// current again once `fut` completes, panics or is dropped.
    pub async fn scope<F: Future>(&self, partial: LogContext, fut: F) -> F::Output {
        let cell = self.child_cell(&partial);
        let span = scope_span(&cell.load());
        self.store.enter(cell, fut.instrument(span)).await
    }

    /// Synchronous [`scope`](Self::scope).
    pub fn scope_sync<R>(&self, partial: LogContext, f: impl FnOnce() -> R) -> R {
        let cell = self.child_cell(&partial);
        let span = scope_span(&cell.load());
        let _entered = span.enter();
        self.store.enter_sync(cell, f)
    }

    /// Bind `fut` to the scope active right now.
    ///
    /// Use for work spawned inside a scope (`tokio::spawn(facade.bind(..))`):
    /// the bound future starts from a copy of the scope's context. Its writes
    /// stay in that copy and never reach the scope or its other tasks.
    pub fn bind<F>(&self, fut: F) -> impl Future<Output = F::Output> + 'static
    where
        F: Future + 'static,
    {
        let store = self.store;
        let cell = store
            .current()
            .map(|cell| new_cell(LogContext::clone(&cell.load())));
        let fut = fut.instrument(Span::current());
        async move {
            match cell {
                Some(cell) => store.enter(cell, fut).await,
                None => fut.await,
            }
        }
    }

    /// Context of the active scope; `None` when there is no context.
    ///
    /// Trace and span ids missing from the context are filled in from the
    /// tracing provider.
    pub fn get_log_context(&self) -> Option<LogContext> {
        let cell = self.store.current()?;
        let mut ctx = LogContext::clone(&cell.load());
        if ctx.trace_id.is_none() || ctx.span_id.is_none() {
            if let Some(ids) = self.provider.current_ids() {
                if ctx.trace_id.is_none() {
                    ctx.trace_id = ids.trace_id;
                }
                if ctx.span_id.is_none() {
                    ctx.span_id = ids.span_id;
                }
            }
        }
        Some(ctx)
    }

    /// Merge `partial` into the active scope.
    ///
    /// Outside any scope the write goes to the store's root context when it
    /// has one (browser) and is dropped otherwise (server, edge).
    pub fn set_log_context(&self, partial: LogContext) {
        match self.writable_cell() {
            Some(cell) => {
                cell.rcu(|ctx| Arc::new(ctx.merge(&partial)));
                record_context(&Span::current(), &partial);
            }
            None => {
                tracing::debug!(
                    runtime = %self.runtime(),
                    "No active log context scope, dropping context write"
                );
            }
        }
    }

    /// Remove every key from the active scope. The scope stays active.
    ///
    /// Outside any scope the root context is forgotten, so reads report no
    /// context again.
    pub fn clear_log_context(&self) {
        match self.store.active() {
            Some(cell) => cell.store(Arc::new(LogContext::default())),
            None => self.store.reset_root(),
        }
    }

    /// The scope's request id, issuing and storing one if it has none.
    ///
    /// Idempotent within one scope. Outside any scope on the server and edge
    /// stores a fresh id is returned on every call.
    pub fn get_or_create_request_id(&self) -> String {
        let Some(cell) = self.writable_cell() else {
            return self.issuer.issue();
        };

        let mut issued: Option<String> = None;
        let previous = cell.rcu(|ctx| {
            if ctx.request_id.is_some() {
                Arc::clone(ctx)
            } else {
                let id = issued.get_or_insert_with(|| self.issuer.issue()).clone();
                Arc::new(LogContext::clone(ctx).with_request_id(id))
            }
        });

        match previous.request_id.clone() {
            Some(existing) => existing,
            None => {
                let id = issued.unwrap_or_else(|| self.issuer.issue());
                Span::current().record("request_id", id.as_str());
                id
            }
        }
    }

    fn child_cell(&self, partial: &LogContext) -> ScopeCell {
        let parent = self
            .store
            .current()
            .map(|cell| cell.load_full())
            .unwrap_or_default();
        new_cell(parent.merge(partial))
    }

    fn writable_cell(&self) -> Option<ScopeCell> {
        self.store.active().or_else(|| self.store.write_root())
    }
}

impl Default for ContextFacade {
    fn default() -> Self {
        Self::detect()
    }
}

impl fmt::Debug for ContextFacade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextFacade")
            .field("runtime", &self.runtime())
            .field("provider", &self.provider.name())
            .field("issuer", &self.issuer)
            .finish()
    }
}
