//! Per-request cache scope
//!
//! One [`RequestScope`] is opened per incoming query execution. It memoizes
//! in-flight and completed fetches of authenticated loaders for exactly that
//! execution and is torn down when the execution ends, releasing every entry.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use crate::api::ApiResponse;
use crate::error::{LoaderError, LoaderResult};
use crate::inflight::{InFlight, Retention};
use crate::key::LoaderKey;

/// Caching boundary whose lifetime equals one query execution
pub struct RequestScope {
    id: Uuid,
    entries: InFlight<ApiResponse>,
    closed: AtomicBool,
}

impl RequestScope {
    /// Open a new scope
    pub fn new() -> Arc<Self> {
        let scope = Arc::new(Self {
            id: Uuid::new_v4(),
            entries: InFlight::new(Retention::KeepSettled),
            closed: AtomicBool::new(false),
        });
        debug!(scope = %scope.id, "Opened request scope");
        scope
    }

    /// Opaque identifier of this scope
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Return the memoized result for `key`, running `factory` if no fetch
    /// for it has been started in this scope
    ///
    /// Concurrent callers with the same key share one invocation of
    /// `factory`. Successful results stay memoized until [`close`](Self::close);
    /// failures are dropped so a later call retries.
    ///
    /// # Errors
    /// - `LoaderError::ScopeClosed` if the scope was already torn down
    /// - whatever error `factory` resolves to
    pub async fn get_or_create<F, Fut>(&self, key: LoaderKey, factory: F) -> LoaderResult<ApiResponse>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = LoaderResult<ApiResponse>> + Send + 'static,
    {
        if self.is_closed() {
            return Err(LoaderError::ScopeClosed { scope: self.id });
        }

        let fetch = self.entries.join(key.clone(), factory);

        // close() may have cleared the map between the check and the insert
        if self.is_closed() {
            self.entries.remove(&key);
            return Err(LoaderError::ScopeClosed { scope: self.id });
        }

        fetch.await
    }

    /// Tear the scope down, releasing every entry
    ///
    /// Fetches still running are not cancelled, but no new waiter can attach
    /// and their results are not retained. Closing twice is a no-op.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        let released = self.entries.clear();
        debug!(scope = %self.id, released, "Closed request scope");
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Number of memoized or in-flight entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Guard closing this scope when dropped
    pub fn guard(self: &Arc<Self>) -> ScopeGuard {
        ScopeGuard {
            scope: Arc::clone(self),
        }
    }
}

impl std::fmt::Debug for RequestScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestScope")
            .field("id", &self.id)
            .field("entries", &self.len())
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Closes its [`RequestScope`] when dropped
///
/// Hold one for the duration of a query execution so the scope is torn
/// down on success, failure and cancellation alike.
#[must_use = "the scope is closed as soon as the guard is dropped"]
pub struct ScopeGuard {
    scope: Arc<RequestScope>,
}

impl ScopeGuard {
    pub fn scope(&self) -> &Arc<RequestScope> {
        &self.scope
    }
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        self.scope.close();
    }
}
