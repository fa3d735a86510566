//! In-flight request coalescing
//!
//! Maps a [`LoaderKey`] to the pending operation fetching it. The first
//! caller for a key inserts a shared future; concurrent callers with the same
//! key clone it and observe the same result. Insertion goes through the
//! `DashMap` entry API, so check-then-insert is atomic per key even when
//! resolvers run on several worker threads.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures_util::future::{BoxFuture, FutureExt, Shared};
use tracing::debug;

use crate::error::LoaderResult;
use crate::key::LoaderKey;

/// Pending operation shared by every waiter of one key
pub(crate) type SharedFetch<V> = Shared<BoxFuture<'static, LoaderResult<V>>>;

/// What happens to an entry once its operation succeeds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Retention {
    /// Keep the settled value; later callers reuse it (request scopes)
    KeepSettled,
    /// Drop the entry as soon as the operation settles (shared cache path)
    DropSettled,
}

struct Flight<V: Clone> {
    id: u64,
    fetch: SharedFetch<V>,
}

pub(crate) struct InFlight<V: Clone> {
    flights: Arc<DashMap<LoaderKey, Flight<V>>>,
    next_id: AtomicU64,
    retention: Retention,
}

impl<V> InFlight<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub(crate) fn new(retention: Retention) -> Self {
        Self {
            flights: Arc::new(DashMap::new()),
            next_id: AtomicU64::new(0),
            retention,
        }
    }

    /// Join the operation running for `key`, starting it with `start` if
    /// there is none
    ///
    /// Failed operations always remove their entry so the next caller
    /// retries. Removal is guarded by the flight id: a newer flight for the
    /// same key is never evicted by an older one settling.
    pub(crate) fn join<F, Fut>(&self, key: LoaderKey, start: F) -> SharedFetch<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = LoaderResult<V>> + Send + 'static,
    {
        match self.flights.entry(key) {
            Entry::Occupied(entry) => {
                debug!(key = %entry.key(), "Joining in-flight loader request");
                entry.get().fetch.clone()
            }
            Entry::Vacant(entry) => {
                let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                let key = entry.key().clone();
                let flights: Weak<DashMap<LoaderKey, Flight<V>>> = Arc::downgrade(&self.flights);
                let retention = self.retention;
                let operation = start();

                let fetch = async move {
                    let result = operation.await;
                    let keep = result.is_ok() && retention == Retention::KeepSettled;
                    if !keep {
                        if let Some(flights) = flights.upgrade() {
                            flights.remove_if(&key, |_, flight| flight.id == id);
                        }
                    }
                    result
                }
                .boxed()
                .shared();

                entry.insert(Flight {
                    id,
                    fetch: fetch.clone(),
                });
                fetch
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.flights.len()
    }

    /// Drop every entry; operations already awaited keep running for their
    /// current waiters
    pub(crate) fn clear(&self) -> usize {
        let count = self.flights.len();
        self.flights.clear();
        count
    }

    pub(crate) fn remove(&self, key: &LoaderKey) {
        self.flights.remove(key);
    }
}
