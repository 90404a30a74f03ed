//! SuspendedQuery: one watched query bound to one rendering component.
//!
//! # Lifecycle
//!
//! A host creates one `SuspendedQuery` per mounted component and drives it:
//!   - [`render`](SuspendedQuery::render) on every render pass. Subscribes to
//!     the observable query if needed, reads the snapshot, and either returns
//!     data or a [`PendingFetch`](crate::client::PendingFetch) to await before rendering again.
//!   - [`commit`](SuspendedQuery::commit) after each committed render, with
//!     the same descriptor. Pushes changed options into the observable query;
//!     concurrent or re-entrant commits of the same descriptor push it once.
//!   - [`teardown`](SuspendedQuery::teardown) on unmount (dropping the value
//!     does the same).
//!
//! # Ownership
//!
//! The observable query is created once in [`new`](SuspendedQuery::new) and
//! never replaced; only its options change. The snapshot cell is written
//! solely by the subscription callback, never by `render`.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::{
    client::{
        context::ClientContext,
        traits::{ObservableQuery, ObserverFn, QueryClient},
    },
    error::{QueryError, Result},
    query::types::QueryDescriptor,
    reactive::{Rerender, SnapshotCell, SyncExternalStore, Unsubscribe},
    types::QueryResult,
};

use super::{output::QueryOutput, state::Suspense};

/// Options last pushed into the observable query (initially the creation
/// options), plus the descriptor a `commit` is pushing right now.
#[derive(Debug)]
struct AppliedOptions {
    applied: QueryDescriptor,
    in_flight: Option<QueryDescriptor>,
}

/// Suspense adapter for a single watched query.
pub struct SuspendedQuery {
    client: Arc<dyn QueryClient>,
    observable: Arc<dyn ObservableQuery>,
    snapshot: Arc<SnapshotCell>,
    options: Mutex<AppliedOptions>,
    store: SyncExternalStore,
}

impl SuspendedQuery {
    /// Start watching `descriptor` on `client`.
    ///
    /// `rerender` is called (outside any lock) every time the observable
    /// query delivers a new result while subscribed.
    pub fn new(
        client: Arc<dyn QueryClient>,
        descriptor: QueryDescriptor,
        rerender: Rerender,
    ) -> Self {
        let observable = client.watch_query(&descriptor);
        let snapshot = Arc::new(SnapshotCell::new(observable.current_result()));
        tracing::debug!(
            operation = %descriptor.operation_name(),
            "watching query"
        );

        Self {
            client,
            observable,
            snapshot,
            options: Mutex::new(AppliedOptions {
                applied: descriptor,
                in_flight: None,
            }),
            store: SyncExternalStore::new(rerender),
        }
    }

    /// Like [`new`](Self::new), resolving the client from `context` unless
    /// `client` is given.
    pub fn from_context(
        context: &ClientContext,
        client: Option<Arc<dyn QueryClient>>,
        descriptor: QueryDescriptor,
        rerender: Rerender,
    ) -> Result<Self> {
        let client = context.resolve(client)?;
        Ok(Self::new(client, descriptor, rerender))
    }

    // -----------------------------------------------------------------------
    // Render / commit / teardown
    // -----------------------------------------------------------------------

    /// Evaluate the query for this render.
    ///
    /// Returns [`Suspense::Pending`] when the cache has nothing for
    /// `descriptor` and the query is not skipped. The pending fetch is issued
    /// without the descriptor's fetch policy.
    pub fn render(&self, descriptor: &QueryDescriptor) -> Suspense<QueryOutput> {
        let snapshot = self
            .store
            .sync(|notify| self.subscribe_snapshot(notify), || self.snapshot.get());

        let cached = self.client.read_query(descriptor);

        if cached.is_none() && !descriptor.skip {
            tracing::debug!(
                operation = %descriptor.operation_name(),
                fetch_policy = ?descriptor.fetch_policy,
                "nothing cached; suspending on one-shot fetch"
            );
            let pending = self.client.query(&descriptor.without_fetch_policy());
            return Suspense::Pending(pending);
        }

        let output = QueryOutput::new(snapshot, Arc::clone(&self.observable));
        match cached {
            Some(_) => Suspense::Ready(output),
            None => Suspense::Skipped(output),
        }
    }

    /// Reconcile the observable query's options with `descriptor`.
    ///
    /// Returns `Ok(true)` if options were pushed, `Ok(false)` if `descriptor`
    /// is structurally equal to the last applied one or to the one another
    /// `commit` is pushing. On error the last applied descriptor is kept, so
    /// the next commit retries.
    ///
    /// The lock is released while `set_options` runs, so the observable may
    /// call back into this adapter.
    pub fn commit(&self, descriptor: &QueryDescriptor) -> Result<bool, QueryError> {
        {
            let mut options = self.options.lock();
            if options.applied == *descriptor || options.in_flight.as_ref() == Some(descriptor) {
                tracing::trace!(operation = %descriptor.operation_name(), "options unchanged");
                return Ok(false);
            }
            options.in_flight = Some(descriptor.clone());
        }

        let outcome = self.observable.set_options(descriptor);

        let mut options = self.options.lock();
        if options.in_flight.as_ref() == Some(descriptor) {
            options.in_flight = None;
        }
        match outcome {
            Ok(()) => {
                options.applied = descriptor.clone();
                drop(options);
                tracing::debug!(operation = %descriptor.operation_name(), "query options updated");
                Ok(true)
            }
            Err(e) => {
                drop(options);
                tracing::warn!(
                    operation = %descriptor.operation_name(),
                    error = %e,
                    "failed to update query options"
                );
                Err(e)
            }
        }
    }

    /// Unsubscribe from the observable query. Returns `false` if not
    /// subscribed. A later [`render`](Self::render) subscribes again.
    pub fn teardown(&self) -> bool {
        self.store.teardown()
    }

    /// Replace the current subscription with a fresh one.
    pub fn resubscribe(&self) {
        self.store.resubscribe(|notify| self.subscribe_snapshot(notify));
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// The snapshot the next render would read.
    pub fn snapshot(&self) -> QueryResult {
        self.snapshot.get()
    }

    pub fn is_subscribed(&self) -> bool {
        self.store.is_subscribed()
    }

    pub fn applied_descriptor(&self) -> QueryDescriptor {
        self.options.lock().applied.clone()
    }

    pub fn observable(&self) -> &Arc<dyn ObservableQuery> {
        &self.observable
    }

    pub fn client(&self) -> &Arc<dyn QueryClient> {
        &self.client
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    /// Subscribe the snapshot cell to the observable query.
    ///
    /// Observables may still deliver to a listener removed mid-emission, so
    /// the observer checks a liveness flag that unsubscribing clears first.
    fn subscribe_snapshot(&self, notify: Rerender) -> Unsubscribe {
        let live = Arc::new(AtomicBool::new(true));
        let cell = Arc::clone(&self.snapshot);

        let observer: Arc<ObserverFn> = {
            let live = Arc::clone(&live);
            Arc::new(move |result: &QueryResult| {
                if !live.load(Ordering::Acquire) {
                    return;
                }
                cell.replace(result.clone());
                notify();
            })
        };
        let unsubscribe = self.observable.subscribe(observer);

        Box::new(move || {
            live.store(false, Ordering::Release);
            unsubscribe();
        })
    }
}

impl fmt::Debug for SuspendedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuspendedQuery")
            .field("options", &*self.options.lock())
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}
