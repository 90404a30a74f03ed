//! The collaborator contract: what the adapter needs from a query client and
//! from the observable queries it hands out.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value};

use crate::{
    error::QueryError,
    query::types::QueryDescriptor,
    reactive::Unsubscribe,
    types::{FetchMoreOptions, QueryResult, SubscribeToMoreOptions, UpdateQueryFn},
};

use super::pending::PendingFetch;

/// Callback registered through [`ObservableQuery::subscribe`].
pub type ObserverFn = dyn Fn(&QueryResult) + Send + Sync;

// ============================================================================
// QueryClient
// ============================================================================

/// A GraphQL client that owns the cache and the network.
///
/// Implementations are shared between adapters; the adapter only ever calls
/// these three entry points and never touches the cache otherwise.
pub trait QueryClient: Send + Sync {
    /// Start watching a query. The returned handle is owned by the caller.
    fn watch_query(&self, descriptor: &QueryDescriptor) -> Arc<dyn ObservableQuery>;

    /// Read the cached data for `descriptor` without touching the network.
    /// `None` when nothing usable is cached.
    fn read_query(&self, descriptor: &QueryDescriptor) -> Option<Value>;

    /// Fetch `descriptor` once, honoring its fetch policy.
    fn query(&self, descriptor: &QueryDescriptor) -> PendingFetch;
}

// ============================================================================
// ObservableQuery
// ============================================================================

/// A live query whose result evolves as the cache and network change.
pub trait ObservableQuery: Send + Sync {
    /// The latest result, synchronously.
    fn current_result(&self) -> QueryResult;

    /// Register `observer` for every new result. The returned closure removes
    /// it; calling it more than once is not possible by construction.
    fn subscribe(&self, observer: Arc<ObserverFn>) -> Unsubscribe;

    /// Replace the watched options. Variable or policy changes may trigger a
    /// fetch; failures are returned as-is.
    fn set_options(&self, descriptor: &QueryDescriptor) -> Result<(), QueryError>;

    /// Fetch again from the network, optionally with new variables.
    fn refetch(&self, variables: Option<Map<String, Value>>) -> PendingFetch;

    /// Fetch a further page and fold it into the cached result.
    fn fetch_more(&self, options: FetchMoreOptions) -> PendingFetch;

    /// Rewrite the cached result locally.
    fn update_query(&self, map: &UpdateQueryFn);

    fn start_polling(&self, interval: Duration);

    fn stop_polling(&self);

    /// Fold a GraphQL subscription's payloads into this query's result.
    fn subscribe_to_more(&self, options: SubscribeToMoreOptions) -> Unsubscribe;
}
