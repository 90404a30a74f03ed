//! Shared result and option types exchanged with the query client.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{error::QueryError, query::types::QueryDocument};

// ============================================================================
// Network Status
// ============================================================================

/// Where a watched query is in its fetch lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NetworkStatus {
    /// First fetch in flight, nothing delivered yet.
    #[default]
    Loading,
    /// Variables changed and the query is fetching again.
    SetVariables,
    FetchMore,
    Refetch,
    Poll,
    /// No request in flight.
    Ready,
    /// The last request failed.
    Error,
}

impl NetworkStatus {
    /// `true` while a request for this query is outstanding.
    pub fn is_in_flight(self) -> bool {
        !matches!(self, NetworkStatus::Ready | NetworkStatus::Error)
    }
}

// ============================================================================
// Query Result
// ============================================================================

/// A result snapshot delivered by an observable query.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub data: Option<Value>,
    pub loading: bool,
    pub network_status: NetworkStatus,
    pub error: Option<QueryError>,
    /// Set when `data` only covers part of the selection set.
    pub partial: bool,
}

impl QueryResult {
    /// Nothing delivered yet, first fetch in flight.
    pub fn loading() -> Self {
        Self {
            data: None,
            loading: true,
            network_status: NetworkStatus::Loading,
            error: None,
            partial: false,
        }
    }

    /// Complete data, no request in flight.
    pub fn ready(data: Value) -> Self {
        Self {
            data: Some(data),
            loading: false,
            network_status: NetworkStatus::Ready,
            error: None,
            partial: false,
        }
    }

    /// Nothing to report; used for skipped or standby queries.
    pub fn idle() -> Self {
        Self {
            data: None,
            loading: false,
            network_status: NetworkStatus::Ready,
            error: None,
            partial: false,
        }
    }

    pub fn failed(error: QueryError) -> Self {
        Self {
            data: None,
            loading: false,
            network_status: NetworkStatus::Error,
            error: Some(error),
            partial: false,
        }
    }
}

// ============================================================================
// Control Operation Options
// ============================================================================

/// Maps the previous data and the query variables to replacement data.
pub type UpdateQueryFn = dyn Fn(Option<&Value>, &Map<String, Value>) -> Value + Send + Sync;

/// Merges an incoming page (or subscription payload) into the previous data.
///
/// Arguments: previous data, incoming payload, variables used for the request.
pub type MergeFn = dyn Fn(Option<&Value>, &Value, &Map<String, Value>) -> Value + Send + Sync;

/// Closure type for subscription error callbacks.
pub type SubscriptionErrorFn = dyn Fn(&QueryError) + Send + Sync;

/// Options for [`ObservableQuery::fetch_more`](crate::client::ObservableQuery::fetch_more).
#[derive(Clone, Default)]
pub struct FetchMoreOptions {
    /// Alternate document to fetch with. `None` reuses the watched document.
    pub document: Option<QueryDocument>,
    /// Variables merged over the watched query's variables.
    pub variables: Map<String, Value>,
    /// How to fold the fetched page into the cached result.
    pub update_query: Option<Arc<MergeFn>>,
}

impl fmt::Debug for FetchMoreOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchMoreOptions")
            .field("document", &self.document)
            .field("variables", &self.variables)
            .field("update_query", &self.update_query.is_some())
            .finish()
    }
}

/// Options for [`subscribe_to_more`](crate::client::ObservableQuery::subscribe_to_more).
#[derive(Clone)]
pub struct SubscribeToMoreOptions {
    /// The subscription document.
    pub document: QueryDocument,
    pub variables: Map<String, Value>,
    /// How to fold each subscription payload into the cached result.
    pub update_query: Option<Arc<MergeFn>>,
    pub on_error: Option<Arc<SubscriptionErrorFn>>,
}

impl SubscribeToMoreOptions {
    pub fn new(document: QueryDocument) -> Self {
        Self {
            document,
            variables: Map::new(),
            update_query: None,
            on_error: None,
        }
    }
}

impl fmt::Debug for SubscribeToMoreOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscribeToMoreOptions")
            .field("document", &self.document)
            .field("variables", &self.variables)
            .field("update_query", &self.update_query.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}
