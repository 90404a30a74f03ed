//! QueryOutput: what a non-suspended render returns.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::{
    client::{pending::PendingFetch, traits::ObservableQuery},
    error::{QueryError, Result},
    reactive::Unsubscribe,
    types::{FetchMoreOptions, NetworkStatus, QueryResult, SubscribeToMoreOptions},
};

/// The latest snapshot fields plus the control operations of the watched
/// query they came from.
#[derive(Clone)]
pub struct QueryOutput {
    pub data: Option<Value>,
    pub loading: bool,
    pub network_status: NetworkStatus,
    pub error: Option<QueryError>,
    pub partial: bool,
    /// Always `true`: the adapter fetches on first render unless skipped.
    pub called: bool,
    observable: Arc<dyn ObservableQuery>,
}

impl QueryOutput {
    pub(crate) fn new(snapshot: QueryResult, observable: Arc<dyn ObservableQuery>) -> Self {
        Self {
            data: snapshot.data,
            loading: snapshot.loading,
            network_status: snapshot.network_status,
            error: snapshot.error,
            partial: snapshot.partial,
            called: true,
            observable,
        }
    }

    /// Decode `data` into `T`.
    pub fn data_as<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        self.data
            .clone()
            .map(serde_json::from_value::<T>)
            .transpose()
            .map_err(Into::into)
    }

    // -----------------------------------------------------------------------
    // Bound control operations
    // -----------------------------------------------------------------------

    pub fn refetch(&self, variables: Option<Map<String, Value>>) -> PendingFetch {
        self.observable.refetch(variables)
    }

    pub fn fetch_more(&self, options: FetchMoreOptions) -> PendingFetch {
        self.observable.fetch_more(options)
    }

    pub fn update_query(
        &self,
        map: impl Fn(Option<&Value>, &Map<String, Value>) -> Value + Send + Sync + 'static,
    ) {
        self.observable.update_query(&map);
    }

    pub fn start_polling(&self, interval: Duration) {
        self.observable.start_polling(interval);
    }

    pub fn stop_polling(&self) {
        self.observable.stop_polling();
    }

    pub fn subscribe_to_more(&self, options: SubscribeToMoreOptions) -> Unsubscribe {
        self.observable.subscribe_to_more(options)
    }
}

impl fmt::Debug for QueryOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryOutput")
            .field("data", &self.data)
            .field("loading", &self.loading)
            .field("network_status", &self.network_status)
            .field("error", &self.error)
            .field("partial", &self.partial)
            .field("called", &self.called)
            .finish_non_exhaustive()
    }
}
