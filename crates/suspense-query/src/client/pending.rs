//! PendingFetch: an in-flight one-shot fetch.
//!
//! This is the value a render hands back instead of data when the query has
//! nothing cached yet. The host framework awaits it and renders again.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use serde::de::DeserializeOwned;
use tokio::sync::oneshot;

use crate::{
    error::{QueryError, Result},
    query::types::QueryDescriptor,
    types::QueryResult,
};

/// Outcome of a fetch as reported by the client.
pub type FetchOutcome = std::result::Result<QueryResult, QueryError>;

/// Boxed future driving a fetch.
pub type FetchFuture = Pin<Box<dyn Future<Output = FetchOutcome> + Send>>;

/// An in-flight fetch, tagged with the descriptor it was issued for.
pub struct PendingFetch {
    descriptor: QueryDescriptor,
    future: FetchFuture,
}

impl PendingFetch {
    pub fn new(
        descriptor: QueryDescriptor,
        future: impl Future<Output = FetchOutcome> + Send + 'static,
    ) -> Self {
        Self {
            descriptor,
            future: Box::pin(future),
        }
    }

    /// A fetch that has already completed.
    pub fn ready(descriptor: QueryDescriptor, outcome: FetchOutcome) -> Self {
        Self::new(descriptor, std::future::ready(outcome))
    }

    /// A fetch completed later through the returned [`FetchResolver`].
    ///
    /// Dropping the resolver without settling it resolves the fetch with
    /// [`QueryError::Cancelled`].
    pub fn channel(descriptor: QueryDescriptor) -> (FetchResolver, Self) {
        let (tx, rx) = oneshot::channel();
        let pending = Self::new(descriptor, async move {
            rx.await.unwrap_or(Err(QueryError::Cancelled))
        });
        (FetchResolver { sender: tx }, pending)
    }

    /// The descriptor the fetch was issued with.
    pub fn descriptor(&self) -> &QueryDescriptor {
        &self.descriptor
    }

    /// Wait for the fetch and decode its `data` into `T`.
    ///
    /// An error embedded in the result is returned as an error.
    pub async fn data_as<T: DeserializeOwned>(self) -> Result<Option<T>> {
        let result = self.await?;
        if let Some(err) = result.error {
            return Err(err.into());
        }
        result
            .data
            .map(serde_json::from_value::<T>)
            .transpose()
            .map_err(Into::into)
    }
}

impl Future for PendingFetch {
    type Output = FetchOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.future.as_mut().poll(cx)
    }
}

impl fmt::Debug for PendingFetch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingFetch")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

/// Settles a [`PendingFetch`] created by [`PendingFetch::channel`].
#[derive(Debug)]
pub struct FetchResolver {
    sender: oneshot::Sender<FetchOutcome>,
}

impl FetchResolver {
    /// Settle with an outcome. Does nothing if the fetch was dropped.
    pub fn settle(self, outcome: FetchOutcome) {
        let _ = self.sender.send(outcome);
    }

    pub fn resolve(self, result: QueryResult) {
        self.settle(Ok(result));
    }

    pub fn reject(self, error: QueryError) {
        self.settle(Err(error));
    }
}
