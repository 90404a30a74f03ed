//! Suspense-style data loading over an observable GraphQL query client.
//!
//! [`SuspendedQuery`] binds one watched query to one rendering component: it
//! subscribes the component to the query's results, keeps the query's options
//! in step with the latest descriptor, and reports [`Suspense::Pending`]
//! instead of a loading state until the client has data cached.
//!
//! The crate owns no cache and no transport. Both live behind the
//! [`QueryClient`] and [`ObservableQuery`] traits.

pub mod error;
pub mod types;

pub mod client;
pub mod query;
pub mod reactive;
pub mod suspense;

pub use client::{ClientContext, ObservableQuery, PendingFetch, QueryClient};
pub use error::{AdapterError, GraphqlError, QueryError, Result};
pub use query::{ErrorPolicy, FetchPolicy, QueryDescriptor, QueryDocument};
pub use reactive::{Rerender, Unsubscribe};
pub use suspense::{QueryOutput, Suspense, SuspendedQuery};
pub use types::{NetworkStatus, QueryResult};
