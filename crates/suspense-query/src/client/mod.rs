//! Client layer: the external GraphQL client as seen by the adapter.
//!
//! # Modules
//!
//! - [`traits`]: [`QueryClient`] and [`ObservableQuery`], the collaborator
//!   contract.
//! - [`pending`]: [`PendingFetch`], the awaitable a suspended render returns.
//! - [`context`]: [`ClientContext`], default-client resolution.

pub mod context;
pub mod pending;
pub mod traits;

pub use context::ClientContext;
pub use pending::{FetchFuture, FetchOutcome, FetchResolver, PendingFetch};
pub use traits::{ObservableQuery, ObserverFn, QueryClient};
