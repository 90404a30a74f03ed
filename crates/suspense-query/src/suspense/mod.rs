//! Suspense layer: the adapter hosts call from their render loop.
//!
//! - [`adapter`]: [`SuspendedQuery`], render / commit / teardown.
//! - [`state`]: [`Suspense`], the tri-state render outcome.
//! - [`output`]: [`QueryOutput`], snapshot fields plus bound controls.

pub mod adapter;
pub mod output;
pub mod state;

pub use adapter::SuspendedQuery;
pub use output::QueryOutput;
pub use state::Suspense;
