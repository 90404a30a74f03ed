//! Reactive layer: store subscription plumbing between an observable query
//! and the host renderer.
//!
//! # Modules
//!
//! - [`store`]: [`SyncExternalStore`], subscribe-before-read with teardown.
//! - [`snapshot`]: [`SnapshotCell`], the last delivered result.

pub mod snapshot;
pub mod store;

pub use snapshot::SnapshotCell;
pub use store::{Rerender, SyncExternalStore, Unsubscribe};
