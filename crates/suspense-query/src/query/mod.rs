//! Query descriptors: what the adapter asks the client to watch.

pub mod types;

pub use types::{ErrorPolicy, FetchPolicy, QueryDescriptor, QueryDocument};
