//! ClientContext: the default client adapters fall back to.

use std::fmt;
use std::sync::Arc;

use crate::error::{AdapterError, Result};

use super::traits::QueryClient;

/// Holds the client installed for a part of the UI tree.
///
/// An explicit client always wins over the installed one, which is how
/// multi-client setups route individual queries.
#[derive(Clone, Default)]
pub struct ClientContext {
    client: Option<Arc<dyn QueryClient>>,
}

impl ClientContext {
    /// An empty context with no default client.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: Arc<dyn QueryClient>) -> Self {
        Self {
            client: Some(client),
        }
    }

    /// Install (or replace) the default client.
    pub fn set_client(&mut self, client: Arc<dyn QueryClient>) {
        self.client = Some(client);
    }

    pub fn client(&self) -> Option<&Arc<dyn QueryClient>> {
        self.client.as_ref()
    }

    /// Pick `explicit` if given, else the installed client.
    pub fn resolve(&self, explicit: Option<Arc<dyn QueryClient>>) -> Result<Arc<dyn QueryClient>> {
        explicit
            .or_else(|| self.client.clone())
            .ok_or(AdapterError::MissingClient)
    }
}

impl fmt::Debug for ClientContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientContext")
            .field("has_client", &self.client.is_some())
            .finish()
    }
}
