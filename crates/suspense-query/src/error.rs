use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

// ---------------------------------------------------------------------------
// GraphqlError
// ---------------------------------------------------------------------------

/// Source position of a GraphQL error inside the query document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphqlErrorLocation {
    pub line: u32,
    pub column: u32,
}

/// A single entry of a GraphQL response's `errors` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphqlError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<GraphqlErrorLocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Value>,
}

impl GraphqlError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: Vec::new(),
            locations: Vec::new(),
            extensions: None,
        }
    }
}

impl fmt::Display for GraphqlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

fn join_messages(errors: &[GraphqlError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

// ---------------------------------------------------------------------------
// QueryError
// ---------------------------------------------------------------------------

/// Error reported by the query client.
///
/// The adapter never creates these on the query path. They reach the caller
/// either embedded in a [`QueryResult`](crate::types::QueryResult) or as the
/// `Err` of a [`PendingFetch`](crate::client::PendingFetch).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    #[error("Network error: {message}")]
    Network {
        message: String,
        status: Option<u16>,
    },

    #[error("GraphQL error: {}", join_messages(.0))]
    Graphql(Vec<GraphqlError>),

    #[error("Invalid query options: {0}")]
    InvalidOptions(String),

    #[error("Query was cancelled before it completed")]
    Cancelled,

    #[error("{0}")]
    Client(String),
}

impl QueryError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            status: None,
        }
    }

    pub fn graphql(errors: impl IntoIterator<Item = GraphqlError>) -> Self {
        Self::Graphql(errors.into_iter().collect())
    }
}

// ---------------------------------------------------------------------------
// AdapterError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error(
        "No query client available. Pass a client explicitly or install a default \
         in the ClientContext."
    )]
    MissingClient,

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("Failed to decode query data: {0}")]
    Data(#[from] serde_json::Error),
}

pub type Result<T, E = AdapterError> = std::result::Result<T, E>;
