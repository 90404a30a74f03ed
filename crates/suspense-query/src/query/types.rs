//! Query descriptor types: document, fetch/error policies, and the
//! descriptor passed to the adapter on every render.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============================================================================
// Policies
// ============================================================================

/// How the client balances its cache against the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FetchPolicy {
    #[default]
    CacheFirst,
    CacheOnly,
    NetworkOnly,
    NoCache,
    CacheAndNetwork,
    Standby,
}

/// How GraphQL errors in a response are surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Any GraphQL error fails the request (wire name `"none"`).
    #[default]
    #[serde(rename = "none")]
    Fail,
    /// Errors are dropped; partial data is kept.
    Ignore,
    /// Errors and partial data are both reported.
    All,
}

// ============================================================================
// Query Document
// ============================================================================

/// A GraphQL document, optionally pinned to one named operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryDocument {
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,
}

impl QueryDocument {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            operation_name: None,
        }
    }

    /// Pin the document to the operation called `name`.
    pub fn with_operation_name(mut self, name: impl Into<String>) -> Self {
        self.operation_name = Some(name.into());
        self
    }

    /// The pinned operation name, or the name of the first named operation
    /// in the source. `None` for anonymous / shorthand documents.
    pub fn operation_name(&self) -> Option<&str> {
        self.operation_name
            .as_deref()
            .or_else(|| first_operation_name(&self.source))
    }
}

impl From<&str> for QueryDocument {
    fn from(source: &str) -> Self {
        Self::new(source)
    }
}

impl From<String> for QueryDocument {
    fn from(source: String) -> Self {
        Self::new(source)
    }
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Lexical tokens of a GraphQL source: names, string literals (quotes
/// included) and single punctuators. Whitespace, commas and `#` comments are
/// skipped.
fn tokens(source: &str) -> impl Iterator<Item = &str> {
    let bytes = source.as_bytes();
    let mut i = 0;
    std::iter::from_fn(move || loop {
        let b = *bytes.get(i)?;
        if b == b'#' {
            while i < bytes.len() && bytes[i] != b'\n' {
                i += 1;
            }
        } else if b.is_ascii_whitespace() || b == b',' {
            i += 1;
        } else if b == b'"' {
            let start = i;
            i = string_end(bytes, i);
            return Some(&source[start..i]);
        } else if is_name_byte(b) {
            let start = i;
            while i < bytes.len() && is_name_byte(bytes[i]) {
                i += 1;
            }
            return Some(&source[start..i]);
        } else {
            let start = i;
            let ch = source[i..].chars().next()?;
            i += ch.len_utf8();
            return Some(&source[start..i]);
        }
    })
}

/// Index just past the string literal opening at `start`. Unterminated
/// strings run to the end of the line (block strings to the end of input).
fn string_end(bytes: &[u8], start: usize) -> usize {
    let rest = &bytes[start..];
    if rest.starts_with(b"\"\"\"") {
        let mut i = start + 3;
        while i < bytes.len() {
            if bytes[i..].starts_with(b"\\\"\"\"") {
                i += 4;
            } else if bytes[i..].starts_with(b"\"\"\"") {
                return i + 3;
            } else {
                i += 1;
            }
        }
        return bytes.len();
    }

    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i = (i + 2).min(bytes.len()),
            b'"' => return i + 1,
            b'\n' => return i,
            _ => i += 1,
        }
    }
    bytes.len()
}

fn is_name(token: &str) -> bool {
    token
        .bytes()
        .next()
        .is_some_and(|b| b.is_ascii_alphabetic() || b == b'_')
}

/// Name of the first named operation definition. Only a keyword that opens a
/// top-level definition counts; field names and string contents never do.
fn first_operation_name(source: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut at_definition_start = true;
    let mut expect_name = false;

    for tok in tokens(source) {
        if expect_name && is_name(tok) {
            return Some(tok);
        }
        expect_name = false;

        match tok {
            "{" | "(" | "[" => {
                depth += 1;
                at_definition_start = false;
            }
            "}" | ")" | "]" => {
                depth = depth.saturating_sub(1);
                // A definition always ends with its selection set.
                if tok == "}" && depth == 0 {
                    at_definition_start = true;
                }
            }
            _ if depth == 0 => {
                expect_name =
                    at_definition_start && matches!(tok, "query" | "mutation" | "subscription");
                at_definition_start = false;
            }
            _ => {}
        }
    }
    None
}

// ============================================================================
// Query Descriptor
// ============================================================================

/// Everything the adapter forwards to the client for one watched query.
///
/// Compared structurally: two descriptors built separately with the same
/// contents are equal, which is what keeps option reconciliation quiet when
/// callers rebuild the descriptor on every render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryDescriptor {
    #[serde(rename = "query")]
    pub document: QueryDocument,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub variables: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetch_policy: Option<FetchPolicy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_policy: Option<ErrorPolicy>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub skip: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub notify_on_network_status_change: bool,
    #[serde(default, with = "duration_ms", skip_serializing_if = "Option::is_none")]
    pub suspend_timeout: Option<Duration>,
    #[serde(default, with = "duration_ms", skip_serializing_if = "Option::is_none")]
    pub poll_interval: Option<Duration>,
    /// Any other client option, passed through untouched.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl QueryDescriptor {
    pub fn new(document: impl Into<QueryDocument>) -> Self {
        Self {
            document: document.into(),
            variables: Map::new(),
            fetch_policy: None,
            error_policy: None,
            skip: false,
            notify_on_network_status_change: false,
            suspend_timeout: None,
            poll_interval: None,
            extra: BTreeMap::new(),
        }
    }

    /// Replace all variables. Anything other than a JSON object clears them.
    pub fn variables(mut self, variables: Value) -> Self {
        self.variables = match variables {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                tracing::warn!(variables = %other, "query variables must be an object; ignoring");
                Map::new()
            }
        };
        self
    }

    /// Set a single variable.
    pub fn variable(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    pub fn fetch_policy(mut self, policy: FetchPolicy) -> Self {
        self.fetch_policy = Some(policy);
        self
    }

    pub fn error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.error_policy = Some(policy);
        self
    }

    pub fn skip(mut self, skip: bool) -> Self {
        self.skip = skip;
        self
    }

    pub fn notify_on_network_status_change(mut self, notify: bool) -> Self {
        self.notify_on_network_status_change = notify;
        self
    }

    pub fn suspend_timeout(mut self, timeout: Duration) -> Self {
        self.suspend_timeout = Some(timeout);
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    /// Set a client option this type has no field for.
    pub fn option(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }

    /// Variables as a JSON object value.
    pub fn variables_value(&self) -> Value {
        Value::Object(self.variables.clone())
    }

    /// A copy with the fetch policy removed, for one-shot fetches.
    pub fn without_fetch_policy(&self) -> Self {
        Self {
            fetch_policy: None,
            ..self.clone()
        }
    }

    /// Operation name for logs; `"<anonymous>"` when the document has none.
    pub fn operation_name(&self) -> &str {
        self.document.operation_name().unwrap_or("<anonymous>")
    }
}

/// `Option<Duration>` as integer milliseconds.
mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => s.serialize_some(&u64::try_from(d.as_millis()).unwrap_or(u64::MAX)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(d)?.map(Duration::from_millis))
    }
}
