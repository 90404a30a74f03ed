//! Suspense<T>: the outcome of rendering a suspending query.

use crate::client::pending::PendingFetch;

/// Outcome of one render of a suspending query.
#[derive(Debug)]
pub enum Suspense<T> {
    /// Data is available.
    Ready(T),
    /// Nothing cached yet. Await the fetch, then render again.
    Pending(PendingFetch),
    /// The query is skipped and nothing is cached.
    Skipped(T),
}

impl<T> Suspense<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, Suspense::Ready(_))
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Suspense::Pending(_))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Suspense::Skipped(_))
    }

    /// The rendered value for `Ready` and `Skipped`.
    pub fn value(self) -> Option<T> {
        match self {
            Suspense::Ready(v) | Suspense::Skipped(v) => Some(v),
            Suspense::Pending(_) => None,
        }
    }

    pub fn pending(self) -> Option<PendingFetch> {
        match self {
            Suspense::Pending(p) => Some(p),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Suspense<U> {
        match self {
            Suspense::Ready(v) => Suspense::Ready(f(v)),
            Suspense::Skipped(v) => Suspense::Skipped(f(v)),
            Suspense::Pending(p) => Suspense::Pending(p),
        }
    }

    /// `Err(pending)` when suspended, so hosts can bail out with `?`.
    pub fn into_result(self) -> Result<T, PendingFetch> {
        match self {
            Suspense::Ready(v) | Suspense::Skipped(v) => Ok(v),
            Suspense::Pending(p) => Err(p),
        }
    }
}
