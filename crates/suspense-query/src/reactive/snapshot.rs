//! SnapshotCell: the latest result pushed by an observable query.

use parking_lot::RwLock;

use crate::types::QueryResult;

/// Single-slot cache of the most recent [`QueryResult`].
///
/// Reads are free for anyone; writes are crate-private and only happen from
/// the adapter's subscription callback.
#[derive(Debug)]
pub struct SnapshotCell {
    current: RwLock<QueryResult>,
}

impl SnapshotCell {
    pub fn new(initial: QueryResult) -> Self {
        Self {
            current: RwLock::new(initial),
        }
    }

    /// A copy of the current snapshot.
    pub fn get(&self) -> QueryResult {
        self.current.read().clone()
    }

    pub(crate) fn replace(&self, result: QueryResult) {
        *self.current.write() = result;
    }
}
