//! Seen-posting ledger port.

use crate::error::Result;

/// Durable set of posting identifiers that were already handled.
///
/// Identifiers are only ever added. After [`mark_seen`](Self::mark_seen)
/// returns `Ok`, the identifier must be reported as seen by this ledger and
/// by any ledger later opened on the same storage.
pub trait SeenLedger: Send + Sync {
    /// True if `id` was never marked seen.
    ///
    /// Blank identifiers are never new.
    fn is_new(&self, id: &str) -> bool;

    /// Record `id` as seen and persist the set.
    ///
    /// # Errors
    ///
    /// Returns a persistence error if the durable write failed. The in-memory
    /// set is updated regardless.
    fn mark_seen(&self, id: &str) -> Result<()>;

    /// Number of identifiers recorded.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
