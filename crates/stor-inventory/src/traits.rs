use stor_types::Key;

/// Set of keys known to be durably stored.
///
/// Implementations must be safe to call concurrently from writers, readers
/// and background persistence tasks. There is no removal
/// operation.
pub trait Inventory: Send + Sync {
    /// Mark `key` as known. Idempotent.
    fn see(&self, key: &Key);

    /// Whether `key` has been seen.
    fn has(&self, key: &Key) -> bool;
}
