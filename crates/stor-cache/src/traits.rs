use bytes::Bytes;
use stor_types::Key;

/// A read cache in front of the store.
///
/// Only [`get`](Cache::get) is mandatory. The hook accessors return `None`
/// unless the implementation wants to observe writes or disk reads, so a
/// cache may support neither, either, or both hooks.
pub trait Cache: Send + Sync {
    /// Look up a cached value. `None` is a miss.
    fn get(&self, key: &Key) -> Option<Bytes>;

    /// The insertion capability, if this cache has one.
    fn insertion_hook(&self) -> Option<&dyn InsertionHook> {
        None
    }

    /// The retrieval capability, if this cache has one.
    fn retrieval_hook(&self) -> Option<&dyn RetrievalHook> {
        None
    }
}

/// Observes values as they are accepted for writing.
pub trait InsertionHook: Send + Sync {
    fn see_put(&self, key: &Key, value: &Bytes);
}

/// Observes values read back from durable storage.
///
/// Only fired for values that were not served by the cache itself.
pub trait RetrievalHook: Send + Sync {
    fn see_get(&self, key: &Key, value: &Bytes);
}
