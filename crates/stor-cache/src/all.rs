use std::collections::HashMap;
use std::sync::RwLock;

use bytes::Bytes;
use stor_types::Key;

use crate::stats::{CacheStats, Counters};
use crate::traits::{Cache, InsertionHook};

/// Full-retention cache: every written value is kept for the lifetime of
/// the cache.
///
/// Reacts to insertions only. Memory use grows with the key population, so
/// this policy suits stores whose total size fits comfortably in memory.
/// Empty values are never cached; reads for them fall through to the store.
#[derive(Debug, Default)]
pub struct CacheAll {
    entries: RwLock<HashMap<Key, Bytes>>,
    counters: Counters,
}

impl CacheAll {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached values.
    pub fn len(&self) -> usize {
        self.entries.read().expect("cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().expect("cache lock poisoned").is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot()
    }
}

impl Cache for CacheAll {
    fn get(&self, key: &Key) -> Option<Bytes> {
        let value = self
            .entries
            .read()
            .expect("cache lock poisoned")
            .get(key)
            .cloned();
        self.counters.lookup(value.is_some());
        value
    }

    fn insertion_hook(&self) -> Option<&dyn InsertionHook> {
        Some(self)
    }
}

impl InsertionHook for CacheAll {
    fn see_put(&self, key: &Key, value: &Bytes) {
        if value.is_empty() {
            return;
        }
        self.entries
            .write()
            .expect("cache lock poisoned")
            .insert(key.clone(), value.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> Key {
        Key::new(s).unwrap()
    }

    #[test]
    fn insertion_only() {
        let cache = CacheAll::new();
        assert!(cache.insertion_hook().is_some());
        assert!(cache.retrieval_hook().is_none());
    }

    #[test]
    fn put_then_get() {
        let cache = CacheAll::new();
        assert_eq!(cache.get(&key("foo")), None);
        cache.see_put(&key("foo"), &Bytes::from_static(&[1, 2, 3, 251]));
        assert_eq!(cache.get(&key("foo")).unwrap(), Bytes::from_static(&[1, 2, 3, 251]));
        assert_eq!(cache.stats().hits, 1);
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn overwrite_replaces() {
        let cache = CacheAll::new();
        cache.see_put(&key("foo"), &Bytes::from_static(b"one"));
        cache.see_put(&key("foo"), &Bytes::from_static(b"two"));
        assert_eq!(cache.get(&key("foo")).unwrap(), Bytes::from_static(b"two"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn empty_value_is_ignored() {
        let cache = CacheAll::new();
        cache.see_put(&key("foo"), &Bytes::new());
        assert!(cache.is_empty());
        assert_eq!(cache.get(&key("foo")), None);
    }

    #[test]
    fn never_evicts() {
        let cache = CacheAll::new();
        for i in 0..1000 {
            cache.see_put(&key(&format!("k{i}")), &Bytes::from(vec![i as u8; 4]));
        }
        assert_eq!(cache.len(), 1000);
        for i in 0..1000 {
            assert!(cache.get(&key(&format!("k{i}"))).is_some());
        }
        assert_eq!(cache.stats().evictions, 0);
    }
}
