use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use bytes::Bytes;
use stor_types::Key;

/// Values accepted for writing whose background write has not finished.
///
/// Each insertion is tagged with a sequence number. Removal names the
/// sequence it belongs to, so a slow write finishing late cannot hide a
/// newer in-flight value for the same key.
#[derive(Debug, Default)]
pub(crate) struct TransferCache {
    entries: RwLock<HashMap<Key, (u64, Bytes)>>,
    next_seq: AtomicU64,
}

impl TransferCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Make `value` visible for `key`. Returns the entry's sequence number.
    pub(crate) fn insert(&self, key: Key, value: Bytes) -> u64 {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.entries
            .write()
            .expect("transfer cache lock poisoned")
            .insert(key, (seq, value));
        seq
    }

    pub(crate) fn get(&self, key: &Key) -> Option<Bytes> {
        self.entries
            .read()
            .expect("transfer cache lock poisoned")
            .get(key)
            .map(|(_, value)| value.clone())
    }

    pub(crate) fn contains(&self, key: &Key) -> bool {
        self.entries
            .read()
            .expect("transfer cache lock poisoned")
            .contains_key(key)
    }

    /// Remove the entry for `key` if it is still the one inserted as `seq`.
    /// Returns whether an entry was removed.
    pub(crate) fn remove(&self, key: &Key, seq: u64) -> bool {
        let mut entries = self.entries.write().expect("transfer cache lock poisoned");
        match entries.get(key) {
            Some((current, _)) if *current == seq => {
                entries.remove(key);
                true
            }
            _ => false,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries
            .read()
            .expect("transfer cache lock poisoned")
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> Key {
        Key::new(s).unwrap()
    }

    #[test]
    fn insert_get_remove() {
        let transfer = TransferCache::new();
        let seq = transfer.insert(key("foo"), Bytes::from_static(b"v1"));
        assert!(transfer.contains(&key("foo")));
        assert_eq!(transfer.get(&key("foo")).unwrap(), Bytes::from_static(b"v1"));

        assert!(transfer.remove(&key("foo"), seq));
        assert_eq!(transfer.len(), 0);
        assert_eq!(transfer.get(&key("foo")), None);
    }

    #[test]
    fn stale_remove_keeps_newer_value() {
        let transfer = TransferCache::new();
        let first = transfer.insert(key("foo"), Bytes::from_static(b"v1"));
        let second = transfer.insert(key("foo"), Bytes::from_static(b"v2"));
        assert_ne!(first, second);

        assert!(!transfer.remove(&key("foo"), first));
        assert_eq!(transfer.get(&key("foo")).unwrap(), Bytes::from_static(b"v2"));

        assert!(transfer.remove(&key("foo"), second));
        assert_eq!(transfer.len(), 0);
    }

    #[test]
    fn remove_absent_is_noop() {
        let transfer = TransferCache::new();
        assert!(!transfer.remove(&key("foo"), 0));
    }
}
