use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

use bytes::Bytes;
use stor_types::Key;
use tracing::trace;

use crate::stats::{CacheStats, Counters};
use crate::traits::{Cache, InsertionHook, RetrievalHook};

/// Bounded most-recently-used cache.
///
/// Values enter the cache only when they are read back from disk (the
/// retrieval hook). Once the cache holds `capacity` entries, each new entry
/// reuses the slot of the least recently promoted one. A hit promotes the
/// entry to most recent.
///
/// Writes to a key that is already resident replace its value in place but
/// do **not** promote it: only reads count as use.
///
/// Every operation, lookups included, takes the same mutex because a hit
/// reorders the recency list.
pub struct CacheMostRecent {
    capacity: usize,
    inner: Mutex<Recency>,
    counters: Counters,
}

impl CacheMostRecent {
    /// Create a cache holding at most `capacity` values.
    ///
    /// Returns `None` for a capacity of zero.
    pub fn new(capacity: usize) -> Option<Self> {
        if capacity == 0 {
            return None;
        }
        Some(Self {
            capacity,
            inner: Mutex::new(Recency::with_capacity(capacity)),
            counters: Counters::default(),
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of resident values.
    pub fn len(&self) -> usize {
        self.inner.lock().expect("cache lock poisoned").index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resident keys, most recently promoted first.
    pub fn keys(&self) -> Vec<Key> {
        self.inner.lock().expect("cache lock poisoned").keys()
    }

    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot()
    }
}

impl Cache for CacheMostRecent {
    fn get(&self, key: &Key) -> Option<Bytes> {
        let mut inner = self.inner.lock().expect("cache lock poisoned");
        let value = match inner.index.get(key).copied() {
            Some(slot) => {
                inner.promote(slot);
                Some(inner.slots[slot].value.clone())
            }
            None => None,
        };
        self.counters.lookup(value.is_some());
        value
    }

    fn insertion_hook(&self) -> Option<&dyn InsertionHook> {
        Some(self)
    }

    fn retrieval_hook(&self) -> Option<&dyn RetrievalHook> {
        Some(self)
    }
}

impl RetrievalHook for CacheMostRecent {
    fn see_get(&self, key: &Key, value: &Bytes) {
        let mut inner = self.inner.lock().expect("cache lock poisoned");

        // Two readers can miss on the same key and both report the disk read.
        if let Some(&slot) = inner.index.get(key) {
            inner.slots[slot].value = value.clone();
            inner.promote(slot);
            return;
        }

        if inner.slots.len() < self.capacity {
            inner.push_front(key.clone(), value.clone());
            return;
        }

        if let Some(evicted) = inner.recycle_tail(key.clone(), value.clone()) {
            trace!(%evicted, %key, "cache eviction");
            self.counters.evicted();
        }
    }
}

impl InsertionHook for CacheMostRecent {
    fn see_put(&self, key: &Key, value: &Bytes) {
        let mut inner = self.inner.lock().expect("cache lock poisoned");
        if let Some(&slot) = inner.index.get(key) {
            inner.slots[slot].value = value.clone();
        }
    }
}

impl fmt::Debug for CacheMostRecent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheMostRecent")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Recency list
// ---------------------------------------------------------------------------

/// A slot in the recency list. Links are indices into `Recency::slots`.
struct Slot {
    key: Key,
    value: Bytes,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Index-linked list of slots, most recent at `head`, plus a key index.
///
/// Slots are only ever appended until capacity is reached, then reused in
/// place, so slot indices stay valid for the lifetime of the cache.
struct Recency {
    slots: Vec<Slot>,
    index: HashMap<Key, usize>,
    head: Option<usize>,
    tail: Option<usize>,
}

impl Recency {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
            head: None,
            tail: None,
        }
    }

    fn push_front(&mut self, key: Key, value: Bytes) {
        let slot = self.slots.len();
        self.slots.push(Slot {
            key: key.clone(),
            value,
            prev: None,
            next: None,
        });
        self.link_front(slot);
        self.index.insert(key, slot);
    }

    /// Overwrite the tail slot with a new entry and make it most recent.
    /// Returns the evicted key.
    fn recycle_tail(&mut self, key: Key, value: Bytes) -> Option<Key> {
        let slot = self.tail?;
        let evicted = std::mem::replace(&mut self.slots[slot].key, key.clone());
        self.slots[slot].value = value;
        self.index.remove(&evicted);
        self.index.insert(key, slot);
        self.promote(slot);
        Some(evicted)
    }

    fn promote(&mut self, slot: usize) {
        if self.head == Some(slot) {
            return;
        }
        self.unlink(slot);
        self.link_front(slot);
    }

    fn unlink(&mut self, slot: usize) {
        let (prev, next) = (self.slots[slot].prev, self.slots[slot].next);
        match prev {
            Some(p) => self.slots[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.slots[n].prev = prev,
            None => self.tail = prev,
        }
        self.slots[slot].prev = None;
        self.slots[slot].next = None;
    }

    fn link_front(&mut self, slot: usize) {
        self.slots[slot].next = self.head;
        if let Some(old_head) = self.head {
            self.slots[old_head].prev = Some(slot);
        }
        self.head = Some(slot);
        if self.tail.is_none() {
            self.tail = Some(slot);
        }
    }

    fn keys(&self) -> Vec<Key> {
        let mut keys = Vec::with_capacity(self.index.len());
        let mut cursor = self.head;
        while let Some(slot) = cursor {
            keys.push(self.slots[slot].key.clone());
            cursor = self.slots[slot].next;
        }
        keys
    }
}
