use std::sync::atomic::{AtomicU64, Ordering};

/// The layer that answered a successful read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReadSource {
    Cache,
    Transfer,
    Disk,
}

/// Point-in-time store counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Writes that passed admission and were scheduled.
    pub writes_accepted: u64,
    /// Background writes that reached disk.
    pub writes_persisted: u64,
    /// Background writes that failed.
    pub writes_failed: u64,
    pub reads_from_cache: u64,
    pub reads_from_transfer: u64,
    pub reads_from_disk: u64,
    /// Reads that ended in `NotFound`.
    pub reads_missing: u64,
}

#[derive(Debug, Default)]
pub(crate) struct Counters {
    writes_accepted: AtomicU64,
    writes_persisted: AtomicU64,
    writes_failed: AtomicU64,
    reads_from_cache: AtomicU64,
    reads_from_transfer: AtomicU64,
    reads_from_disk: AtomicU64,
    reads_missing: AtomicU64,
}

impl Counters {
    pub(crate) fn accepted(&self) {
        self.writes_accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn persisted(&self, ok: bool) {
        let counter = if ok {
            &self.writes_persisted
        } else {
            &self.writes_failed
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn served(&self, source: ReadSource) {
        let counter = match source {
            ReadSource::Cache => &self.reads_from_cache,
            ReadSource::Transfer => &self.reads_from_transfer,
            ReadSource::Disk => &self.reads_from_disk,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn missing(&self) {
        self.reads_missing.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> StoreStats {
        StoreStats {
            writes_accepted: self.writes_accepted.load(Ordering::Relaxed),
            writes_persisted: self.writes_persisted.load(Ordering::Relaxed),
            writes_failed: self.writes_failed.load(Ordering::Relaxed),
            reads_from_cache: self.reads_from_cache.load(Ordering::Relaxed),
            reads_from_transfer: self.reads_from_transfer.load(Ordering::Relaxed),
            reads_from_disk: self.reads_from_disk.load(Ordering::Relaxed),
            reads_missing: self.reads_missing.load(Ordering::Relaxed),
        }
    }
}
