//! The store controller.
//!
//! Write path:
//! ```text
//! write ─► validate ─► sticky failure? ─► limiter ─► inventory has? ─►
//!   transfer cache insert ─► cache insertion hook ─► spawn background write
//!
//! background write ─► disk ─► inventory see ─► transfer cache remove
//! ```
//!
//! Read path, first answer wins:
//! ```text
//! read ─► cache ─► transfer cache ─► inventory (unknown = NotFound) ─► disk
//!                                                  └─► cache retrieval hook
//! ```

use std::fmt;
use std::path::Path;
use std::sync::{Arc, OnceLock};

use bytes::Bytes;
use stor_cache::Cache;
use stor_gate::Limiter;
use stor_inventory::Inventory;
use stor_types::Key;
use tokio::runtime::Handle;
use tokio::sync::{oneshot, watch};
use tracing::{debug, error, info, trace};

use crate::error::{StoreError, StoreResult};
use crate::layout::Layout;
use crate::receipt::WriteReceipt;
use crate::stats::{Counters, ReadSource, StoreStats};
use crate::transfer::TransferCache;

/// Filesystem-backed key/value store.
///
/// `Store` is a cheap handle: clones share the same transfer cache, stages
/// and background writes.
///
/// Writes return as soon as the value is accepted and visible to readers;
/// the disk write happens on the runtime's blocking pool. If any background
/// write fails, the error is kept and every later [`write`](Self::write) on
/// this store returns it. The store does not recover from that state.
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

pub(crate) struct StoreInner {
    pub(crate) layout: Layout,
    pub(crate) limiter: Option<Arc<dyn Limiter>>,
    pub(crate) cache: Option<Arc<dyn Cache>>,
    pub(crate) inventory: Option<Arc<dyn Inventory>>,
    pub(crate) transfer: TransferCache,
    pub(crate) failure: OnceLock<StoreError>,
    pub(crate) pending: watch::Sender<usize>,
    pub(crate) runtime: Handle,
    pub(crate) counters: Counters,
}

impl Store {
    pub(crate) fn from_inner(inner: StoreInner) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        self.inner.layout.root()
    }

    /// Accept `value` for `key` and schedule its write to disk.
    ///
    /// Returns once the value is visible to [`read`](Self::read); it does not
    /// wait for the disk. Errors returned here mean the write had no effect,
    /// except for a recorded background failure, which is returned as is.
    pub fn write(&self, key: &str, value: impl Into<Bytes>) -> StoreResult<WriteReceipt> {
        let key = Key::new(key)?;
        self.write_key(key, value.into())
    }

    /// [`write`](Self::write) for an already validated key.
    pub fn write_key(&self, key: Key, value: Bytes) -> StoreResult<WriteReceipt> {
        let inner = &self.inner;

        if let Some(failure) = inner.failure.get() {
            return Err(failure.clone());
        }

        if let Some(limiter) = &inner.limiter {
            if limiter.deny(&key, &value) {
                debug!(%key, limiter = limiter.name(), "write denied");
                return Err(StoreError::AdmissionDenied { key });
            }
        }

        if let Some(inventory) = &inner.inventory {
            if inventory.has(&key) {
                return Err(StoreError::AlreadyExists { key });
            }
        }

        let seq = inner.transfer.insert(key.clone(), value.clone());

        if let Some(hook) = inner.cache.as_deref().and_then(|c| c.insertion_hook()) {
            hook.see_put(&key, &value);
        }

        inner.pending.send_modify(|n| *n += 1);
        inner.counters.accepted();
        debug!(%key, len = value.len(), "write accepted");

        let (tx, rx) = oneshot::channel();
        let in_flight = InFlight {
            inner: Arc::clone(inner),
            key: key.clone(),
            seq,
        };
        inner.runtime.spawn_blocking(move || {
            let result = in_flight.persist(&value);
            drop(in_flight);
            let _ = tx.send(result);
        });

        Ok(WriteReceipt::new(key, rx))
    }

    /// Fetch the value stored under `key`.
    pub async fn read(&self, key: &str) -> StoreResult<Bytes> {
        let key = Key::new(key)?;
        self.read_key(&key).await
    }

    /// [`read`](Self::read) for an already validated key.
    pub async fn read_key(&self, key: &Key) -> StoreResult<Bytes> {
        let inner = &self.inner;

        if let Some(value) = inner.cache.as_deref().and_then(|c| c.get(key)) {
            return Ok(inner.served(key, ReadSource::Cache, value));
        }

        if let Some(value) = inner.transfer.get(key) {
            return Ok(inner.served(key, ReadSource::Transfer, value));
        }

        if let Some(inventory) = &inner.inventory {
            if !inventory.has(key) {
                inner.counters.missing();
                return Err(StoreError::NotFound { key: key.clone() });
            }
        }

        let value = match inner.layout.read(key).await {
            Ok(value) => value,
            Err(err) => {
                if err.is_not_found() {
                    inner.counters.missing();
                }
                return Err(err);
            }
        };

        if let Some(hook) = inner.cache.as_deref().and_then(|c| c.retrieval_hook()) {
            hook.see_get(key, &value);
        }
        Ok(inner.served(key, ReadSource::Disk, value))
    }

    /// Whether `key` is stored or being written.
    ///
    /// Consults the transfer cache, then the inventory when one is
    /// configured, else the disk. Never touches the read cache.
    pub async fn contains(&self, key: &str) -> StoreResult<bool> {
        let key = Key::new(key)?;
        if self.inner.transfer.contains(&key) {
            return Ok(true);
        }
        match &self.inner.inventory {
            Some(inventory) => Ok(inventory.has(&key)),
            None => self.inner.layout.exists(&key).await,
        }
    }

    /// Wait for every background write scheduled before this call.
    ///
    /// Writes may continue to be accepted while waiting; the wait ends the
    /// next time no write is in flight.
    pub async fn drain(&self) {
        let mut pending = self.inner.pending.subscribe();
        // The sender lives in `inner`, which `self` keeps alive.
        let _ = pending.wait_for(|&n| n == 0).await;
    }

    /// Drain, then remove the store root and everything under it.
    ///
    /// Calling it again, or on a root that never existed, succeeds.
    pub async fn teardown(&self) -> StoreResult<()> {
        self.drain().await;
        self.inner.layout.remove_root().await?;
        info!(root = %self.root().display(), "store removed");
        Ok(())
    }

    /// Number of background writes still in flight.
    pub fn pending_writes(&self) -> usize {
        *self.inner.pending.borrow()
    }

    /// The recorded background write failure, if any.
    pub fn failure(&self) -> Option<&StoreError> {
        self.inner.failure.get()
    }

    pub fn stats(&self) -> StoreStats {
        self.inner.counters.snapshot()
    }
}

impl StoreInner {
    fn served(&self, key: &Key, source: ReadSource, value: Bytes) -> Bytes {
        debug!(%key, ?source, len = value.len(), "read served");
        self.counters.served(source);
        value
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = &self.inner;
        f.debug_struct("Store")
            .field("root", &inner.layout.root())
            .field("limiter", &inner.limiter.as_ref().map(|l| l.name().to_string()))
            .field("cache", &inner.cache.is_some())
            .field("inventory", &inner.inventory.is_some())
            .field("pending_writes", &*inner.pending.borrow())
            .field("in_transfer", &inner.transfer.len())
            .field("failed", &inner.failure.get().is_some())
            .finish()
    }
}

/// One scheduled background write.
///
/// Dropping it retires the write: the transfer cache entry is removed and
/// the pending count decremented. This also runs if the write panics or the
/// runtime discards the task before it starts.
struct InFlight {
    inner: Arc<StoreInner>,
    key: Key,
    seq: u64,
}

impl InFlight {
    fn persist(&self, value: &[u8]) -> StoreResult<()> {
        let inner = &self.inner;
        match inner.layout.write(&self.key, value) {
            Ok(()) => {
                if let Some(inventory) = &inner.inventory {
                    inventory.see(&self.key);
                }
                inner.counters.persisted(true);
                trace!(key = %self.key, "write persisted");
                Ok(())
            }
            Err(err) => {
                inner.counters.persisted(false);
                error!(key = %self.key, error = %err, "background write failed");
                let _ = inner.failure.set(err.clone());
                Err(err)
            }
        }
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.inner.transfer.remove(&self.key, self.seq);
        self.inner.pending.send_modify(|n| *n -= 1);
    }
}
