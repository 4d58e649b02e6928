use stor_types::Key;
use tokio::sync::oneshot;

use crate::error::{StoreError, StoreResult};

/// Handle to the background write scheduled by [`Store::write`].
///
/// A successful `write` only means the value was accepted. The receipt
/// reports whether that particular value then reached disk. Dropping it is
/// fine; the write proceeds regardless.
///
/// [`Store::write`]: crate::Store::write
#[derive(Debug)]
pub struct WriteReceipt {
    key: Key,
    outcome: oneshot::Receiver<StoreResult<()>>,
}

impl WriteReceipt {
    pub(crate) fn new(key: Key, outcome: oneshot::Receiver<StoreResult<()>>) -> Self {
        Self { key, outcome }
    }

    /// The key that was written.
    pub fn key(&self) -> &Key {
        &self.key
    }

    /// Wait for the background write and return its outcome.
    ///
    /// Resolves once the value is on disk and registered in the inventory,
    /// or with the error that stopped it.
    pub async fn durable(self) -> StoreResult<()> {
        match self.outcome.await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Interrupted { key: self.key }),
        }
    }
}
