use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use stor_cache::{Cache, CacheAll, CacheMostRecent};
use stor_gate::{Limiter, MaxValueSize};
use stor_inventory::{Inventory, MemoryInventory};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::info;

use crate::config::{CachePolicy, InventoryMode, StoreConfig};
use crate::error::{StoreError, StoreResult};
use crate::layout::Layout;
use crate::stats::Counters;
use crate::store::{Store, StoreInner};
use crate::transfer::TransferCache;

/// Assembles a [`Store`] from its optional stages.
///
/// ```no_run
/// # async fn demo() -> stor_store::StoreResult<()> {
/// use std::sync::Arc;
/// use stor_cache::CacheMostRecent;
/// use stor_gate::MaxValueSize;
/// use stor_inventory::MemoryInventory;
/// use stor_store::Store;
///
/// let store = Store::builder("/var/lib/stor")
///     .limiter(MaxValueSize::new(1 << 20))
///     .cache(Arc::new(CacheMostRecent::new(256).unwrap()))
///     .inventory(Arc::new(MemoryInventory::new()))
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct StoreBuilder {
    root: PathBuf,
    limiter: Option<Arc<dyn Limiter>>,
    cache: Option<Arc<dyn Cache>>,
    inventory: Option<Arc<dyn Inventory>>,
    sync_writes: bool,
    runtime: Option<Handle>,
}

impl Store {
    /// Start building a store rooted at `root`.
    pub fn builder(root: impl Into<PathBuf>) -> StoreBuilder {
        StoreBuilder {
            root: root.into(),
            limiter: None,
            cache: None,
            inventory: None,
            sync_writes: false,
            runtime: None,
        }
    }

    /// Build a store from a loaded configuration.
    ///
    /// Must be called from within a tokio runtime. With
    /// [`InventoryMode::Scan`] the existing root is walked before the store
    /// is returned.
    pub fn from_config(config: &StoreConfig) -> StoreResult<Self> {
        config
            .validate()
            .map_err(|e| StoreError::Config(e.to_string()))?;

        let mut builder = Store::builder(&config.root).sync_writes(config.sync_writes);

        if let Some(max_bytes) = config.max_value_size {
            builder = builder.limiter(MaxValueSize::new(max_bytes));
        }

        match &config.cache {
            CachePolicy::None => {}
            CachePolicy::All => builder = builder.cache(Arc::new(CacheAll::new())),
            CachePolicy::MostRecent { capacity } => {
                let cache = CacheMostRecent::new(*capacity).ok_or_else(|| {
                    StoreError::Config("most_recent cache capacity must be at least 1".into())
                })?;
                builder = builder.cache(Arc::new(cache));
            }
        }

        match config.inventory {
            InventoryMode::None => {}
            InventoryMode::Memory => builder = builder.inventory(Arc::new(MemoryInventory::new())),
            InventoryMode::Scan => {
                let inventory = MemoryInventory::scan(&config.root)
                    .map_err(|e| StoreError::Inventory(e.to_string()))?;
                builder = builder.inventory(Arc::new(inventory));
            }
        }

        builder.build()
    }
}

impl StoreBuilder {
    /// Consult `limiter` before every write.
    pub fn limiter(mut self, limiter: impl Limiter + 'static) -> Self {
        self.limiter = Some(Arc::new(limiter));
        self
    }

    pub fn cache(mut self, cache: Arc<dyn Cache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn inventory(mut self, inventory: Arc<dyn Inventory>) -> Self {
        self.inventory = Some(inventory);
        self
    }

    /// fsync every value before its write counts as persisted.
    pub fn sync_writes(mut self, sync_writes: bool) -> Self {
        self.sync_writes = sync_writes;
        self
    }

    /// Run background writes on `runtime` instead of the current one.
    pub fn runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn build(self) -> StoreResult<Store> {
        let runtime = match self.runtime {
            Some(handle) => handle,
            None => Handle::try_current().map_err(|_| StoreError::NoRuntime)?,
        };

        info!(
            root = %self.root.display(),
            limiter = self.limiter.is_some(),
            cache = self.cache.is_some(),
            inventory = self.inventory.is_some(),
            sync_writes = self.sync_writes,
            "store opened"
        );

        let (pending, _) = watch::channel(0usize);
        Ok(Store::from_inner(StoreInner {
            layout: Layout::new(self.root, self.sync_writes),
            limiter: self.limiter,
            cache: self.cache,
            inventory: self.inventory,
            transfer: TransferCache::new(),
            failure: OnceLock::new(),
            pending,
            runtime,
            counters: Counters::default(),
        }))
    }
}
