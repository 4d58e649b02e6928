//! Filesystem-backed key/value store with asynchronous persistence.
//!
//! Values are raw bytes addressed by string keys, typically content hashes.
//! A write is accepted synchronously and becomes readable immediately; the
//! bytes are written to `root/<shard>/<key>` in the background, where the
//! shard is the first two characters of the key.
//!
//! Three optional stages plug into the [`Store`]:
//!
//! - a [`Limiter`](stor_gate::Limiter) that may refuse writes;
//! - an [`Inventory`](stor_inventory::Inventory) of durably stored keys,
//!   which rejects duplicates and answers misses without touching the disk;
//! - a read [`Cache`](stor_cache::Cache).
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use stor_cache::CacheAll;
//! use stor_inventory::MemoryInventory;
//! use stor_store::Store;
//!
//! # async fn demo() -> stor_store::StoreResult<()> {
//! let store = Store::builder("/tmp/stor")
//!     .cache(Arc::new(CacheAll::new()))
//!     .inventory(Arc::new(MemoryInventory::new()))
//!     .build()?;
//!
//! let receipt = store.write("5c735d76", "hello")?;
//! assert_eq!(store.read("5c735d76").await?, "hello");
//!
//! receipt.durable().await?;
//! store.teardown().await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Failure model
//!
//! A failed background write is recorded once and returned by every later
//! [`Store::write`]. The [`WriteReceipt`] of each write reports that write's
//! own outcome.

pub mod builder;
pub mod config;
pub mod error;
mod layout;
pub mod receipt;
pub mod stats;
pub mod store;
mod transfer;

pub use builder::StoreBuilder;
pub use config::{CachePolicy, ConfigError, InventoryMode, StoreConfig};
pub use error::{IoOp, StoreError, StoreResult};
pub use receipt::WriteReceipt;
pub use stats::{ReadSource, StoreStats};
pub use store::Store;
pub use stor_types::{Key, KeyError};
