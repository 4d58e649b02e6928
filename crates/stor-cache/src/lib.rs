//! Read caches for stor.
//!
//! A cache is consulted first on every read. Beyond the base lookup, a cache
//! may opt into two independent hooks, queried per instance by the store:
//!
//! - [`InsertionHook`]: called synchronously for every accepted write;
//! - [`RetrievalHook`]: called when a value was read back from disk.
//!
//! # Policies
//!
//! - [`CacheAll`] -- retains every written value, never evicts
//! - [`CacheMostRecent`] -- bounded, evicts the least recently promoted entry

pub mod all;
pub mod most_recent;
pub mod stats;
pub mod traits;

pub use all::CacheAll;
pub use most_recent::CacheMostRecent;
pub use stats::CacheStats;
pub use traits::{Cache, InsertionHook, RetrievalHook};
