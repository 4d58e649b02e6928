//! Membership ledger for stor.
//!
//! An [`Inventory`] keeps track of the keys that are durably stored. The
//! store consults it on both paths:
//! - on insertion, a key the inventory already knows is rejected;
//! - on retrieval, a key the inventory does not know is reported missing
//!   without probing the disk.
//!
//! Membership is monotonic. The store only calls [`Inventory::see`] after
//! a value has been written to disk, and never removes a key.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{InventoryError, Result};
pub use memory::MemoryInventory;
pub use traits::Inventory;
