use std::collections::HashSet;
use std::path::Path;
use std::sync::RwLock;

use stor_types::Key;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::error::{InventoryError, Result};
use crate::traits::Inventory;

/// In-memory, `HashSet`-based inventory.
///
/// The default inventory. Keys are held behind a `RwLock`, so `has` checks
/// from concurrent readers do not contend with each other.
#[derive(Debug, Default)]
pub struct MemoryInventory {
    keys: RwLock<HashSet<Key>>,
}

impl MemoryInventory {
    /// Create a new empty inventory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild an inventory from the files already present under a store
    /// root laid out as `root/<shard>/<key>`.
    ///
    /// A missing root yields an empty inventory. Files that are not valid
    /// keys, or that sit in a shard directory not matching their key, are
    /// skipped with a warning.
    pub fn scan(root: &Path) -> Result<Self> {
        let inventory = Self::new();
        if !root.exists() {
            return Ok(inventory);
        }
        if !root.is_dir() {
            return Err(InventoryError::NotADirectory(root.to_path_buf()));
        }

        let mut skipped = 0usize;
        for entry in WalkDir::new(root).min_depth(2).max_depth(2) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            match key_for_entry(entry.path()) {
                Some(key) => inventory.see(&key),
                None => {
                    skipped += 1;
                    warn!(path = %entry.path().display(), "skipping file outside the key layout");
                }
            }
        }

        info!(root = %root.display(), keys = inventory.len(), skipped, "inventory scanned");
        Ok(inventory)
    }

    /// Number of known keys.
    pub fn len(&self) -> usize {
        self.keys.read().expect("inventory lock poisoned").len()
    }

    /// Returns `true` if no key has been seen.
    pub fn is_empty(&self) -> bool {
        self.keys.read().expect("inventory lock poisoned").is_empty()
    }

    /// Sorted list of all known keys.
    pub fn keys(&self) -> Vec<Key> {
        let set = self.keys.read().expect("inventory lock poisoned");
        let mut keys: Vec<Key> = set.iter().cloned().collect();
        keys.sort();
        keys
    }
}

/// Recover the key from `root/<shard>/<key>`, if the path follows the layout.
fn key_for_entry(path: &Path) -> Option<Key> {
    let name = path.file_name()?.to_str()?;
    let shard = path.parent()?.file_name()?.to_str()?;
    let key = Key::new(name).ok()?;
    (key.shard() == shard).then_some(key)
}

impl Inventory for MemoryInventory {
    fn see(&self, key: &Key) {
        let mut keys = self.keys.write().expect("inventory lock poisoned");
        if !keys.contains(key) {
            keys.insert(key.clone());
        }
    }

    fn has(&self, key: &Key) -> bool {
        self.keys
            .read()
            .expect("inventory lock poisoned")
            .contains(key)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::Arc;
    use std::thread;

    use tempfile::TempDir;

    use super::*;

    fn key(s: &str) -> Key {
        Key::new(s).unwrap()
    }

    #[test]
    fn see_then_has() {
        let inv = MemoryInventory::new();
        assert!(!inv.has(&key("foo")));
        inv.see(&key("foo"));
        assert!(inv.has(&key("foo")));
        assert!(!inv.has(&key("bar")));
    }

    #[test]
    fn see_is_idempotent() {
        let inv = MemoryInventory::new();
        inv.see(&key("foo"));
        inv.see(&key("foo"));
        assert_eq!(inv.len(), 1);
    }

    #[test]
    fn keys_are_sorted() {
        let inv = MemoryInventory::new();
        for k in ["c", "a", "b"] {
            inv.see(&key(k));
        }
        assert_eq!(inv.keys(), vec![key("a"), key("b"), key("c")]);
    }

    #[test]
    fn concurrent_see() {
        let inv = Arc::new(MemoryInventory::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let inv = Arc::clone(&inv);
                thread::spawn(move || {
                    for i in 0..100 {
                        inv.see(&key(&format!("{t}-{i}")));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(inv.len(), 800);
    }

    #[test]
    fn scan_missing_root_is_empty() {
        let dir = TempDir::new().unwrap();
        let inv = MemoryInventory::scan(&dir.path().join("absent")).unwrap();
        assert!(inv.is_empty());
    }

    #[test]
    fn scan_rejects_file_root() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("root");
        fs::write(&file, b"not a dir").unwrap();
        assert!(matches!(
            MemoryInventory::scan(&file),
            Err(InventoryError::NotADirectory(_))
        ));
    }

    #[test]
    fn scan_recovers_layout() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        for (shard, name) in [("ab", "abcdef"), ("f", "f"), ("12", "1234")] {
            fs::create_dir_all(root.join(shard)).unwrap();
            fs::write(root.join(shard).join(name), b"data").unwrap();
        }
        // Wrong shard and a stray top-level file are ignored.
        fs::create_dir_all(root.join("zz")).unwrap();
        fs::write(root.join("zz").join("abc"), b"data").unwrap();
        fs::write(root.join("stray"), b"data").unwrap();

        let inv = MemoryInventory::scan(root).unwrap();
        assert_eq!(inv.keys(), vec![key("1234"), key("abcdef"), key("f")]);
        assert!(!inv.has(&key("abc")));
    }
}
