//! On-disk addressing.
//!
//! Layout:
//! ```text
//! {root}/
//! ├── 5c/
//! │   └── 5c735d76fe3537a0f35cf4a4eb14a532   # raw value bytes
//! ├── ab/
//! │   └── abcdef...
//! └── f/
//!     └── f                                  # keys shorter than the shard
//! ```
//!
//! Files hold the value bytes only: no header, checksum or metadata. Writes go
//! through a temporary file in the shard directory that is renamed over the
//! final path, so a reader never observes a partially written value.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use bytes::Bytes;
use stor_types::Key;
use tempfile::NamedTempFile;

use crate::error::{IoOp, StoreError, StoreResult};

#[derive(Clone, Debug)]
pub(crate) struct Layout {
    root: PathBuf,
    sync_writes: bool,
}

impl Layout {
    pub(crate) fn new(root: impl Into<PathBuf>, sync_writes: bool) -> Self {
        Self {
            root: root.into(),
            sync_writes,
        }
    }

    pub(crate) fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the value for `key`.
    pub(crate) fn shard_dir(&self, key: &Key) -> PathBuf {
        self.root.join(key.shard())
    }

    /// File holding the value for `key`.
    pub(crate) fn path(&self, key: &Key) -> PathBuf {
        self.shard_dir(key).join(key.as_str())
    }

    /// Write `value` to the key's file, replacing any previous value.
    ///
    /// Blocking; runs on the blocking pool from background write tasks.
    pub(crate) fn write(&self, key: &Key, value: &[u8]) -> StoreResult<()> {
        let dir = self.shard_dir(key);
        fs::create_dir_all(&dir).map_err(|e| StoreError::io(IoOp::CreateDir, &dir, e))?;

        let mut file =
            NamedTempFile::new_in(&dir).map_err(|e| StoreError::io(IoOp::CreateFile, &dir, e))?;
        file.write_all(value)
            .map_err(|e| StoreError::io(IoOp::Write, file.path(), e))?;
        if self.sync_writes {
            file.as_file()
                .sync_all()
                .map_err(|e| StoreError::io(IoOp::Sync, file.path(), e))?;
        }

        let path = dir.join(key.as_str());
        file.persist(&path)
            .map_err(|e| StoreError::io(IoOp::Rename, &path, e.error))?;
        Ok(())
    }

    /// Read the key's value. A missing file is [`StoreError::NotFound`].
    pub(crate) async fn read(&self, key: &Key) -> StoreResult<Bytes> {
        let path = self.path(key);
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(StoreError::NotFound { key: key.clone() })
            }
            Err(e) => Err(StoreError::io(IoOp::Read, &path, e)),
        }
    }

    /// Whether a file exists for the key.
    pub(crate) async fn exists(&self, key: &Key) -> StoreResult<bool> {
        let path = self.path(key);
        tokio::fs::try_exists(&path)
            .await
            .map_err(|e| StoreError::io(IoOp::Read, &path, e))
    }

    /// Recursively remove the root. A missing root is not an error.
    pub(crate) async fn remove_root(&self) -> StoreResult<()> {
        match tokio::fs::remove_dir_all(&self.root).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::io(IoOp::RemoveRoot, &self.root, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn key(s: &str) -> Key {
        Key::new(s).unwrap()
    }

    #[test]
    fn sharded_paths() {
        let layout = Layout::new("/data", false);
        assert_eq!(layout.path(&key("abcdef")), PathBuf::from("/data/ab/abcdef"));
        assert_eq!(layout.path(&key("ab")), PathBuf::from("/data/ab/ab"));
        assert_eq!(layout.path(&key("f")), PathBuf::from("/data/f/f"));
    }

    #[tokio::test]
    async fn write_then_read() {
        let dir = TempDir::new().unwrap();
        let layout = Layout::new(dir.path().join("store"), true);
        layout.write(&key("foo"), &[1, 2, 3, 251]).unwrap();

        let on_disk = fs::read(dir.path().join("store/fo/foo")).unwrap();
        assert_eq!(on_disk, vec![1, 2, 3, 251]);
        assert_eq!(layout.read(&key("foo")).await.unwrap(), Bytes::from_static(&[1, 2, 3, 251]));
        assert!(layout.exists(&key("foo")).await.unwrap());
    }

    #[tokio::test]
    async fn rewrite_replaces_and_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let layout = Layout::new(dir.path(), false);
        layout.write(&key("foo"), b"first").unwrap();
        layout.write(&key("foo"), b"second").unwrap();

        assert_eq!(layout.read(&key("foo")).await.unwrap(), Bytes::from_static(b"second"));
        let entries: Vec<_> = fs::read_dir(dir.path().join("fo")).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn missing_is_not_found() {
        let dir = TempDir::new().unwrap();
        let layout = Layout::new(dir.path(), false);
        let err = layout.read(&key("nope")).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(!layout.exists(&key("nope")).await.unwrap());
    }

    #[test]
    fn write_under_file_root_fails() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("root");
        fs::write(&root, b"file").unwrap();
        let layout = Layout::new(&root, false);
        let err = layout.write(&key("foo"), b"x").unwrap_err();
        assert!(matches!(err, StoreError::Io { op: IoOp::CreateDir, .. }));
    }

    #[tokio::test]
    async fn remove_root_twice() {
        let dir = TempDir::new().unwrap();
        let layout = Layout::new(dir.path().join("store"), false);
        layout.write(&key("foo"), b"x").unwrap();
        layout.remove_root().await.unwrap();
        assert!(!dir.path().join("store").exists());
        layout.remove_root().await.unwrap();
    }
}
