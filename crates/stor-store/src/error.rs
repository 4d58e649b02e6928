use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use stor_types::{Key, KeyError};

/// Filesystem operation that produced an [`StoreError::Io`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IoOp {
    CreateDir,
    CreateFile,
    Write,
    Sync,
    Rename,
    Read,
    RemoveRoot,
}

impl fmt::Display for IoOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::CreateDir => "create directory",
            Self::CreateFile => "create file",
            Self::Write => "write",
            Self::Sync => "sync",
            Self::Rename => "rename",
            Self::Read => "read",
            Self::RemoveRoot => "remove store root",
        };
        f.write_str(s)
    }
}

/// Errors from store operations.
///
/// Cloneable so that the first background write failure can be handed back,
/// unchanged, to every later writer on the same store.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// The key is empty or not usable as a file name.
    #[error("invalid key: {0}")]
    InvalidKey(#[from] KeyError),

    /// The configured limiter refused the write.
    #[error("limiter denied insertion of {key}")]
    AdmissionDenied { key: Key },

    /// The inventory already knows the key.
    #[error("{key} already exists in store")]
    AlreadyExists { key: Key },

    /// The key is not stored.
    #[error("{key} does not exist in store")]
    NotFound { key: Key },

    /// A filesystem operation failed.
    #[error("{op} failed for {}: {source}", path.display())]
    Io {
        op: IoOp,
        path: PathBuf,
        #[source]
        source: Arc<io::Error>,
    },

    /// A background write ended without reporting a result.
    #[error("background write for {key} did not complete")]
    Interrupted { key: Key },

    /// No tokio runtime was available to run background writes.
    #[error("no tokio runtime available for background writes")]
    NoRuntime,

    /// Rebuilding the inventory from disk failed.
    #[error("inventory error: {0}")]
    Inventory(String),

    /// The store configuration is unusable.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl StoreError {
    pub(crate) fn io(op: IoOp, path: impl AsRef<Path>, source: io::Error) -> Self {
        Self::Io {
            op,
            path: path.as_ref().to_path_buf(),
            source: Arc::new(source),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_invalid_key(&self) -> bool {
        matches!(self, Self::InvalidKey(_))
    }

    /// Rejected before the write had any effect.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::InvalidKey(_) | Self::AdmissionDenied { .. } | Self::AlreadyExists { .. }
        )
    }

    /// The underlying I/O error kind, for [`StoreError::Io`].
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            Self::Io { source, .. } => Some(source.kind()),
            _ => None,
        }
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_io() {
        let err = StoreError::io(
            IoOp::CreateDir,
            "/tmp/x/ab",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.to_string(), "create directory failed for /tmp/x/ab: denied");
        assert_eq!(err.io_kind(), Some(io::ErrorKind::PermissionDenied));
    }

    #[test]
    fn classification() {
        let key = Key::new("k").unwrap();
        assert!(StoreError::NotFound { key: key.clone() }.is_not_found());
        assert!(StoreError::from(KeyError::Empty).is_invalid_key());
        assert!(StoreError::AlreadyExists { key: key.clone() }.is_rejection());
        assert!(StoreError::AdmissionDenied { key }.is_rejection());
        assert!(!StoreError::NoRuntime.is_rejection());
    }

    #[test]
    fn clone_shares_source() {
        let err = StoreError::io(IoOp::Write, "f", io::Error::other("disk full"));
        let copy = err.clone();
        match (&err, &copy) {
            (StoreError::Io { source: a, .. }, StoreError::Io { source: b, .. }) => {
                assert!(Arc::ptr_eq(a, b));
            }
            _ => unreachable!(),
        }
    }
}
