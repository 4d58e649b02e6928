use std::path::PathBuf;

/// Errors produced while rebuilding an inventory from disk.
#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    /// The store root exists but is not a directory.
    #[error("store root is not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Walking the store directory failed.
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Convenience alias used throughout the inventory crate.
pub type Result<T> = std::result::Result<T, InventoryError>;
