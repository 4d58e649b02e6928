//! Store configuration with environment variable and file-based loading.
//!
//! Environment variables:
//! - `STOR_PATH`: store root
//! - `STOR_CACHE_CAPACITY`: enables a most-recent cache of this many values
//! - `STOR_SYNC_WRITES`: set to "true" or "1" to fsync every value
//!
//! Default root: `./stor`

use std::env;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Read cache selection.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum CachePolicy {
    /// No read cache.
    #[default]
    None,
    /// Keep every written value in memory.
    All,
    /// Keep the `capacity` most recently read values.
    MostRecent { capacity: usize },
}

/// Inventory selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InventoryMode {
    /// No inventory: duplicates are allowed and every miss probes the disk.
    #[default]
    None,
    /// Start with an empty inventory.
    Memory,
    /// Rebuild the inventory from the files already under the root.
    Scan,
}

/// Configuration for a [`Store`](crate::Store).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Root directory. Removed entirely by `teardown`.
    pub root: PathBuf,

    #[serde(default)]
    pub cache: CachePolicy,

    #[serde(default)]
    pub inventory: InventoryMode,

    /// Deny values larger than this many bytes.
    #[serde(default)]
    pub max_value_size: Option<usize>,

    /// fsync each value before it is considered durable.
    #[serde(default)]
    pub sync_writes: bool,
}

/// Errors loading a [`StoreConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("{0}")]
    Invalid(String),
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::with_root(default_root())
    }
}

fn default_root() -> PathBuf {
    PathBuf::from("stor")
}

impl StoreConfig {
    /// A config with the given root and every optional stage disabled.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: CachePolicy::None,
            inventory: InventoryMode::None,
            max_value_size: None,
            sync_writes: false,
        }
    }

    /// Load configuration from environment variables, falling back to
    /// defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(root) = env::var("STOR_PATH") {
            config.root = PathBuf::from(root);
        }

        if let Ok(raw) = env::var("STOR_CACHE_CAPACITY") {
            let capacity = raw.trim().parse::<usize>().map_err(|e| {
                ConfigError::Invalid(format!("STOR_CACHE_CAPACITY={raw:?}: {e}"))
            })?;
            config.cache = CachePolicy::MostRecent { capacity };
        }

        if let Ok(raw) = env::var("STOR_SYNC_WRITES") {
            config.sync_writes = raw.eq_ignore_ascii_case("true") || raw == "1";
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// Settings are read from a `[store]` section when the file has one,
    /// otherwise from the top level:
    /// ```toml
    /// [store]
    /// root = "/var/lib/stor"
    /// inventory = "scan"
    /// sync_writes = true
    ///
    /// [store.cache]
    /// policy = "most_recent"
    /// capacity = 1024
    /// ```
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&contents)
    }

    /// Parse configuration from TOML text. See [`from_file`](Self::from_file).
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let mut table: toml::Table = contents.parse()?;
        let config: StoreConfig = match table.remove("store") {
            Some(section) => section.try_into()?,
            None => toml::Value::Table(table).try_into()?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject settings no store can be built from.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.root.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("store root must not be empty".into()));
        }
        if self.cache == (CachePolicy::MostRecent { capacity: 0 }) {
            return Err(ConfigError::Invalid(
                "most_recent cache capacity must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
