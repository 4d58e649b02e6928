//! Foundation types for stor.
//!
//! Every other stor crate depends on `stor-types`. It defines the validated
//! [`Key`] under which values are stored, and the shard rule mapping a key
//! to its on-disk directory.
//!
//! # Key Types
//!
//! - [`Key`] -- Caller-supplied unique identifier (typically a content hash)
//! - [`KeyError`] -- Reasons a string is rejected as a key

pub mod error;
pub mod key;

pub use error::KeyError;
pub use key::{Key, SHARD_LEN};
