//! Admission control for stor.
//!
//! A [`Limiter`] is consulted first on every write, before the store touches
//! any state. A denial aborts the write with no side effects: the transfer
//! cache, the read cache and the inventory are left exactly as they were.
//!
//! # Quick Start
//!
//! ```rust
//! use stor_gate::{Limiter, LimiterChain, MaxValueSize};
//! use stor_types::Key;
//!
//! let mut chain = LimiterChain::new();
//! chain.push(MaxValueSize::new(4));
//! chain.push(|key: &Key, _value: &[u8]| key.as_str().starts_with("tmp"));
//!
//! let key = Key::new("abcd").unwrap();
//! assert!(!chain.deny(&key, b"1234"));
//! assert!(chain.deny(&key, b"12345"));
//! ```

pub mod chain;
pub mod limiter;
pub mod limits;

pub use chain::LimiterChain;
pub use limiter::Limiter;
pub use limits::{DenyEmpty, MaxValueSize};
