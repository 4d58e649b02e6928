use stor_types::Key;

use crate::limiter::Limiter;

/// Denies values larger than a fixed number of bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MaxValueSize {
    max_bytes: usize,
}

impl MaxValueSize {
    pub fn new(max_bytes: usize) -> Self {
        Self { max_bytes }
    }

    /// The largest accepted value length.
    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }
}

impl Limiter for MaxValueSize {
    fn name(&self) -> &str {
        "max_value_size"
    }

    fn deny(&self, _key: &Key, value: &[u8]) -> bool {
        value.len() > self.max_bytes
    }
}

/// Denies zero-length values.
#[derive(Clone, Copy, Debug, Default)]
pub struct DenyEmpty;

impl Limiter for DenyEmpty {
    fn name(&self) -> &str {
        "deny_empty"
    }

    fn deny(&self, _key: &Key, value: &[u8]) -> bool {
        value.is_empty()
    }
}
