use std::fmt;

use stor_types::Key;
use tracing::debug;

use crate::limiter::Limiter;

/// An ordered list of limiters acting as one.
///
/// The chain is **fail-fast**: limiters are evaluated in insertion order and
/// the first denial wins. An empty chain admits everything.
#[derive(Default)]
pub struct LimiterChain {
    limiters: Vec<Box<dyn Limiter>>,
}

impl LimiterChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a limiter to the end of the chain.
    pub fn push(&mut self, limiter: impl Limiter + 'static) {
        self.limiters.push(Box::new(limiter));
    }

    /// Builder-style [`push`](Self::push).
    pub fn with(mut self, limiter: impl Limiter + 'static) -> Self {
        self.push(limiter);
        self
    }

    /// Number of limiters in the chain.
    pub fn len(&self) -> usize {
        self.limiters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.limiters.is_empty()
    }
}

impl Limiter for LimiterChain {
    fn name(&self) -> &str {
        "chain"
    }

    fn deny(&self, key: &Key, value: &[u8]) -> bool {
        for limiter in &self.limiters {
            if limiter.deny(key, value) {
                debug!(%key, limiter = limiter.name(), len = value.len(), "write denied");
                return true;
            }
        }
        false
    }
}

impl fmt::Debug for LimiterChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.limiters.iter().map(|l| l.name()).collect();
        f.debug_struct("LimiterChain").field("limiters", &names).finish()
    }
}
