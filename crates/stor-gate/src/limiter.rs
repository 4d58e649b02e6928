use stor_types::Key;

/// Synchronous admission predicate evaluated before a write has any effect.
///
/// The trait is object-safe and `Send + Sync` so limiters can be shared as
/// `Arc<dyn Limiter>` by a store and its clones. Any
/// `Fn(&Key, &[u8]) -> bool` closure is a limiter.
pub trait Limiter: Send + Sync {
    /// Human-readable name, used when logging denials.
    fn name(&self) -> &str {
        "limiter"
    }

    /// Returns `true` if the element must not be inserted.
    fn deny(&self, key: &Key, value: &[u8]) -> bool;
}

impl<F> Limiter for F
where
    F: Fn(&Key, &[u8]) -> bool + Send + Sync,
{
    fn name(&self) -> &str {
        "fn"
    }

    fn deny(&self, key: &Key, value: &[u8]) -> bool {
        self(key, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closure_is_a_limiter() {
        let deny_all = |_: &Key, _: &[u8]| true;
        let key = Key::new("k").unwrap();
        assert!(deny_all.deny(&key, b"v"));
        assert_eq!(Limiter::name(&deny_all), "fn");
    }

    #[test]
    fn boxed_closure_as_trait_object() {
        let boxed: Box<dyn Limiter> = Box::new(|key: &Key, _: &[u8]| key.as_str() == "no");
        assert!(boxed.deny(&Key::new("no").unwrap(), b""));
        assert!(!boxed.deny(&Key::new("yes").unwrap(), b""));
    }
}
