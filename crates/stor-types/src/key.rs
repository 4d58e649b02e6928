use std::borrow::Borrow;
use std::fmt;
use std::path::is_separator;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::KeyError;

/// Number of leading characters of a key used as its shard directory.
pub const SHARD_LEN: usize = 2;

/// A validated store key.
///
/// Keys are opaque to the store: usually the hex digest of the value, but
/// any non-empty string that is usable as a single file name is accepted.
/// A key never contains a path separator or a NUL byte, and neither it nor
/// its shard is `.` or `..`, so `root/shard/key` always names a file
/// directly inside a shard directory under the root.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Key(String);

impl Key {
    /// Validate `key` and wrap it.
    pub fn new(key: impl Into<String>) -> Result<Self, KeyError> {
        let key = key.into();
        validate(&key)?;
        Ok(Self(key))
    }

    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The shard directory name for this key.
    ///
    /// The first [`SHARD_LEN`] characters of the key, or the whole key when
    /// it is shorter. Counted in characters so multi-byte keys are never
    /// split inside a code point.
    pub fn shard(&self) -> &str {
        shard_of(&self.0)
    }

    /// Unwrap into the owned string.
    pub fn into_string(self) -> String {
        self.0
    }
}

fn shard_of(key: &str) -> &str {
    match key.char_indices().nth(SHARD_LEN) {
        Some((end, _)) => &key[..end],
        None => key,
    }
}

fn validate(key: &str) -> Result<(), KeyError> {
    if key.is_empty() {
        return Err(KeyError::Empty);
    }
    if key.chars().any(is_separator) {
        return Err(KeyError::Separator(key.to_string()));
    }
    if key.contains('\0') {
        return Err(KeyError::Nul(key.to_string()));
    }
    // The shard is a directory name too, so `..x` would escape the root.
    let shard = shard_of(key);
    if shard == "." || shard == ".." {
        return Err(KeyError::Reserved(key.to_string()));
    }
    Ok(())
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({})", self.0)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Key {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Key {
    type Error = KeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for Key {
    type Error = KeyError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Key> for String {
    fn from(key: Key) -> Self {
        key.0
    }
}

impl AsRef<str> for Key {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn accepts_hex_digest() {
        let key = Key::new("5c735d76fe3537a0f35cf4a4eb14a532").unwrap();
        assert_eq!(key.as_str(), "5c735d76fe3537a0f35cf4a4eb14a532");
        assert_eq!(key.shard(), "5c");
    }

    #[test]
    fn rejects_empty() {
        assert_eq!(Key::new(""), Err(KeyError::Empty));
    }

    #[test]
    fn rejects_separator() {
        assert!(matches!(Key::new("a/b"), Err(KeyError::Separator(_))));
        assert!(matches!(Key::new("/"), Err(KeyError::Separator(_))));
        assert!(matches!(Key::new("ab/"), Err(KeyError::Separator(_))));
    }

    #[test]
    fn rejects_dot_components() {
        assert!(matches!(Key::new("."), Err(KeyError::Reserved(_))));
        assert!(matches!(Key::new(".."), Err(KeyError::Reserved(_))));
    }

    #[test]
    fn rejects_dot_dot_shard() {
        for key in ["..abc", "...", "..5c735d76"] {
            assert!(matches!(Key::new(key), Err(KeyError::Reserved(_))), "{key:?}");
        }
        assert_eq!(Key::new(".a").unwrap().shard(), ".a");
        assert_eq!(Key::new("a..").unwrap().shard(), "a.");
    }

    #[test]
    fn rejects_nul() {
        assert!(matches!(Key::new("a\0b"), Err(KeyError::Nul(_))));
        assert!(matches!(Key::new("\0"), Err(KeyError::Nul(_))));
    }

    #[test]
    fn short_key_is_its_own_shard() {
        assert_eq!(Key::new("f").unwrap().shard(), "f");
        assert_eq!(Key::new("fo").unwrap().shard(), "fo");
        assert_eq!(Key::new("foo").unwrap().shard(), "fo");
    }

    #[test]
    fn shard_respects_char_boundaries() {
        let key = Key::new("éàü").unwrap();
        assert_eq!(key.shard(), "éà");
    }

    #[test]
    fn parse_and_display() {
        let key: Key = "deadbeef".parse().unwrap();
        assert_eq!(format!("{key}"), "deadbeef");
        assert_eq!(format!("{key:?}"), "Key(deadbeef)");
    }

    #[test]
    fn serde_validates() {
        let key: Key = serde_json::from_str("\"cafe\"").unwrap();
        assert_eq!(key.as_str(), "cafe");
        assert!(serde_json::from_str::<Key>("\"ca/fe\"").is_err());
        assert!(serde_json::from_str::<Key>("\"\"").is_err());
    }

    proptest! {
        #[test]
        fn shard_is_prefix(s in "[a-z0-9]{1,40}") {
            let key = Key::new(s.clone()).unwrap();
            prop_assert!(s.starts_with(key.shard()));
            prop_assert_eq!(key.shard().chars().count(), s.len().min(SHARD_LEN));
        }

        #[test]
        fn shard_never_leaves_root(s in "[.a-z]{1,6}") {
            if let Ok(key) = Key::new(s) {
                prop_assert!(key.shard() != "." && key.shard() != "..");
            }
        }

        #[test]
        fn keys_with_slash_never_validate(a in "[a-z]{0,8}", b in "[a-z]{0,8}") {
            let joined = format!("{a}/{b}");
            prop_assert!(Key::new(joined).is_err());
        }
    }
}
