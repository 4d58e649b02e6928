use thiserror::Error;

/// Reasons a string cannot be used as a [`Key`](crate::Key).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("key must not be empty")]
    Empty,

    #[error("key {0:?} contains a path separator")]
    Separator(String),

    #[error("key {0:?} is a reserved path component")]
    Reserved(String),

    #[error("key {0:?} contains a NUL byte")]
    Nul(String),
}
