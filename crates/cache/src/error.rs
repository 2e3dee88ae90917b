//! Error types for key derivation and entry construction.

use thiserror::Error;

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Errors that can occur while deriving a key or constructing an entry.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The supplied fields cannot form a stable comparable key.
    #[error("invalid key: {0}")]
    InvalidKey(#[from] InvalidKey),

    /// Entry construction failed. The key remains unoccupied and a later
    /// request is allowed to attempt construction again.
    #[error("entry construction failed: {source}")]
    ConstructionFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Reasons a set of key fields is rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidKey {
    /// No fields were supplied.
    #[error("no key fields supplied")]
    Empty,

    /// A floating-point field was NaN, which has no stable equality.
    #[error("NaN is not usable as a key field")]
    NotHashable,

    /// The key has a different number of fields than this cache holds.
    #[error("expected {expected} key fields, found {found}")]
    ArityMismatch { expected: usize, found: usize },
}
