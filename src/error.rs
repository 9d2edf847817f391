//! Error types for the `bucketmap` crate

use std::collections::TryReserveError;
use std::fmt;

/// Errors returned by map operations.
///
/// A missing key is not an error; lookups report it as `Ok(None)`.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The primary table must hold at least one bucket.
    #[error("primary capacity must be greater than zero")]
    ZeroCapacity,

    /// A map was created without a hash function.
    #[error("no hash function supplied")]
    MissingHasher,

    /// Keys are non-empty byte strings.
    #[error("key must not be empty")]
    EmptyKey,

    /// Growing the primary table, a bucket or the rehash scratch buffer
    /// failed. The map is left as it was before the call.
    #[error("allocation failed: {0}")]
    Alloc(#[from] TryReserveError),
}

impl Error {
    /// Whether the caller passed something the map can never accept.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Error::ZeroCapacity | Error::MissingHasher | Error::EmptyKey)
    }
}

/// A rejected [`set`](crate::BucketMap::set), handing the value back.
pub struct InsertError<V> {
    pub error: Error,
    pub value: V,
}

impl<V> InsertError<V> {
    /// Discard the error, keeping the value.
    pub fn into_value(self) -> V {
        self.value
    }
}

impl<V> fmt::Debug for InsertError<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InsertError")
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl<V> fmt::Display for InsertError<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "insert rejected: {}", self.error)
    }
}

impl<V> std::error::Error for InsertError<V> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}
