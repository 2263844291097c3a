use std::error::Error as StdError;

use thiserror::Error;

/// The error taxonomy every storage backend surfaces through
/// [`crate::SpanReader`]/[`crate::SpanWriter`] and friends.
///
/// A `#[non_exhaustive]` enum with named buckets for the well-understood
/// failure modes and a boxed catch-all for everything a backend driver
/// might surface that doesn't fit one.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum StorageError {
    /// The requested entity does not exist. Not logged at error level —
    /// this is an expected, common outcome.
    #[error("trace not found")]
    NotFound,

    /// The caller's query was malformed (missing service name, inverted
    /// time range, negative `num_traces`, ...).
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// The backend itself failed: RPC timeout, connection refused, quota
    /// exhausted, schema mismatch, corrupted record. Distinguishing
    /// transient-vs-fatal is left to the wrapped error and to the retry
    /// policy that lives above this crate.
    #[error("storage backend error: {0}")]
    Backend(#[source] Box<dyn StdError + Send + Sync + 'static>),

    /// This backend does not implement the requested capability (e.g. an
    /// archive reader on a backend with no archive namespace). A
    /// distinguishable sentinel so callers can degrade gracefully instead
    /// of treating it as a failure.
    #[error("unsupported capability: {0}")]
    Unsupported(&'static str),

    /// A catch-all for errors that don't fit the buckets above, kept for
    /// forward compatibility the same way `TraceError::Other` is.
    #[error(transparent)]
    Other(#[from] Box<dyn StdError + Send + Sync + 'static>),
}

impl StorageError {
    /// Wrap a backend driver error as [`StorageError::Backend`].
    pub fn backend(err: impl StdError + Send + Sync + 'static) -> Self {
        StorageError::Backend(Box::new(err))
    }
}

/// Convenience alias used throughout the storage contract.
pub type StorageResult<T> = Result<T, StorageError>;
