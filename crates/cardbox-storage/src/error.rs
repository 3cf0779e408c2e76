//! Storage error types.

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// No document matched the filter.
    #[error("no documents in result")]
    NotFound,

    /// A stored document could not be decoded into a card.
    #[error("decode error: {0}")]
    Decode(String),

    /// The backend rejected or failed the operation.
    #[error("{0}")]
    Backend(String),

    /// The operation exceeded its time budget.
    #[error("store operation timed out")]
    Timeout,
}

/// The store could not be reached at startup.
///
/// The underlying cause is logged and dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Connect to db failed")]
pub struct ConnectionError;
