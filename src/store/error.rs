//! Error types for the order store.

use thiserror::Error;

/// Errors that can occur while talking to the order store.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    /// The store could not be reached; nothing was applied.
    #[error("Store transport error: {0}")]
    Transport(String),

    /// The store refused the whole batch; nothing was applied.
    #[error("Batch rejected: {0}")]
    Rejected(String),

    /// The order payload is invalid (empty item name, no units).
    #[error("Invalid order: {0}")]
    InvalidOrder(String),

    /// The store task has shut down.
    #[error("Store closed")]
    Closed,
}
