//! Error types for the batch mutator.

use crate::store::StoreError;
use thiserror::Error;

/// Errors returned by [`BatchMutator`](super::BatchMutator) operations.
///
/// Every variant means the batch applied nothing.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MutationError {
    /// The store could not be reached.
    #[error("Store transport error: {0}")]
    Transport(String),

    /// The store refused the batch as a whole.
    #[error("Batch rejected: {0}")]
    Rejected(String),

    /// The store task has shut down.
    #[error("Store closed")]
    StoreClosed,
}

impl From<StoreError> for MutationError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Transport(msg) => MutationError::Transport(msg),
            StoreError::Rejected(msg) | StoreError::InvalidOrder(msg) => {
                MutationError::Rejected(msg)
            }
            StoreError::Closed => MutationError::StoreClosed,
        }
    }
}
