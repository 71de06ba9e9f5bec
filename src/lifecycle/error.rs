//! Error types for starting and stopping the kitchen system.

use crate::config::ConfigError;
use crate::store::StoreError;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SystemError {
    /// The store refused the subscription.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The dispatch loop is gone.
    #[error("View channel closed")]
    ViewClosed,

    /// The dispatch task panicked or was cancelled.
    #[error("Dispatch task failed: {0}")]
    TaskFailed(String),
}
