//! # Store Contract
//!
//! The boundary between the engine and whatever document store holds the
//! orders. The engine only needs two things from it:
//!
//! - [`OrderStore::subscribe`]: a [`Subscription`] yielding the *complete*
//!   collection, ordered by `created_at`, every time anything changes.
//! - [`OrderStore::atomic_batch`]: apply a list of [`BatchOp`]s all-or-nothing.
//!
//! Retry, reconnection and persistence belong to the implementation, not to
//! the engine.

use super::error::StoreError;
use crate::model::{OrderId, Snapshot};
use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::watch;

/// One document mutation inside an atomic batch.
///
/// There is deliberately no way to move a record back to `cooking`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum BatchOp {
    MarkDone(OrderId),
    Delete(OrderId),
}

impl BatchOp {
    pub fn id(&self) -> &OrderId {
        match self {
            BatchOp::MarkDone(id) | BatchOp::Delete(id) => id,
        }
    }
}

/// What a committed batch actually did.
///
/// `skipped` holds ids that were already in the target state (already `done`,
/// already deleted). Concurrent stations make that normal, so it is not an
/// error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReceipt {
    pub applied: Vec<OrderId>,
    pub skipped: Vec<OrderId>,
}

impl BatchReceipt {
    pub fn is_noop(&self) -> bool {
        self.applied.is_empty()
    }
}

/// A live feed of full snapshots.
///
/// Dropping the subscription (or calling [`Subscription::unsubscribe`])
/// releases it.
#[derive(Debug)]
pub struct Subscription {
    receiver: watch::Receiver<Snapshot>,
}

impl Subscription {
    pub fn new(receiver: watch::Receiver<Snapshot>) -> Self {
        Self { receiver }
    }

    /// The snapshot as of now, without waiting.
    pub fn current(&self) -> Snapshot {
        self.receiver.borrow().clone()
    }

    /// Waits for the next snapshot. `None` once the store side is gone.
    pub async fn changed(&mut self) -> Option<Snapshot> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }

    pub fn unsubscribe(self) {}
}

/// Trait the engine uses to reach the order collection.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Subscribe to full, `created_at`-ordered snapshots.
    async fn subscribe(&self) -> Result<Subscription, StoreError>;

    /// Apply every op or none of them.
    async fn atomic_batch(&self, ops: Vec<BatchOp>) -> Result<BatchReceipt, StoreError>;
}
