//! # Batch Mutator
//!
//! Group transitions and group deletions, each sent to the store as one
//! atomic batch. The mutator never edits a snapshot locally: the store's next
//! snapshot is the only way a change becomes visible.
//!
//! ```rust,ignore
//! let outcome = mutator.complete_group(&group.ids).await?;
//! if outcome.is_noop() {
//!     // another station got there first
//! }
//! ```

pub mod error;

pub use error::MutationError;

use crate::model::OrderId;
use crate::store::{BatchOp, BatchReceipt, OrderStore};
use crate::stream::SnapshotReader;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// What a mutation did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MutationOutcome {
    /// Distinct ids sent to the store.
    pub requested: usize,
    pub receipt: BatchReceipt,
}

impl MutationOutcome {
    pub fn applied(&self) -> &[OrderId] {
        &self.receipt.applied
    }

    /// Ids that were already in the target state.
    pub fn skipped(&self) -> &[OrderId] {
        &self.receipt.skipped
    }

    /// True when nothing changed in the store.
    pub fn is_noop(&self) -> bool {
        self.receipt.is_noop()
    }
}

/// Issues atomic group mutations. Cheap to clone.
#[derive(Clone)]
pub struct BatchMutator {
    store: Arc<dyn OrderStore>,
    snapshots: SnapshotReader,
}

impl BatchMutator {
    pub fn new(store: Arc<dyn OrderStore>, snapshots: SnapshotReader) -> Self {
        Self { store, snapshots }
    }

    /// Marks every id `done`. Ids already `done` or gone are skipped.
    #[instrument(skip(self, ids), fields(ids = ids.len()))]
    pub async fn complete_group(&self, ids: &[OrderId]) -> Result<MutationOutcome, MutationError> {
        self.run_batch("complete_group", ids.iter().cloned(), BatchOp::MarkDone)
            .await
    }

    /// Deletes every id, typically the members of one history batch.
    #[instrument(skip(self, ids), fields(ids = ids.len()))]
    pub async fn delete_group(&self, ids: &[OrderId]) -> Result<MutationOutcome, MutationError> {
        self.run_batch("delete_group", ids.iter().cloned(), BatchOp::Delete)
            .await
    }

    /// Deletes every `done` record of the latest snapshot as of this call.
    #[instrument(skip(self))]
    pub async fn delete_all_done(&self) -> Result<MutationOutcome, MutationError> {
        let ids = self.snapshots.latest().done_ids();
        debug!(done = ids.len(), "Collected done records");
        self.run_batch("delete_all_done", ids, BatchOp::Delete)
            .await
    }

    async fn run_batch(
        &self,
        operation: &'static str,
        ids: impl IntoIterator<Item = OrderId>,
        op: fn(OrderId) -> BatchOp,
    ) -> Result<MutationOutcome, MutationError> {
        let mut seen = HashSet::new();
        let ops: Vec<BatchOp> = ids
            .into_iter()
            .filter(|id| seen.insert(id.clone()))
            .map(op)
            .collect();

        if ops.is_empty() {
            debug!(operation, "Nothing to do");
            return Ok(MutationOutcome::default());
        }

        let requested = ops.len();
        match self.store.atomic_batch(ops).await {
            Ok(receipt) => {
                if !receipt.skipped.is_empty() {
                    warn!(
                        operation,
                        skipped = receipt.skipped.len(),
                        "Some ids were already handled"
                    );
                }
                info!(
                    operation,
                    requested,
                    applied = receipt.applied.len(),
                    "Batch applied"
                );
                Ok(MutationOutcome { requested, receipt })
            }
            Err(e) => {
                warn!(operation, requested, error = %e, "Batch failed");
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Order, OrderStatus};
    use crate::store::mock::MockStore;
    use crate::store::StoreError;
    use crate::stream::OrderStream;
    use chrono::{DateTime, Utc};

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_700_000_000 + secs, 0).unwrap()
    }

    async fn mutator_for(mock: &MockStore) -> (BatchMutator, OrderStream) {
        let stream = OrderStream::attach(mock).await.unwrap();
        let mutator = BatchMutator::new(Arc::new(mock.clone()), stream.reader());
        (mutator, stream)
    }

    fn ids(raw: &[&str]) -> Vec<OrderId> {
        raw.iter().map(|s| OrderId::from(*s)).collect()
    }

    #[tokio::test]
    async fn test_complete_group_sends_one_batch() {
        let mock = MockStore::new();
        let (mutator, _stream) = mutator_for(&mock).await;
        mock.expect_batch().return_ok(BatchReceipt {
            applied: ids(&["a", "b"]),
            skipped: vec![],
        });

        let outcome = mutator.complete_group(&ids(&["a", "b", "a"])).await.unwrap();

        assert_eq!(outcome.requested, 2);
        assert_eq!(outcome.applied(), ids(&["a", "b"]).as_slice());
        assert_eq!(
            mock.recorded_batches(),
            vec![vec![
                BatchOp::MarkDone(OrderId::from("a")),
                BatchOp::MarkDone(OrderId::from("b")),
            ]]
        );
        mock.verify();
    }

    #[tokio::test]
    async fn test_empty_group_never_reaches_store() {
        let mock = MockStore::new();
        let (mutator, _stream) = mutator_for(&mock).await;

        let outcome = mutator.delete_group(&[]).await.unwrap();

        assert!(outcome.is_noop());
        assert!(mock.recorded_batches().is_empty());
    }

    #[tokio::test]
    async fn test_stale_ids_are_reported_not_failed() {
        let mock = MockStore::new();
        let (mutator, _stream) = mutator_for(&mock).await;
        mock.expect_batch().return_ok(BatchReceipt {
            applied: vec![],
            skipped: ids(&["a"]),
        });

        let outcome = mutator.complete_group(&ids(&["a"])).await.unwrap();

        assert!(outcome.is_noop());
        assert_eq!(outcome.skipped(), ids(&["a"]).as_slice());
    }

    #[tokio::test]
    async fn test_transport_failure_surfaces_as_error() {
        let mock = MockStore::new();
        let (mutator, _stream) = mutator_for(&mock).await;
        mock.expect_batch()
            .return_err(StoreError::Transport("offline".into()));

        let result = mutator.delete_group(&ids(&["a"])).await;

        assert_eq!(result, Err(MutationError::Transport("offline".into())));
        mock.verify();
    }

    #[tokio::test]
    async fn test_delete_all_done_uses_latest_snapshot() {
        let mock = MockStore::new();
        mock.publish(vec![
            Order::new("a", "curry", 750, Some("5".into()), at(0)),
            Order::new("b", "curry", 750, Some("5".into()), at(1)).with_status(OrderStatus::Done),
            Order::new("c", "tea", 300, None, at(2)).with_status(OrderStatus::Done),
        ]);
        let (mutator, _stream) = mutator_for(&mock).await;
        mock.expect_batch().return_ok(BatchReceipt {
            applied: ids(&["b", "c"]),
            skipped: vec![],
        });

        let outcome = mutator.delete_all_done().await.unwrap();

        assert_eq!(outcome.requested, 2);
        assert_eq!(
            mock.recorded_batches(),
            vec![vec![
                BatchOp::Delete(OrderId::from("b")),
                BatchOp::Delete(OrderId::from("c")),
            ]]
        );
        mock.verify();
    }
}
