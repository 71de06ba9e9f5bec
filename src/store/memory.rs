//! # In-Memory Order Store
//!
//! A single-task stand-in for the document store. It owns the collection and
//! processes requests *sequentially*, so a batch is atomic simply because
//! nothing else runs while it is applied. Every committed change is published
//! to subscribers as a full snapshot over a `watch` channel.
//!
//! ```rust,ignore
//! let (actor, store) = StoreActor::new(32, Arc::new(SystemClock));
//! tokio::spawn(actor.run());
//!
//! let ids = store.place_order(OrderCreate::for_table("5", lines)).await?;
//! let receipt = store.atomic_batch(vec![BatchOp::MarkDone(ids[0].clone())]).await?;
//! ```

use super::core::{BatchOp, BatchReceipt, OrderStore, Subscription};
use super::error::StoreError;
use crate::clock::Clock;
use crate::model::{Order, OrderCreate, OrderId, OrderStatus, Snapshot};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, instrument, warn};

/// Type alias for the one-shot response channel used by the store.
pub type Response<T> = oneshot::Sender<Result<T, StoreError>>;

/// Requests processed by the [`StoreActor`].
#[derive(Debug)]
pub enum StoreRequest {
    Place {
        order: OrderCreate,
        respond_to: Response<Vec<OrderId>>,
    },
    Batch {
        ops: Vec<BatchOp>,
        respond_to: Response<BatchReceipt>,
    },
    Subscribe {
        respond_to: Response<Subscription>,
    },
    /// Make the next batch fail with `error` without touching any record.
    FailNextBatch {
        error: StoreError,
        respond_to: Response<()>,
    },
}

/// The server half of the in-memory store.
///
/// Owns the records (kept sorted by `created_at`) and the id counter. Ids are
/// `order_<n>` with `n` strictly increasing, so a deleted id never comes back.
pub struct StoreActor {
    receiver: mpsc::Receiver<StoreRequest>,
    orders: Vec<Order>,
    next_id: u64,
    snapshots: watch::Sender<Snapshot>,
    clock: Arc<dyn Clock>,
    armed_failure: Option<StoreError>,
}

impl StoreActor {
    /// Creates the store and its client.
    ///
    /// # Arguments
    ///
    /// * `buffer_size` - Capacity of the request channel.
    /// * `clock` - Source of `created_at` stamps.
    pub fn new(buffer_size: usize, clock: Arc<dyn Clock>) -> (Self, StoreClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let (snapshots, _) = watch::channel(Snapshot::empty());
        let actor = Self {
            receiver,
            orders: Vec::new(),
            next_id: 1,
            snapshots,
            clock,
            armed_failure: None,
        };
        (actor, StoreClient::new(sender))
    }

    /// Runs the store loop until every client is dropped.
    pub async fn run(mut self) {
        info!("Order store started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                StoreRequest::Place { order, respond_to } => {
                    debug!(?order, "Place");
                    let result = self.place(order);
                    match &result {
                        Ok(ids) => info!(units = ids.len(), size = self.orders.len(), "Placed"),
                        Err(e) => warn!(error = %e, "Place failed"),
                    }
                    let _ = respond_to.send(result);
                }
                StoreRequest::Batch { ops, respond_to } => {
                    debug!(ops = ops.len(), "Batch");
                    let result = self.apply_batch(ops);
                    match &result {
                        Ok(receipt) => info!(
                            applied = receipt.applied.len(),
                            skipped = receipt.skipped.len(),
                            size = self.orders.len(),
                            "Batch committed"
                        ),
                        Err(e) => warn!(error = %e, "Batch failed"),
                    }
                    let _ = respond_to.send(result);
                }
                StoreRequest::Subscribe { respond_to } => {
                    debug!(subscribers = self.snapshots.receiver_count(), "Subscribe");
                    let _ = respond_to.send(Ok(Subscription::new(self.snapshots.subscribe())));
                }
                StoreRequest::FailNextBatch { error, respond_to } => {
                    warn!(%error, "Next batch will fail");
                    self.armed_failure = Some(error);
                    let _ = respond_to.send(Ok(()));
                }
            }
        }

        info!(size = self.orders.len(), "Order store shutdown");
    }

    fn place(&mut self, order: OrderCreate) -> Result<Vec<OrderId>, StoreError> {
        if order.unit_count() == 0 {
            return Err(StoreError::InvalidOrder("order has no units".into()));
        }
        if let Some(line) = order.lines.iter().find(|l| l.item_name.trim().is_empty()) {
            return Err(StoreError::InvalidOrder(format!(
                "line with price {} has no item name",
                line.price
            )));
        }

        let created_at = self.clock.now();
        let mut ids = Vec::with_capacity(order.unit_count());
        for line in &order.lines {
            for _ in 0..line.quantity {
                let id = OrderId(format!("order_{}", self.next_id));
                self.next_id += 1;
                let record = Order::new(
                    id.clone(),
                    line.item_name.clone(),
                    line.price,
                    order.table_no.clone(),
                    created_at,
                );
                // Keep the collection ordered by created_at even if the clock
                // went backwards; equal stamps keep insertion order.
                let pos = self.orders.partition_point(|o| o.created_at <= created_at);
                self.orders.insert(pos, record);
                ids.push(id);
            }
        }
        self.publish();
        Ok(ids)
    }

    fn apply_batch(&mut self, ops: Vec<BatchOp>) -> Result<BatchReceipt, StoreError> {
        if let Some(error) = self.armed_failure.take() {
            return Err(error);
        }

        let mut receipt = BatchReceipt::default();
        for op in ops {
            match op {
                BatchOp::MarkDone(id) => {
                    match self.orders.iter_mut().find(|o| o.id == id) {
                        Some(order) if order.status == OrderStatus::Cooking => {
                            order.status = OrderStatus::Done;
                            receipt.applied.push(id);
                        }
                        _ => receipt.skipped.push(id),
                    }
                }
                BatchOp::Delete(id) => match self.orders.iter().position(|o| o.id == id) {
                    Some(pos) => {
                        self.orders.remove(pos);
                        receipt.applied.push(id);
                    }
                    None => receipt.skipped.push(id),
                },
            }
        }

        if !receipt.is_noop() {
            self.publish();
        }
        Ok(receipt)
    }

    fn publish(&self) {
        self.snapshots.send_replace(Snapshot::new(self.orders.clone()));
    }
}

/// Client for the in-memory store. Cheap to clone.
#[derive(Clone)]
pub struct StoreClient {
    sender: mpsc::Sender<StoreRequest>,
}

impl StoreClient {
    pub fn new(sender: mpsc::Sender<StoreRequest>) -> Self {
        Self { sender }
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(Response<T>) -> StoreRequest,
    ) -> Result<T, StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| StoreError::Closed)?;
        response.await.map_err(|_| StoreError::Closed)?
    }

    /// Writes one `cooking` record per ordered unit, all or nothing.
    #[instrument(skip(self, order), fields(table = ?order.table_no, units = order.unit_count()))]
    pub async fn place_order(&self, order: OrderCreate) -> Result<Vec<OrderId>, StoreError> {
        debug!("Sending request");
        self.request(|respond_to| StoreRequest::Place { order, respond_to })
            .await
    }

    /// The collection as of now.
    pub async fn snapshot(&self) -> Result<Snapshot, StoreError> {
        Ok(OrderStore::subscribe(self).await?.current())
    }

    /// Arms a one-shot failure: the next batch returns `error` and applies nothing.
    #[instrument(skip(self))]
    pub async fn fail_next_batch(&self, error: StoreError) -> Result<(), StoreError> {
        self.request(|respond_to| StoreRequest::FailNextBatch { error, respond_to })
            .await
    }
}

#[async_trait]
impl OrderStore for StoreClient {
    async fn subscribe(&self) -> Result<Subscription, StoreError> {
        self.request(|respond_to| StoreRequest::Subscribe { respond_to })
            .await
    }

    #[instrument(skip(self, ops), fields(ops = ops.len()))]
    async fn atomic_batch(&self, ops: Vec<BatchOp>) -> Result<BatchReceipt, StoreError> {
        debug!("Sending request");
        self.request(|respond_to| StoreRequest::Batch { ops, respond_to })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::model::OrderLine;
    use chrono::{DateTime, Duration, Utc};

    fn start_store() -> (StoreClient, ManualClock) {
        let clock = ManualClock::new(DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap());
        let (actor, client) = StoreActor::new(16, Arc::new(clock.clone()));
        tokio::spawn(actor.run());
        (client, clock)
    }

    #[tokio::test]
    async fn test_place_order_writes_one_record_per_unit() {
        let (store, _clock) = start_store();

        let ids = store
            .place_order(OrderCreate::for_table(
                "5",
                vec![OrderLine::new("curry", 750, 3), OrderLine::new("pancake", 900, 1)],
            ))
            .await
            .unwrap();
        assert_eq!(ids.len(), 4);

        let snapshot = store.snapshot().await.unwrap();
        assert_eq!(snapshot.len(), 4);
        assert!(snapshot.iter().all(|o| o.is_cooking()));
        assert_eq!(snapshot.iter().filter(|o| o.item_name == "curry").count(), 3);
    }

    #[tokio::test]
    async fn test_place_order_rejects_empty_payload() {
        let (store, _clock) = start_store();

        let result = store.place_order(OrderCreate::for_table("1", vec![])).await;
        assert!(matches!(result, Err(StoreError::InvalidOrder(_))));

        let result = store
            .place_order(OrderCreate::for_table("1", vec![OrderLine::new(" ", 100, 1)]))
            .await;
        assert!(matches!(result, Err(StoreError::InvalidOrder(_))));
        assert!(store.snapshot().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_snapshot_stays_ordered_when_clock_goes_back() {
        let (store, clock) = start_store();

        store
            .place_order(OrderCreate::for_table("1", vec![OrderLine::new("late", 100, 1)]))
            .await
            .unwrap();
        clock.advance(Duration::seconds(-30));
        store
            .place_order(OrderCreate::for_table("2", vec![OrderLine::new("early", 100, 1)]))
            .await
            .unwrap();

        let snapshot = store.snapshot().await.unwrap();
        let names: Vec<_> = snapshot.iter().map(|o| o.item_name.as_str()).collect();
        assert_eq!(names, ["early", "late"]);
    }

    #[tokio::test]
    async fn test_batch_skips_stale_ids() {
        let (store, _clock) = start_store();
        let ids = store
            .place_order(OrderCreate::for_table("5", vec![OrderLine::new("curry", 750, 2)]))
            .await
            .unwrap();

        let receipt = store
            .atomic_batch(vec![
                BatchOp::MarkDone(ids[0].clone()),
                BatchOp::MarkDone(OrderId::from("order_404")),
            ])
            .await
            .unwrap();
        assert_eq!(receipt.applied, vec![ids[0].clone()]);
        assert_eq!(receipt.skipped, vec![OrderId::from("order_404")]);

        // Completing again changes nothing.
        let again = store
            .atomic_batch(vec![BatchOp::MarkDone(ids[0].clone())])
            .await
            .unwrap();
        assert!(again.is_noop());
    }

    #[tokio::test]
    async fn test_armed_failure_applies_nothing() {
        let (store, _clock) = start_store();
        let ids = store
            .place_order(OrderCreate::for_table("5", vec![OrderLine::new("curry", 750, 2)]))
            .await
            .unwrap();
        let before = store.snapshot().await.unwrap();

        store
            .fail_next_batch(StoreError::Transport("link down".into()))
            .await
            .unwrap();
        let result = store
            .atomic_batch(ids.iter().cloned().map(BatchOp::Delete).collect())
            .await;
        assert_eq!(result, Err(StoreError::Transport("link down".into())));
        assert_eq!(store.snapshot().await.unwrap(), before);

        // The failure is one-shot.
        let receipt = store
            .atomic_batch(ids.iter().cloned().map(BatchOp::Delete).collect())
            .await
            .unwrap();
        assert_eq!(receipt.applied.len(), 2);
    }

    #[tokio::test]
    async fn test_deleted_ids_are_not_reused() {
        let (store, _clock) = start_store();
        let first = store
            .place_order(OrderCreate::takeout(vec![OrderLine::new("coffee", 400, 1)]))
            .await
            .unwrap();
        store
            .atomic_batch(vec![BatchOp::Delete(first[0].clone())])
            .await
            .unwrap();
        let second = store
            .place_order(OrderCreate::takeout(vec![OrderLine::new("coffee", 400, 1)]))
            .await
            .unwrap();
        assert_ne!(first[0], second[0]);
    }

    #[tokio::test]
    async fn test_client_reports_closed_store() {
        let clock = ManualClock::new(DateTime::<Utc>::from_timestamp(0, 0).unwrap());
        let (actor, client) = StoreActor::new(4, Arc::new(clock));
        drop(actor);

        let result = client.atomic_batch(vec![]).await;
        assert_eq!(result, Err(StoreError::Closed));
    }
}
