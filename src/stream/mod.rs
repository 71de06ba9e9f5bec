//! # Order Stream Adapter
//!
//! Turns a store [`Subscription`] into the single source of truth for the
//! engine: the latest [`Snapshot`]. Dependents that only need to *read* the
//! latest snapshot (the batch mutator computing `delete_all_done`) hold a
//! [`SnapshotReader`]; the dispatch loop drives [`OrderStream::next`].
//!
//! The adapter never retries. If the subscription ends, `next` returns `None`
//! and the last snapshot stays readable.

use crate::model::Snapshot;
use crate::store::{OrderStore, StoreError, Subscription};
use tokio::sync::watch;
use tracing::{debug, info};

/// Cloneable read handle on the latest snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotReader {
    receiver: watch::Receiver<Snapshot>,
}

impl SnapshotReader {
    pub fn latest(&self) -> Snapshot {
        self.receiver.borrow().clone()
    }
}

pub struct OrderStream {
    subscription: Option<Subscription>,
    latest: watch::Sender<Snapshot>,
}

impl OrderStream {
    /// Subscribes to `store` and seeds the stream with its current snapshot.
    pub async fn attach<S: OrderStore + ?Sized>(store: &S) -> Result<Self, StoreError> {
        let subscription = store.subscribe().await?;
        Ok(Self::from_subscription(subscription))
    }

    pub fn from_subscription(subscription: Subscription) -> Self {
        let seed = subscription.current();
        info!(size = seed.len(), "Order stream attached");
        let (latest, _) = watch::channel(seed);
        Self {
            subscription: Some(subscription),
            latest,
        }
    }

    /// Waits for the next snapshot change and makes it the latest.
    ///
    /// Returns `None` once the stream is closed or the store side went away.
    pub async fn next(&mut self) -> Option<Snapshot> {
        let subscription = self.subscription.as_mut()?;
        match subscription.changed().await {
            Some(snapshot) => {
                debug!(size = snapshot.len(), "Snapshot received");
                self.latest.send_replace(snapshot.clone());
                Some(snapshot)
            }
            None => {
                info!("Order subscription ended");
                self.subscription = None;
                None
            }
        }
    }

    pub fn latest(&self) -> Snapshot {
        self.latest.borrow().clone()
    }

    pub fn reader(&self) -> SnapshotReader {
        SnapshotReader {
            receiver: self.latest.subscribe(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.subscription.is_some()
    }

    /// Releases the subscription. The latest snapshot stays readable.
    pub fn close(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
            info!("Order stream closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Order;
    use crate::store::mock::MockStore;
    use chrono::{DateTime, Utc};

    fn order(id: &str) -> Order {
        Order::new(
            id,
            "curry",
            750,
            Some("5".into()),
            DateTime::<Utc>::from_timestamp(0, 0).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_stream_tracks_latest_snapshot() {
        let store = MockStore::new();
        store.publish(vec![order("a")]);

        let mut stream = OrderStream::attach(&store).await.unwrap();
        let reader = stream.reader();
        assert_eq!(stream.latest().len(), 1);

        store.publish(vec![order("a"), order("b")]);
        let next = stream.next().await.unwrap();
        assert_eq!(next.len(), 2);
        assert_eq!(reader.latest().len(), 2);
    }

    #[tokio::test]
    async fn test_closed_stream_yields_nothing() {
        let store = MockStore::new();
        let mut stream = OrderStream::attach(&store).await.unwrap();

        stream.close();
        store.publish(vec![order("a")]);

        assert!(!stream.is_open());
        assert!(stream.next().await.is_none());
        assert!(stream.latest().is_empty());
    }

    #[tokio::test]
    async fn test_stream_ends_when_store_goes_away() {
        let store = MockStore::new();
        let mut stream = OrderStream::attach(&store).await.unwrap();
        drop(store);

        assert!(stream.next().await.is_none());
        assert!(!stream.is_open());
    }

    #[tokio::test]
    async fn test_attach_surfaces_transport_error() {
        let store = MockStore::new();
        store
            .expect_subscribe()
            .return_err(StoreError::Transport("offline".into()));

        let result = OrderStream::attach(&store).await;
        assert!(matches!(result, Err(StoreError::Transport(_))));
    }
}
