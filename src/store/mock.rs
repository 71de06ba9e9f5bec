//! # Mock Store
//!
//! Utilities for testing code that talks to an [`OrderStore`] without running
//! the in-memory store task.
//!
//! | Feature | MockStore | StoreActor |
//! |---------|-----------|------------|
//! | **State** | None (expectations) | Real records |
//! | **Snapshots** | Whatever you [`publish`](MockStore::publish) | Derived from writes |
//! | **Error Injection** | Any error, any batch | One-shot `fail_next_batch` |
//!
//! ```rust,ignore
//! let mock = MockStore::new();
//! mock.publish(vec![order_a, order_b]);
//! mock.expect_batch().return_ok(BatchReceipt { applied, skipped: vec![] });
//!
//! let mutator = BatchMutator::new(Arc::new(mock.clone()), reader);
//! mutator.complete_group(&ids).await?;
//!
//! mock.verify(); // every expectation consumed
//! ```

use super::core::{BatchOp, BatchReceipt, OrderStore, Subscription};
use super::error::StoreError;
use crate::model::{Order, Snapshot};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

/// An expected call to the mock store.
enum Expectation {
    Batch {
        response: Result<BatchReceipt, StoreError>,
    },
    Subscribe {
        response: Result<(), StoreError>,
    },
}

/// A fake store with expectation tracking. Clones share state.
///
/// `subscribe` succeeds without an expectation unless one was queued with
/// [`MockStore::expect_subscribe`]; `atomic_batch` panics without one.
#[derive(Clone)]
pub struct MockStore {
    snapshots: Arc<watch::Sender<Snapshot>>,
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
    recorded: Arc<Mutex<Vec<Vec<BatchOp>>>>,
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MockStore {
    /// Creates a mock store with an empty snapshot and no expectations.
    pub fn new() -> Self {
        let (snapshots, _) = watch::channel(Snapshot::empty());
        Self {
            snapshots: Arc::new(snapshots),
            expectations: Arc::new(Mutex::new(VecDeque::new())),
            recorded: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Pushes a new snapshot to every subscriber.
    pub fn publish(&self, orders: Vec<Order>) {
        self.snapshots.send_replace(Snapshot::new(orders));
    }

    /// Expects an `atomic_batch` call.
    pub fn expect_batch(&self) -> BatchExpectationBuilder {
        BatchExpectationBuilder {
            expectations: self.expectations.clone(),
        }
    }

    /// Expects a `subscribe` call.
    pub fn expect_subscribe(&self) -> SubscribeExpectationBuilder {
        SubscribeExpectationBuilder {
            expectations: self.expectations.clone(),
        }
    }

    /// Every batch received so far, in call order.
    pub fn recorded_batches(&self) -> Vec<Vec<BatchOp>> {
        self.recorded.lock().unwrap().clone()
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let exps = self.expectations.lock().unwrap();
        if !exps.is_empty() {
            panic!("Not all expectations were met. {} remaining", exps.len());
        }
    }

    fn pop_subscribe_expectation(&self) -> Option<Result<(), StoreError>> {
        let mut exps = self.expectations.lock().unwrap();
        match exps.front() {
            Some(Expectation::Subscribe { .. }) => match exps.pop_front() {
                Some(Expectation::Subscribe { response }) => Some(response),
                _ => None,
            },
            _ => None,
        }
    }
}

#[async_trait]
impl OrderStore for MockStore {
    async fn subscribe(&self) -> Result<Subscription, StoreError> {
        if let Some(response) = self.pop_subscribe_expectation() {
            response?;
        }
        Ok(Subscription::new(self.snapshots.subscribe()))
    }

    async fn atomic_batch(&self, ops: Vec<BatchOp>) -> Result<BatchReceipt, StoreError> {
        self.recorded.lock().unwrap().push(ops);
        let expectation = self.expectations.lock().unwrap().pop_front();
        match expectation {
            Some(Expectation::Batch { response }) => response,
            _ => panic!("Unexpected batch or expectation mismatch"),
        }
    }
}

/// Builder for `atomic_batch` expectations.
pub struct BatchExpectationBuilder {
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
}

impl BatchExpectationBuilder {
    /// Sets the expectation to return a successful receipt.
    pub fn return_ok(self, receipt: BatchReceipt) {
        let mut exps = self.expectations.lock().unwrap();
        exps.push_back(Expectation::Batch {
            response: Ok(receipt),
        });
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: StoreError) {
        let mut exps = self.expectations.lock().unwrap();
        exps.push_back(Expectation::Batch {
            response: Err(error),
        });
    }
}

/// Builder for `subscribe` expectations.
pub struct SubscribeExpectationBuilder {
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
}

impl SubscribeExpectationBuilder {
    pub fn return_ok(self) {
        let mut exps = self.expectations.lock().unwrap();
        exps.push_back(Expectation::Subscribe { response: Ok(()) });
    }

    pub fn return_err(self, error: StoreError) {
        let mut exps = self.expectations.lock().unwrap();
        exps.push_back(Expectation::Subscribe {
            response: Err(error),
        });
    }
}
