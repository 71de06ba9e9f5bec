//! Immutable, ordered view of the whole order collection.

use super::order::{Order, OrderId};
use std::sync::Arc;

/// The complete set of orders as delivered by one store notification.
///
/// Records are ordered ascending by `created_at`. Cloning is cheap: the records
/// live behind an `Arc` and are never mutated after construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    orders: Arc<[Order]>,
}

impl Snapshot {
    pub fn new(orders: Vec<Order>) -> Self {
        Self {
            orders: orders.into(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn iter(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn get(&self, id: &OrderId) -> Option<&Order> {
        self.orders.iter().find(|o| &o.id == id)
    }

    pub fn cooking(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter().filter(|o| o.is_cooking())
    }

    pub fn done(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter().filter(|o| o.is_done())
    }

    /// Ids of every `done` record, in snapshot order.
    pub fn done_ids(&self) -> Vec<OrderId> {
        self.done().map(|o| o.id.clone()).collect()
    }
}

impl From<Vec<Order>> for Snapshot {
    fn from(orders: Vec<Order>) -> Self {
        Self::new(orders)
    }
}
