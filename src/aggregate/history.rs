//! Completed-order history: `done` records merged into (table, minute) batches.
//!
//! The minute bucket is a display merge, not an identity. Two units served to
//! the same table within the same displayed minute become one batch, and the
//! seconds that separated them are gone from the view. Keep it that way: the
//! "discard this batch" action works on exactly what the operator sees.

use crate::model::{OrderId, Snapshot};
use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;
use std::collections::HashMap;

/// Number of batches shown before the operator asks for the full list.
pub const DEFAULT_HISTORY_PAGE_SIZE: usize = 4;

/// Bucket label format, minute granularity.
pub const BUCKET_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemCount {
    pub item_name: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryBatch {
    pub table: String,
    /// Minute label in the display timezone.
    pub bucket: String,
    /// Items in first-seen order with summed counts.
    pub items: Vec<ItemCount>,
    pub ids: Vec<OrderId>,
    /// Earliest `created_at` in the batch, not a completion time. The sort key.
    pub representative_at: DateTime<Utc>,
}

impl HistoryBatch {
    pub fn count_of(&self, item_name: &str) -> usize {
        self.items
            .iter()
            .find(|i| i.item_name == item_name)
            .map_or(0, |i| i.count)
    }

    pub fn unit_count(&self) -> usize {
        self.ids.len()
    }
}

/// Which slice of the history presentation wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HistoryPage {
    Recent(usize),
    All,
}

impl Default for HistoryPage {
    fn default() -> Self {
        HistoryPage::Recent(DEFAULT_HISTORY_PAGE_SIZE)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HistoryPageView {
    pub batches: Vec<HistoryBatch>,
    /// Batches available in total, shown or not.
    pub total: usize,
    pub has_more: bool,
}

/// Every history batch, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HistoryView {
    batches: Vec<HistoryBatch>,
}

impl HistoryView {
    pub fn batches(&self) -> &[HistoryBatch] {
        &self.batches
    }

    pub fn len(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    /// A prefix of the sorted batches. Never changes the underlying data.
    pub fn page(&self, page: HistoryPage) -> HistoryPageView {
        let shown = match page {
            HistoryPage::Recent(n) => n.min(self.batches.len()),
            HistoryPage::All => self.batches.len(),
        };
        HistoryPageView {
            batches: self.batches[..shown].to_vec(),
            total: self.batches.len(),
            has_more: shown < self.batches.len(),
        }
    }
}

/// Formats `at` as a minute bucket in the display timezone.
pub fn minute_bucket(at: DateTime<Utc>, offset: FixedOffset) -> String {
    at.with_timezone(&offset).format(BUCKET_FORMAT).to_string()
}

/// Merges every `done` record of `snapshot` into (table, minute) batches.
pub fn aggregate_history(snapshot: &Snapshot, offset: FixedOffset) -> HistoryView {
    let mut batches: Vec<HistoryBatch> = Vec::new();
    let mut index: HashMap<(String, String), usize> = HashMap::new();

    for order in snapshot.done() {
        let table = order.table_key().to_string();
        let bucket = minute_bucket(order.created_at, offset);

        let b = *index.entry((table.clone(), bucket.clone())).or_insert_with(|| {
            batches.push(HistoryBatch {
                table,
                bucket,
                items: Vec::new(),
                ids: Vec::new(),
                representative_at: order.created_at,
            });
            batches.len() - 1
        });

        let batch = &mut batches[b];
        batch.ids.push(order.id.clone());
        if order.created_at < batch.representative_at {
            batch.representative_at = order.created_at;
        }
        match batch.items.iter_mut().find(|i| i.item_name == order.item_name) {
            Some(item) => item.count += 1,
            None => batch.items.push(ItemCount {
                item_name: order.item_name.clone(),
                count: 1,
            }),
        }
    }

    batches.sort_by(|a, b| {
        b.representative_at
            .cmp(&a.representative_at)
            .then_with(|| a.table.cmp(&b.table))
            .then_with(|| a.bucket.cmp(&b.bucket))
    });

    HistoryView { batches }
}
