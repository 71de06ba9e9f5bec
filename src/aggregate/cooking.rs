//! Active cooking queue: `cooking` records grouped by table, then by item.

use crate::model::{OrderId, Snapshot};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

/// All `cooking` units of one item at one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveGroup {
    pub item_name: String,
    /// Member ids in `created_at` order.
    pub ids: Vec<OrderId>,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveTable {
    pub table: String,
    /// Minimum `created_at` among this table's `cooking` records.
    pub first_active_at: DateTime<Utc>,
    pub groups: Vec<ActiveGroup>,
}

impl ActiveTable {
    pub fn group(&self, item_name: &str) -> Option<&ActiveGroup> {
        self.groups.iter().find(|g| g.item_name == item_name)
    }

    pub fn unit_count(&self) -> usize {
        self.groups.iter().map(|g| g.count).sum()
    }
}

/// The derived active queue. Rebuilt from scratch for every snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CookingView {
    tables: Vec<ActiveTable>,
}

impl CookingView {
    /// Tables in order of first appearance in the snapshot.
    pub fn tables(&self) -> &[ActiveTable] {
        &self.tables
    }

    pub fn table(&self, table: &str) -> Option<&ActiveTable> {
        self.tables.iter().find(|t| t.table == table)
    }

    pub fn group(&self, table: &str, item_name: &str) -> Option<&ActiveGroup> {
        self.table(table)?.group(item_name)
    }

    /// `None` when the table has nothing cooking.
    pub fn first_active_at(&self, table: &str) -> Option<DateTime<Utc>> {
        self.table(table).map(|t| t.first_active_at)
    }

    pub fn active_ids(&self) -> impl Iterator<Item = &OrderId> {
        self.tables
            .iter()
            .flat_map(|t| t.groups.iter())
            .flat_map(|g| g.ids.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// Groups every `cooking` record of `snapshot` by table and item.
///
/// One pass, no retained state. Tables appear in order of their first active
/// record, items within a table likewise.
pub fn aggregate_cooking(snapshot: &Snapshot) -> CookingView {
    let mut tables: Vec<ActiveTable> = Vec::new();
    let mut table_index: HashMap<&str, usize> = HashMap::new();
    let mut item_index: HashMap<(usize, &str), usize> = HashMap::new();

    for order in snapshot.cooking() {
        let key = order.table_key();
        let t = *table_index.entry(key).or_insert_with(|| {
            tables.push(ActiveTable {
                table: key.to_string(),
                first_active_at: order.created_at,
                groups: Vec::new(),
            });
            tables.len() - 1
        });
        let table = &mut tables[t];
        // Snapshots are ordered, but do not rely on it for the minimum.
        if order.created_at < table.first_active_at {
            table.first_active_at = order.created_at;
        }

        let g = *item_index
            .entry((t, order.item_name.as_str()))
            .or_insert_with(|| {
                table.groups.push(ActiveGroup {
                    item_name: order.item_name.clone(),
                    ids: Vec::new(),
                    count: 0,
                });
                table.groups.len() - 1
            });
        let group = &mut table.groups[g];
        group.ids.push(order.id.clone());
        group.count += 1;
    }

    CookingView { tables }
}
