//! # View Composer
//!
//! [`compose`] merges the derived views into the [`KitchenView`] read model.
//! It computes nothing of its own. [`ViewClient`] is how presentation reads it.

pub mod client;

pub use client::{ViewClient, ViewRequest};

use crate::aggregate::{
    ActiveGroup, CookingView, HistoryPage, HistoryPageView, HistoryView, SalesSummary,
};
use crate::urgency::UrgencyBoard;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One table in the active queue, with its timing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveTableView {
    pub table: String,
    pub groups: Vec<ActiveGroup>,
    pub elapsed_minutes: u64,
    pub elapsed_seconds: u64,
    pub urgent: bool,
}

/// Everything the kitchen screen shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KitchenView {
    pub assessed_at: DateTime<Utc>,
    pub active: Vec<ActiveTableView>,
    pub history_page: HistoryPage,
    pub history: HistoryPageView,
    pub sales: SalesSummary,
}

impl KitchenView {
    pub fn empty(at: DateTime<Utc>) -> Self {
        Self {
            assessed_at: at,
            active: Vec::new(),
            history_page: HistoryPage::default(),
            history: HistoryPageView::default(),
            sales: SalesSummary::default(),
        }
    }

    pub fn table(&self, table: &str) -> Option<&ActiveTableView> {
        self.active.iter().find(|t| t.table == table)
    }

    pub fn group(&self, table: &str, item_name: &str) -> Option<&ActiveGroup> {
        self.table(table)?
            .groups
            .iter()
            .find(|g| g.item_name == item_name)
    }
}

pub fn compose(
    cooking: &CookingView,
    urgency: &UrgencyBoard,
    history: &HistoryView,
    page: HistoryPage,
    sales: SalesSummary,
) -> KitchenView {
    let active = cooking
        .tables()
        .iter()
        .map(|table| {
            let timing = urgency.table(&table.table);
            ActiveTableView {
                table: table.table.clone(),
                groups: table.groups.clone(),
                elapsed_minutes: timing.map_or(0, |t| t.elapsed_minutes),
                elapsed_seconds: timing.map_or(0, |t| t.elapsed_seconds),
                urgent: timing.is_some_and(|t| t.urgent),
            }
        })
        .collect();

    KitchenView {
        assessed_at: urgency.assessed_at,
        active,
        history_page: page,
        history: history.page(page),
        sales,
    }
}
