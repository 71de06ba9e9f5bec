//! Pure derivations over a [`Snapshot`](crate::model::Snapshot).
//!
//! Nothing here keeps state between calls: every view is rebuilt from the
//! snapshot it is given.

pub mod cooking;
pub mod history;
pub mod sales;

pub use cooking::{aggregate_cooking, ActiveGroup, ActiveTable, CookingView};
pub use history::{
    aggregate_history, minute_bucket, HistoryBatch, HistoryPage, HistoryPageView, HistoryView,
    ItemCount, DEFAULT_HISTORY_PAGE_SIZE,
};
pub use sales::{summarize_sales, SalesSummary};
