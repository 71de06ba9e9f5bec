//! Running sales total over the whole collection.

use crate::model::Snapshot;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SalesSummary {
    /// Sum of `price` over every record, cooking and done. Saturates at `u64::MAX`.
    pub total_yen: u64,
    pub order_count: usize,
}

pub fn summarize_sales(snapshot: &Snapshot) -> SalesSummary {
    SalesSummary {
        total_yen: snapshot
            .iter()
            .fold(0u64, |total, o| total.saturating_add(o.price)),
        order_count: snapshot.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Order, OrderStatus};
    use chrono::{DateTime, Utc};

    #[test]
    fn test_total_counts_cooking_and_done() {
        let at = DateTime::<Utc>::from_timestamp(0, 0).unwrap();
        let snapshot = Snapshot::new(vec![
            Order::new("a", "curry", 750, Some("1".into()), at),
            Order::new("b", "coffee", 400, None, at).with_status(OrderStatus::Done),
        ]);

        let sales = summarize_sales(&snapshot);
        assert_eq!(sales.total_yen, 1150);
        assert_eq!(sales.order_count, 2);
    }

    #[test]
    fn test_huge_prices_saturate_instead_of_overflowing() {
        let at = DateTime::<Utc>::from_timestamp(0, 0).unwrap();
        let snapshot = Snapshot::new(vec![
            Order::new("a", "gold leaf curry", u64::MAX, Some("1".into()), at),
            Order::new("b", "coffee", 1, Some("1".into()), at),
        ]);

        let sales = summarize_sales(&snapshot);
        assert_eq!(sales.total_yen, u64::MAX);
        assert_eq!(sales.order_count, 2);
    }

    #[test]
    fn test_empty_snapshot_has_zero_sales() {
        assert_eq!(summarize_sales(&Snapshot::empty()), SalesSummary::default());
    }
}
