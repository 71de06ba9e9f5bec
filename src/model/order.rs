//! Represents one ordered unit.
//!
//! A customer ordering three curries produces three `Order` records, so each unit
//! can be completed or discarded on its own while the aggregators regroup them
//! for display.
//!
//! See [`OrderCreate`] for the placement payload and [`OrderStatus`] for the
//! lifecycle.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Table key used when a record carries no table number.
pub const UNKNOWN_TABLE: &str = "unknown";

/// Table number used for orders that leave the restaurant.
pub const TAKEOUT_TABLE: &str = "takeout";

/// Store-assigned identifier for Orders.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub String);

impl OrderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for OrderId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for OrderId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kitchen status of a single unit. Only ever moves `Cooking -> Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Cooking,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub item_name: String,
    /// Unit price in yen.
    pub price: u64,
    pub table_no: Option<String>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Creates a new `cooking` Order.
    ///
    /// # Arguments
    /// * `id` - Unique identifier (assigned by the store)
    /// * `item_name` - Display name of the ordered item
    /// * `price` - Unit price in yen
    /// * `table_no` - Table number, `"takeout"`, or `None` when unknown
    /// * `created_at` - Store timestamp
    pub fn new(
        id: impl Into<OrderId>,
        item_name: impl Into<String>,
        price: u64,
        table_no: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            item_name: item_name.into(),
            price,
            table_no,
            status: OrderStatus::Cooking,
            created_at,
        }
    }

    /// Builder-style status override, mostly for fixtures.
    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = status;
        self
    }

    /// The grouping key for this record's table.
    ///
    /// Missing or blank table numbers fall back to [`UNKNOWN_TABLE`] so every
    /// stored record stays visible.
    pub fn table_key(&self) -> &str {
        match self.table_no.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => t,
            _ => UNKNOWN_TABLE,
        }
    }

    pub fn is_cooking(&self) -> bool {
        self.status == OrderStatus::Cooking
    }

    pub fn is_done(&self) -> bool {
        self.status == OrderStatus::Done
    }
}

/// One line of a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub item_name: String,
    pub price: u64,
    pub quantity: u32,
}

impl OrderLine {
    pub fn new(item_name: impl Into<String>, price: u64, quantity: u32) -> Self {
        Self {
            item_name: item_name.into(),
            price,
            quantity,
        }
    }
}

/// Payload for placing an order: one table, many lines.
///
/// The store expands every line into `quantity` independent records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCreate {
    pub table_no: Option<String>,
    pub lines: Vec<OrderLine>,
}

impl OrderCreate {
    pub fn for_table(table_no: impl Into<String>, lines: Vec<OrderLine>) -> Self {
        Self {
            table_no: Some(table_no.into()),
            lines,
        }
    }

    pub fn takeout(lines: Vec<OrderLine>) -> Self {
        Self::for_table(TAKEOUT_TABLE, lines)
    }

    /// Number of records this payload produces.
    pub fn unit_count(&self) -> usize {
        self.lines.iter().map(|l| l.quantity as usize).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(secs, 0).unwrap()
    }

    #[test]
    fn test_table_key_falls_back_to_unknown() {
        let missing = Order::new("a", "curry", 750, None, at(0));
        let blank = Order::new("b", "curry", 750, Some("  ".into()), at(0));
        let set = Order::new("c", "curry", 750, Some("5".into()), at(0));

        assert_eq!(missing.table_key(), UNKNOWN_TABLE);
        assert_eq!(blank.table_key(), UNKNOWN_TABLE);
        assert_eq!(set.table_key(), "5");
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&OrderStatus::Cooking).unwrap();
        assert_eq!(json, "\"cooking\"");
        let back: OrderStatus = serde_json::from_str("\"done\"").unwrap();
        assert_eq!(back, OrderStatus::Done);
    }

    #[test]
    fn test_unit_count_sums_quantities() {
        let create = OrderCreate::takeout(vec![
            OrderLine::new("omelette rice", 850, 2),
            OrderLine::new("iced coffee", 400, 3),
        ]);
        assert_eq!(create.unit_count(), 5);
        assert_eq!(create.table_no.as_deref(), Some(TAKEOUT_TABLE));
    }
}
