//! # Urgency Clock
//!
//! Elapsed time per active table, recomputed on a periodic tick without
//! touching stored data. [`UrgencyClock`] produces the ticks; [`assess`] turns a
//! [`CookingView`] and an instant into an [`UrgencyBoard`].

use crate::aggregate::CookingView;
use crate::clock::Clock;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{self, Interval, MissedTickBehavior};
use tracing::{debug, trace};

/// Elapsed time at which a table is flagged.
pub const DEFAULT_URGENCY_THRESHOLD: Duration = Duration::from_secs(10 * 60);

/// Default tick period.
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_secs(1);

/// Periodic tick source. Must be created inside a Tokio runtime.
pub struct UrgencyClock {
    interval: Option<Interval>,
    clock: Arc<dyn Clock>,
}

impl UrgencyClock {
    /// The first tick fires one `period` from now. Late ticks are skipped, not
    /// replayed in a burst.
    pub fn new(period: Duration, clock: Arc<dyn Clock>) -> Self {
        let mut interval = time::interval_at(time::Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        debug!(?period, "Urgency clock started");
        Self {
            interval: Some(interval),
            clock,
        }
    }

    /// Waits for the next tick and returns the clock's "now".
    ///
    /// Returns `None` immediately once the clock is stopped.
    pub async fn tick(&mut self) -> Option<DateTime<Utc>> {
        let interval = self.interval.as_mut()?;
        interval.tick().await;
        let now = self.clock.now();
        trace!(%now, "Tick");
        Some(now)
    }

    /// The clock's "now" without waiting for a tick.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Stops ticking for good.
    pub fn stop(&mut self) {
        if self.interval.take().is_some() {
            debug!("Urgency clock stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.interval.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableTiming {
    pub table: String,
    pub first_active_at: DateTime<Utc>,
    pub elapsed_minutes: u64,
    /// Seconds past the whole minute, 0..60.
    pub elapsed_seconds: u64,
    pub urgent: bool,
}

/// Timing of every active table at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UrgencyBoard {
    pub assessed_at: DateTime<Utc>,
    pub tables: Vec<TableTiming>,
}

impl UrgencyBoard {
    pub fn table(&self, table: &str) -> Option<&TableTiming> {
        self.tables.iter().find(|t| t.table == table)
    }

    pub fn urgent_tables(&self) -> impl Iterator<Item = &TableTiming> {
        self.tables.iter().filter(|t| t.urgent)
    }
}

/// Elapsed time and urgency for every table in `view`, as of `now`.
///
/// A first-active timestamp in the future counts as zero elapsed.
pub fn assess(view: &CookingView, now: DateTime<Utc>, threshold: Duration) -> UrgencyBoard {
    let tables = view
        .tables()
        .iter()
        .map(|table| {
            let elapsed = (now - table.first_active_at)
                .to_std()
                .unwrap_or(Duration::ZERO);
            let secs = elapsed.as_secs();
            TableTiming {
                table: table.table.clone(),
                first_active_at: table.first_active_at,
                elapsed_minutes: secs / 60,
                elapsed_seconds: secs % 60,
                urgent: elapsed >= threshold,
            }
        })
        .collect();

    UrgencyBoard {
        assessed_at: now,
        tables,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate_cooking;
    use crate::clock::ManualClock;
    use crate::model::{Order, Snapshot};

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_700_000_000 + secs, 0).unwrap()
    }

    fn view_with(table: &str, created: i64) -> CookingView {
        aggregate_cooking(&Snapshot::new(vec![Order::new(
            "a",
            "curry",
            750,
            Some(table.to_string()),
            at(created),
        )]))
    }

    #[test]
    fn test_exactly_ten_minutes_is_urgent() {
        let view = view_with("5", 0);

        let board = assess(&view, at(600), DEFAULT_URGENCY_THRESHOLD);
        let timing = board.table("5").unwrap();
        assert!(timing.urgent);
        assert_eq!((timing.elapsed_minutes, timing.elapsed_seconds), (10, 0));
    }

    #[test]
    fn test_nine_fifty_nine_is_not_urgent() {
        let view = view_with("5", 0);

        let board = assess(&view, at(599), DEFAULT_URGENCY_THRESHOLD);
        let timing = board.table("5").unwrap();
        assert!(!timing.urgent);
        assert_eq!((timing.elapsed_minutes, timing.elapsed_seconds), (9, 59));
        assert_eq!(board.urgent_tables().count(), 0);
    }

    #[test]
    fn test_future_timestamp_clamps_to_zero() {
        let view = view_with("5", 30);

        let board = assess(&view, at(0), DEFAULT_URGENCY_THRESHOLD);
        let timing = board.table("5").unwrap();
        assert_eq!((timing.elapsed_minutes, timing.elapsed_seconds), (0, 0));
        assert!(!timing.urgent);
    }

    #[test]
    fn test_empty_view_yields_empty_board() {
        let board = assess(&CookingView::default(), at(0), DEFAULT_URGENCY_THRESHOLD);
        assert!(board.tables.is_empty());
        assert_eq!(board.assessed_at, at(0));
    }

    #[tokio::test]
    async fn test_tick_reports_injected_time() {
        let clock = ManualClock::new(at(0));
        let mut ticker = UrgencyClock::new(Duration::from_millis(5), Arc::new(clock.clone()));

        clock.set(at(42));
        assert_eq!(ticker.tick().await, Some(at(42)));
        assert!(ticker.is_running());
    }

    #[tokio::test]
    async fn test_stopped_clock_yields_nothing() {
        let clock = ManualClock::new(at(0));
        let mut ticker = UrgencyClock::new(Duration::from_millis(5), Arc::new(clock));

        ticker.stop();
        assert!(!ticker.is_running());
        assert_eq!(ticker.tick().await, None);
    }
}
