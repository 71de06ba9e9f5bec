//! # Kitchen Board
//!
//! An order aggregation and lifecycle engine for a restaurant kitchen.
//!
//! Orders arrive as one record per ordered unit in a document store. The engine
//! consumes the store's live snapshot feed and keeps two derived views current:
//! the **active queue** (what is still cooking, grouped by table and item) and
//! the **history** (what is done, grouped by table and minute). Kitchen staff
//! act on whole groups, and every group action is a single atomic store batch.
//!
//! ## Data flow
//!
//! ```text
//! OrderStore ──snapshots──▶ OrderStream ──▶ aggregate::{cooking, history, sales}
//!      ▲                                              │
//!      │                          UrgencyClock ──▶ urgency::assess
//!      │                                              │
//! BatchMutator ◀── presentation ◀── ViewClient ◀── view::compose
//! ```
//!
//! Nothing is mutated locally. A completed group disappears from the active
//! queue only when the store's next snapshot says so.
//!
//! ## Module Tour
//!
//! - [`model`]: the persisted [`Order`](model::Order) record and [`Snapshot`](model::Snapshot).
//! - [`store`]: the [`OrderStore`](store::OrderStore) contract, an in-memory
//!   store and a [`MockStore`](store::mock::MockStore) for tests.
//! - [`stream`]: the latest snapshot as the single source of truth.
//! - [`aggregate`]: pure derivations from a snapshot.
//! - [`urgency`]: per-table elapsed time, driven by a periodic tick.
//! - [`mutator`]: atomic group completion and deletion.
//! - [`view`]: the composed read model and its client.
//! - [`lifecycle`]: the dispatch loop, startup and shutdown, logging setup.
//! - [`config`]: environment-driven settings.
//!
//! ## Testing
//!
//! Unit tests sit next to the code. `tests/` holds two integration suites: the
//! whole system against the in-memory store, and the mutator against the mock.
//! Time is driven with [`ManualClock`](clock::ManualClock).

pub mod aggregate;
pub mod clock;
pub mod config;
pub mod lifecycle;
pub mod model;
pub mod mutator;
pub mod store;
pub mod stream;
pub mod urgency;
pub mod view;
