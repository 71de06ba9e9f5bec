//! The order store: the [`OrderStore`] contract the engine depends on, an
//! in-memory implementation ([`StoreActor`] / [`StoreClient`]) and a
//! [`mock::MockStore`] for tests.

pub mod core;
pub mod error;
pub mod memory;
pub mod mock;

pub use self::core::*;
pub use error::*;
pub use memory::{StoreActor, StoreClient, StoreRequest};
