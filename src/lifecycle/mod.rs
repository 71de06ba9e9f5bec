//! Wiring and lifecycle: [`KitchenSystem`] starts the dispatch [`engine`] and
//! shuts it down.

pub mod engine;
pub mod error;
pub mod kitchen_system;
pub mod tracing;

pub use engine::{Engine, EngineSettings};
pub use error::SystemError;
pub use kitchen_system::KitchenSystem;
