//! Pure data structures: the persisted [`Order`] record and the [`Snapshot`] the
//! store delivers.

pub mod order;
pub mod snapshot;

pub use order::*;
pub use snapshot::*;
