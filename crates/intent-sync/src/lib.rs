//! Synchronizer: reconciles a RouteStore snapshot with VectorIndex content.
//! Runs after the RouteStore write lock is released, under its own lock;
//! idempotent, so coalescing adjacent writes into one sync run is safe.

mod error;
mod synchronizer;

pub use error::SyncError;
pub use synchronizer::{BATCH_SIZE, SyncMode, SyncReport, Synchronizer};
