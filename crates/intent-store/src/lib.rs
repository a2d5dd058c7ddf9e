//! RouteStore: CRUD over routes plus substring search, backed by an
//! atomically-persisted JSON journal. All writes go through a single
//! serializing gate; reads are lock-free snapshots.

mod error;
mod journal;
mod store;

pub use error::StoreError;
pub use store::RouteStore;
