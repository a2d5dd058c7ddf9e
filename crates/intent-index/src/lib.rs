pub mod error;
pub mod points;
mod schema;

pub use error::DbError;
pub use points::{PointRecord, SearchHit, VectorIndex};
