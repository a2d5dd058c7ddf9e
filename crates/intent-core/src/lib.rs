//! Shared value types for the Intent Hub workspace: identities, vectors, and
//! the small constants every other crate agrees on.

mod arc_str;
mod point_id;
mod route;

pub use arc_str::ArcStr;
pub use point_id::PointId;
pub use route::Route;

/// Identity of a stored route. `0` is reserved for the synthetic fallback
/// route ("none") and is never assigned to a stored route; `RouteStore`
/// auto-assigns `max(existing) + 1` when a caller creates a route with id 0.
pub type RouteId = u32;

/// Route id reserved for the synthetic fallback route returned when no
/// stored route is admitted.
pub const DEFAULT_ROUTE_ID: RouteId = 0;

/// Display name of the synthetic fallback route.
pub const DEFAULT_ROUTE_NAME: &str = "none";

/// A fixed-dimension, L2-normalized embedding vector.
pub type Vector = Vec<f32>;

/// Cosine similarity score. Callers treat stored vectors as unit-length, so
/// this is equivalently a dot product.
pub type Score = f32;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_route_id_is_zero() {
        assert_eq!(DEFAULT_ROUTE_ID, 0);
    }
}
