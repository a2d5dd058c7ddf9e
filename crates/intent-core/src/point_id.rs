use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Deterministic identity for a `(route_id, utterance)` pair.
///
/// Re-embedding the same utterance for the same route always produces the
/// same id, so independent `Synchronizer` runs agree on point identity
/// without coordinating with each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointId(pub Uuid);

impl PointId {
    /// Hashes `(route_id, utterance)` into a 128-bit point id.
    ///
    /// The route id and utterance are separated by a zero byte that cannot
    /// appear in the little-endian encoding of a route id, so `(1, "23")`
    /// and `(12, "3")` never collide.
    pub fn new(route_id: u32, utterance: &str) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&route_id.to_le_bytes());
        hasher.update(&[0u8]);
        hasher.update(utterance.as_bytes());
        let hash = hasher.finalize();
        let bytes: [u8; 16] = hash.as_bytes()[..16]
            .try_into()
            .expect("blake3 digest is 32 bytes");
        Self(Uuid::from_bytes(bytes))
    }
}

impl std::fmt::Display for PointId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_pair_hashes_equal() {
        assert_eq!(
            PointId::new(7, "how is the weather"),
            PointId::new(7, "how is the weather")
        );
    }

    #[test]
    fn different_routes_do_not_collide() {
        assert_ne!(
            PointId::new(1, "23"),
            PointId::new(12, "3")
        );
    }

    #[test]
    fn different_utterance_hashes_differ() {
        assert_ne!(
            PointId::new(7, "how is the weather"),
            PointId::new(7, "what is the weather")
        );
    }
}
