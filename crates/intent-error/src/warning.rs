#[derive(Debug, Clone, thiserror::Error)]
pub enum WarningError {
    #[error("stale diagnostics cache: {0}")]
    StaleCache(String),

    #[error("orphan point {point_id} references missing route {route_id}")]
    OrphanPoint { point_id: String, route_id: u32 },

    #[error("vector index warning: {0}")]
    IndexWarning(String),
}
