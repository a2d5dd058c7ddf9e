#[derive(Debug, Clone, thiserror::Error)]
pub enum FatalError {
    #[error("route journal corrupted: {0}")]
    JournalCorruption(String),

    #[error("vector index is unrecoverable: {0}")]
    IndexCorruption(String),
}
