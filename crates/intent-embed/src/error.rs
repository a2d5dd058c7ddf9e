use intent_error::{DomainError, Error as HubError, InternalError};

/// Failure modes for an `Embedder` call. A batch either fully succeeds or
/// fully fails, so callers never see a partially-embedded batch.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EmbedError {
    #[error("embedding backend unavailable: {0}")]
    TransientUnavailable(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid embedding dimension: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("embedding batch failed: {0}")]
    BatchFailed(String),
}

impl From<EmbedError> for HubError {
    fn from(e: EmbedError) -> Self {
        match e {
            EmbedError::TransientUnavailable(message) => HubError::from(DomainError::BackendUnavailable {
                backend: "embedder".to_string(),
                message,
            }),
            EmbedError::InvalidInput(message) => HubError::from(DomainError::Validation { message }),
            EmbedError::DimensionMismatch { expected, actual } => HubError::from(InternalError::InvalidState(
                format!("embedding dimension mismatch: expected {expected}, got {actual}"),
            )),
            EmbedError::BatchFailed(message) => HubError::from(DomainError::BackendUnavailable {
                backend: "embedder".to_string(),
                message,
            }),
        }
    }
}
