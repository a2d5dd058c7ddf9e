use intent_embed::EmbedError;
use intent_error::{DomainError, Error as HubError};
use intent_index::DbError;

#[derive(Debug, Clone, thiserror::Error)]
pub enum RagError {
    #[error("embedding error: {0}")]
    Embed(#[from] EmbedError),

    #[error("vector index error: {0}")]
    Index(#[from] DbError),

    #[error("validation error: {0}")]
    Validation(String),
}

impl From<RagError> for HubError {
    fn from(value: RagError) -> HubError {
        match value {
            RagError::Embed(e) => e.into(),
            RagError::Index(e) => e.into(),
            RagError::Validation(message) => HubError::from(DomainError::Validation { message }),
        }
    }
}
