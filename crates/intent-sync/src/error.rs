use thiserror::Error;

use intent_embed::EmbedError;
use intent_index::DbError;

#[derive(Debug, Clone, Error)]
pub enum SyncError {
    #[error(transparent)]
    Embed(#[from] EmbedError),

    #[error(transparent)]
    Index(#[from] DbError),

    #[error("operation cancelled")]
    Cancelled,
}

impl From<SyncError> for intent_error::Error {
    fn from(error: SyncError) -> Self {
        match error {
            SyncError::Embed(e) => {
                intent_error::Error::Domain(intent_error::DomainError::BackendUnavailable {
                    backend: "embedder".to_string(),
                    message: e.to_string(),
                })
            }
            SyncError::Index(e) => {
                intent_error::Error::Domain(intent_error::DomainError::BackendUnavailable {
                    backend: "vector_index".to_string(),
                    message: e.to_string(),
                })
            }
            SyncError::Cancelled => {
                intent_error::Error::Domain(intent_error::DomainError::Cancelled)
            }
        }
    }
}
