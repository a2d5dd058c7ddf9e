use thiserror::Error;

use intent_core::RouteId;

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("route {0} not found")]
    NotFound(RouteId),

    #[error("{0}")]
    Validation(String),

    #[error("route journal at {path} could not be written: {message}")]
    JournalWrite { path: String, message: String },

    #[error("route journal at {path} could not be read: {message}")]
    JournalRead { path: String, message: String },
}

impl From<StoreError> for intent_error::Error {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound(id) => {
                intent_error::Error::Domain(intent_error::DomainError::NotFound {
                    message: format!("route {id} not found"),
                })
            }
            StoreError::Validation(message) => {
                intent_error::Error::Domain(intent_error::DomainError::Validation { message })
            }
            StoreError::JournalWrite { message, .. } => {
                intent_error::Error::Fatal(intent_error::FatalError::JournalCorruption(message))
            }
            StoreError::JournalRead { message, .. } => {
                intent_error::Error::Fatal(intent_error::FatalError::JournalCorruption(message))
            }
        }
    }
}
