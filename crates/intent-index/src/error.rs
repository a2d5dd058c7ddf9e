use intent_error::{DomainError, Error as HubError, WarningError};

#[derive(Debug, Clone, thiserror::Error)]
pub enum DbError {
    #[error("cozo engine error: {0}")]
    Cozo(String),

    #[error("query construction failed: {0}")]
    QueryConstruction(String),

    #[error("query execution failed: {0}")]
    QueryExecution(String),

    #[error("invalid vector: {0}")]
    VectorConversion(String),

    #[error("point {0} not found")]
    NotFound(String),
}

/// Treats a cozo "not found" response for a missing HNSW index as a warning
/// rather than an error: the index is created lazily on first `upsert`, so a
/// fresh `VectorIndex` legitimately has none yet.
pub fn run_script_warn(result: Result<(), String>, context: &str) -> Result<(), HubError> {
    match result {
        Ok(()) => Ok(()),
        Err(message) if message.contains("not found") => {
            Err(HubError::from(WarningError::IndexWarning(format!(
                "{context}: {message}"
            ))))
        }
        Err(message) => Err(HubError::from(DomainError::BackendUnavailable {
            backend: "vector_index".to_string(),
            message: format!("{context}: {message}"),
        })),
    }
}

impl From<DbError> for HubError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound(message) => HubError::from(DomainError::NotFound { message }),
            DbError::VectorConversion(message) | DbError::QueryConstruction(message) => {
                HubError::from(DomainError::Validation { message })
            }
            DbError::Cozo(message) | DbError::QueryExecution(message) => {
                HubError::from(DomainError::BackendUnavailable {
                    backend: "vector_index".to_string(),
                    message,
                })
            }
        }
    }
}
