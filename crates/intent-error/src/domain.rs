#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, thiserror::Error)]
pub enum DomainError {
    #[error("validation failed: {message}")]
    Validation { message: String },

    #[error("not found: {message}")]
    NotFound { message: String },

    #[error("authentication failed: {message}")]
    Auth { message: String },

    #[error("{backend} is unavailable: {message}")]
    BackendUnavailable { backend: String, message: String },

    #[error("conflicting state: {message}")]
    ConflictState { message: String },

    #[error("operation cancelled")]
    Cancelled,

    #[error("invalid configuration: {message}")]
    Config { message: String },
}
