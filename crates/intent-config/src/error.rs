use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load settings: {0}")]
    Load(String),

    #[error("failed to persist settings to {path}: {message}")]
    Persist { path: String, message: String },
}

impl From<ConfigError> for intent_error::Error {
    fn from(error: ConfigError) -> Self {
        match error {
            ConfigError::Load(message) => {
                intent_error::Error::Domain(intent_error::DomainError::Config { message })
            }
            ConfigError::Persist { message, .. } => {
                intent_error::Error::Domain(intent_error::DomainError::Config { message })
            }
        }
    }
}
