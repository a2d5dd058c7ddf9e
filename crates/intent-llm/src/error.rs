use thiserror::Error;

/// Failure modes of an LLMAdvisor call. Always propagated to the caller;
/// advisor calls are never on the critical path of prediction, so a
/// `ProviderError` here never blocks a route mutation.
#[derive(Debug, Clone, Error)]
pub enum LlmError {
    #[error("network request to LLM provider failed: {message}")]
    Request {
        message: String,
        url: Option<String>,
        is_timeout: bool,
    },

    #[error("LLM provider returned an error (status {status}): {message}")]
    Api {
        status: u16,
        message: String,
        body_snippet: Option<String>,
    },

    #[error("failed to parse LLM response: {message}")]
    Deserialization {
        message: String,
        body_snippet: Option<String>,
    },

    #[error("invalid advisor request: {0}")]
    Validation(String),
}

impl From<LlmError> for intent_error::Error {
    fn from(error: LlmError) -> Self {
        match error {
            LlmError::Request { message, .. } | LlmError::Api { message, .. } => {
                intent_error::Error::Domain(intent_error::DomainError::BackendUnavailable {
                    backend: "llm".to_string(),
                    message,
                })
            }
            LlmError::Deserialization { message, .. } => {
                intent_error::Error::Domain(intent_error::DomainError::BackendUnavailable {
                    backend: "llm".to_string(),
                    message,
                })
            }
            LlmError::Validation(message) => {
                intent_error::Error::Domain(intent_error::DomainError::Validation { message })
            }
        }
    }
}

/// Truncates large response bodies so error strings remain bounded.
pub(crate) fn truncate_for_error(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        let head = &s[..max.saturating_sub(200)];
        let tail = &s[s.len().saturating_sub(200)..];
        format!("{head}…<snip>…{tail}")
    }
}
