#[derive(Debug, Clone, thiserror::Error)]
pub enum InternalError {
    #[error("unexpected internal state: {0}")]
    InvalidState(String),

    #[error("not implemented: {0}")]
    NotImplemented(String),
}
