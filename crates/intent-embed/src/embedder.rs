use futures::future::BoxFuture;
use intent_core::Vector;

use crate::config::{EmbedderConfig, EmbedderProvider};
use crate::error::EmbedError;
use crate::local::LocalEmbedder;
use crate::providers::hugging_face::HuggingFaceBackend;

/// Turns a batch of utterances into fixed-dimension unit vectors.
///
/// `embed` processes its whole batch atomically: a failure anywhere in the
/// batch fails the whole call, it never returns a partial result.
pub trait Embedder: Send + Sync {
    fn embed<'a>(&'a self, texts: &'a [String]) -> BoxFuture<'a, Result<Vec<Vector>, EmbedError>>;

    /// Fixed output dimension `D`, shared by every vector this embedder produces.
    fn dim(&self) -> usize;
}

/// Provider-variant dispatch over the concrete embedding backends.
pub enum EmbedderBackend {
    Local(LocalEmbedder),
    HuggingFaceApi(HuggingFaceBackend),
}

impl EmbedderBackend {
    pub fn from_config(config: &EmbedderConfig) -> Result<Self, EmbedError> {
        match config.provider {
            EmbedderProvider::Local => Ok(EmbedderBackend::Local(LocalEmbedder::new(config)?)),
            EmbedderProvider::Api => {
                let token = config.huggingface_access_token.clone().ok_or_else(|| {
                    EmbedError::InvalidInput(
                        "HUGGINGFACE_ACCESS_TOKEN is required when HUGGINGFACE_PROVIDER=api".to_string(),
                    )
                })?;
                Ok(EmbedderBackend::HuggingFaceApi(HuggingFaceBackend::new(
                    config.model_name.clone(),
                    token,
                    config.dimensions,
                )))
            }
        }
    }
}

impl Embedder for EmbedderBackend {
    fn embed<'a>(&'a self, texts: &'a [String]) -> BoxFuture<'a, Result<Vec<Vector>, EmbedError>> {
        match self {
            EmbedderBackend::Local(backend) => backend.embed(texts),
            EmbedderBackend::HuggingFaceApi(backend) => backend.embed(texts),
        }
    }

    fn dim(&self) -> usize {
        match self {
            EmbedderBackend::Local(backend) => backend.dim(),
            EmbedderBackend::HuggingFaceApi(backend) => backend.dim(),
        }
    }
}
