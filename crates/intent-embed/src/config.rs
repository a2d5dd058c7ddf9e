use serde::{Deserialize, Serialize};

/// Which embedding backend to bind. Selected by `HUGGINGFACE_PROVIDER` at
/// config load: `local` runs a BERT-family encoder in-process; `api` calls
/// the Hugging Face Inference API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbedderProvider {
    Local,
    Api,
}

impl Default for EmbedderProvider {
    fn default() -> Self {
        EmbedderProvider::Local
    }
}

/// Configuration for the bound `Embedder`. Mirrors the
/// `EMBEDDING_MODEL_NAME` / `EMBEDDING_DEVICE` / `HUGGINGFACE_ACCESS_TOKEN` /
/// `HUGGINGFACE_PROVIDER` settings keys; a reload that changes `model_name`
/// or `provider` changes the declared dimension and forces a full reindex.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedderConfig {
    pub provider: EmbedderProvider,
    pub model_name: String,
    pub device: String,
    pub huggingface_access_token: Option<String>,
    pub batch_size: usize,
    /// Declared output dimension for the `api` provider, which cannot be
    /// probed locally. Ignored by the `local` provider, which reads the
    /// dimension out of the loaded model's own config.
    pub dimensions: usize,
}

impl Default for EmbedderConfig {
    fn default() -> Self {
        Self {
            provider: EmbedderProvider::Local,
            model_name: "sentence-transformers/all-MiniLM-L6-v2".to_string(),
            device: "cpu".to_string(),
            huggingface_access_token: None,
            batch_size: 32,
            dimensions: 384,
        }
    }
}
