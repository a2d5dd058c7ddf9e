use futures::future::BoxFuture;
use intent_core::Vector;
use reqwest::Client;
use serde::Serialize;

use crate::error::EmbedError;
use crate::Embedder;

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    inputs: &'a [String],
}

/// Calls the Hugging Face Inference API's feature-extraction task.
///
/// The response is a nested array of per-text embeddings, e.g.
/// `[[-0.1, 0.2, ...], [-0.3, 0.4, ...]]`; the API does not guarantee unit
/// norm, so every vector is re-normalized before it leaves this backend.
pub struct HuggingFaceBackend {
    client: Client,
    model: String,
    api_token: String,
    dim: usize,
}

impl HuggingFaceBackend {
    pub fn new(model: String, api_token: String, dim: usize) -> Self {
        Self {
            client: Client::new(),
            model,
            api_token,
            dim,
        }
    }
}

impl Embedder for HuggingFaceBackend {
    fn embed<'a>(&'a self, texts: &'a [String]) -> BoxFuture<'a, Result<Vec<Vector>, EmbedError>> {
        Box::pin(async move {
            if texts.is_empty() || texts.iter().any(|t| t.trim().is_empty()) {
                return Err(EmbedError::InvalidInput("empty text".to_string()));
            }

            let url = format!("https://api-inference.huggingface.co/models/{}", self.model);
            let response = self
                .client
                .post(&url)
                .bearer_auth(&self.api_token)
                .json(&EmbeddingRequest { inputs: texts })
                .send()
                .await
                .map_err(|e| EmbedError::TransientUnavailable(e.to_string()))?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                return Err(EmbedError::TransientUnavailable(format!(
                    "huggingface inference api returned {status}: {body}"
                )));
            }

            let vectors: Vec<Vector> = response
                .json()
                .await
                .map_err(|e| EmbedError::BatchFailed(e.to_string()))?;

            for v in &vectors {
                if v.len() != self.dim {
                    return Err(EmbedError::DimensionMismatch {
                        expected: self.dim,
                        actual: v.len(),
                    });
                }
            }

            Ok(vectors.into_iter().map(l2_normalize).collect())
        })
    }

    fn dim(&self) -> usize {
        self.dim
    }
}

fn l2_normalize(mut v: Vector) -> Vector {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in &mut v {
            *x /= norm;
        }
    }
    v
}
