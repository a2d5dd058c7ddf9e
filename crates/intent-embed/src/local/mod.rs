use candle_core::{DType, Device, IndexOp, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use futures::future::BoxFuture;
use hf_hub::{api::sync::Api, Repo, RepoType};
use intent_core::Vector;
use tokenizers::{PaddingParams, Tokenizer};

use crate::config::EmbedderConfig;
use crate::error::EmbedError;
use crate::Embedder;

/// Embeds utterances in-process with a BERT-family sentence encoder.
///
/// Embeddings are mean-pooled over the attention mask, then L2-normalized,
/// so every vector this backend produces is a unit vector in the model's
/// hidden dimension.
pub struct LocalEmbedder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    dim: usize,
}

impl LocalEmbedder {
    pub fn new(config: &EmbedderConfig) -> Result<Self, EmbedError> {
        let device = match config.device.as_str() {
            "cuda" => {
                Device::cuda_if_available(0).map_err(|e| EmbedError::TransientUnavailable(e.to_string()))?
            }
            _ => Device::Cpu,
        };

        let api = Api::new().map_err(|e| EmbedError::TransientUnavailable(e.to_string()))?;
        let repo = api.repo(Repo::new(config.model_name.clone(), RepoType::Model));

        let config_path = repo
            .get("config.json")
            .map_err(|e| EmbedError::TransientUnavailable(e.to_string()))?;
        let bert_config: BertConfig = serde_json::from_str(
            &std::fs::read_to_string(config_path).map_err(|e| EmbedError::TransientUnavailable(e.to_string()))?,
        )
        .map_err(|e| EmbedError::TransientUnavailable(e.to_string()))?;

        let mut tokenizer = Tokenizer::from_file(
            repo.get("tokenizer.json")
                .map_err(|e| EmbedError::TransientUnavailable(e.to_string()))?,
        )
        .map_err(|e| EmbedError::TransientUnavailable(e.to_string()))?;
        tokenizer.with_padding(Some(PaddingParams {
            pad_to_multiple_of: 8,
            ..Default::default()
        }));

        let weights_path = repo
            .get("model.safetensors")
            .map_err(|e| EmbedError::TransientUnavailable(e.to_string()))?;
        let vb = VarBuilder::from_safetensors(vec![weights_path], DType::F32, &device)
            .map_err(|e| EmbedError::TransientUnavailable(e.to_string()))?;
        let model =
            BertModel::load(vb, &bert_config).map_err(|e| EmbedError::TransientUnavailable(e.to_string()))?;

        Ok(Self {
            model,
            tokenizer,
            device,
            dim: bert_config.hidden_size,
        })
    }

    fn embed_batch_sync(&self, texts: &[String]) -> Result<Vec<Vector>, EmbedError> {
        let borrowed: Vec<&str> = texts.iter().map(String::as_str).collect();
        let tokens = self
            .tokenizer
            .encode_batch(borrowed, true)
            .map_err(|e| EmbedError::BatchFailed(e.to_string()))?;

        let token_ids: Vec<Tensor> = tokens
            .iter()
            .map(|t| Tensor::new(t.get_ids(), &self.device))
            .collect::<candle_core::Result<_>>()
            .map_err(|e| EmbedError::BatchFailed(e.to_string()))?;
        let attention_mask: Vec<Tensor> = tokens
            .iter()
            .map(|t| Tensor::new(t.get_attention_mask(), &self.device))
            .collect::<candle_core::Result<_>>()
            .map_err(|e| EmbedError::BatchFailed(e.to_string()))?;

        let token_ids = Tensor::stack(&token_ids, 0).map_err(|e| EmbedError::BatchFailed(e.to_string()))?;
        let attention_mask = Tensor::stack(&attention_mask, 0)
            .and_then(|t| t.to_dtype(DType::F32))
            .map_err(|e| EmbedError::BatchFailed(e.to_string()))?;

        let outputs = self
            .model
            .forward(&token_ids, &attention_mask)
            .map_err(|e| EmbedError::BatchFailed(e.to_string()))?;

        let weights = attention_mask
            .broadcast_as(outputs.shape())
            .map_err(|e| EmbedError::BatchFailed(e.to_string()))?;
        let sum_embeddings = (&outputs * &weights)
            .and_then(|t| t.sum_keepdim(1))
            .map_err(|e| EmbedError::BatchFailed(e.to_string()))?;
        let sum_weights = weights
            .sum_keepdim(1)
            .and_then(|t| t.clamp(1e-9, f32::MAX))
            .map_err(|e| EmbedError::BatchFailed(e.to_string()))?;
        let pooled = (sum_embeddings / sum_weights).map_err(|e| EmbedError::BatchFailed(e.to_string()))?;

        let norm = pooled
            .sqr()
            .and_then(|t| t.sum_keepdim(1))
            .and_then(|t| t.sqrt())
            .map_err(|e| EmbedError::BatchFailed(e.to_string()))?;
        let normalized = pooled
            .broadcast_div(&norm)
            .map_err(|e| EmbedError::BatchFailed(e.to_string()))?;

        let mut results = Vec::with_capacity(texts.len());
        for i in 0..texts.len() {
            let row = normalized.i((i, ..)).map_err(|e| EmbedError::BatchFailed(e.to_string()))?;
            results.push(row.to_vec1::<f32>().map_err(|e| EmbedError::BatchFailed(e.to_string()))?);
        }
        Ok(results)
    }
}

impl Embedder for LocalEmbedder {
    fn embed<'a>(&'a self, texts: &'a [String]) -> BoxFuture<'a, Result<Vec<Vector>, EmbedError>> {
        Box::pin(async move {
            if texts.is_empty() || texts.iter().any(|t| t.trim().is_empty()) {
                return Err(EmbedError::InvalidInput("empty text".to_string()));
            }
            self.embed_batch_sync(texts)
        })
    }

    fn dim(&self) -> usize {
        self.dim
    }
}
