use serde::{Deserialize, Serialize};

use intent_core::{DEFAULT_ROUTE_ID, DEFAULT_ROUTE_NAME, RouteId};

/// Default significant-region-overlap threshold. Kept as a literal here
/// rather than depending on `intent-rag` for one constant; must stay in
/// sync with `intent_rag::diagnostics::REGION_THRESHOLD_SIGNIFICANT`.
const DEFAULT_REGION_THRESHOLD_SIGNIFICANT: f32 = 0.85;
/// Default ambiguous-instance-conflict threshold; must stay in sync with
/// `intent_rag::diagnostics::INSTANCE_THRESHOLD_AMBIGUOUS`.
const DEFAULT_INSTANCE_THRESHOLD_AMBIGUOUS: f32 = 0.92;
/// Default sync batch size; must stay in sync with `intent_sync::BATCH_SIZE`.
const DEFAULT_BATCH_SIZE: usize = 64;

/// Every recognized runtime setting, per the external-interfaces
/// configuration-keys table. Field names are lowercase of the documented
/// env var names (`QDRANT_URL` → `qdrant_url`); `config::Environment`
/// resolves them case-insensitively, so the env var names are unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub qdrant_url: String,
    pub qdrant_api_key: Option<String>,
    pub qdrant_collection: String,

    pub embedding_model_name: String,
    pub embedding_device: String,
    pub huggingface_access_token: Option<String>,
    pub huggingface_provider: Option<String>,

    pub llm_provider: String,
    pub llm_api_key: Option<String>,
    pub llm_base_url: String,
    pub llm_model: String,
    pub llm_temperature: f32,

    pub utterance_generation_prompt: Option<String>,
    pub agent_repair_prompt: Option<String>,

    pub region_threshold_significant: f32,
    pub instance_threshold_ambiguous: f32,

    pub batch_size: usize,

    pub default_route_id: RouteId,
    pub default_route_name: String,

    pub predict_auth_key: Option<String>,

    /// Bearer / `X-API-Key` secret required by every management endpoint.
    /// `None` disables the server's own auth check (local development only).
    pub api_key: Option<String>,
    /// `POST /auth/login` is a thin, single-operator credential check — full
    /// session/login handling is explicitly out of scope; this exists only
    /// so the documented endpoint has a real implementation.
    pub admin_username: String,
    pub admin_password: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            qdrant_url: "mem".to_string(),
            qdrant_api_key: None,
            qdrant_collection: "points".to_string(),

            embedding_model_name: "sentence-transformers/all-MiniLM-L6-v2".to_string(),
            embedding_device: "cpu".to_string(),
            huggingface_access_token: None,
            huggingface_provider: None,

            llm_provider: "openrouter".to_string(),
            llm_api_key: None,
            llm_base_url: "https://openrouter.ai/api/v1".to_string(),
            llm_model: "".to_string(),
            llm_temperature: 0.3,

            utterance_generation_prompt: None,
            agent_repair_prompt: None,

            region_threshold_significant: DEFAULT_REGION_THRESHOLD_SIGNIFICANT,
            instance_threshold_ambiguous: DEFAULT_INSTANCE_THRESHOLD_AMBIGUOUS,

            batch_size: DEFAULT_BATCH_SIZE,

            default_route_id: DEFAULT_ROUTE_ID,
            default_route_name: DEFAULT_ROUTE_NAME.to_string(),

            predict_auth_key: None,

            api_key: None,
            admin_username: "admin".to_string(),
            admin_password: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_fallbacks() {
        let settings = Settings::default();
        assert_eq!(settings.default_route_id, 0);
        assert_eq!(settings.default_route_name, "none");
        assert_eq!(settings.batch_size, 64);
    }
}
