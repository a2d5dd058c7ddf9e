use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;
use intent_config::{ConfigCore, Settings};
use intent_embed::config::{EmbedderConfig, EmbedderProvider};
use intent_embed::{EmbedError, Embedder, EmbedderBackend};
use intent_index::{DbError, VectorIndex};
use intent_llm::{LlmAdvisor, LlmProvider, ProviderConfig};
use intent_rag::OverlapReport;
use intent_store::RouteStore;
use intent_sync::{SyncMode, SyncReport, Synchronizer};

/// Everything a request handler needs: the rebindable backends
/// (`Embedder`, `VectorIndex`, `LlmAdvisor`) behind lock-free `ArcSwap`
/// snapshots, the single `RouteStore`, the shared config, and the
/// server-level overlap cache (keyed by `RouteStore::version`).
pub struct AppState {
    pub config: Arc<ConfigCore>,
    pub store: Arc<RouteStore>,
    pub embedder: ArcSwap<EmbedderBackend>,
    pub index: ArcSwap<VectorIndex>,
    pub llm: ArcSwap<LlmAdvisor>,
    pub overlap_cache: Mutex<Option<(u64, Arc<OverlapReport>)>>,
}

impl AppState {
    pub fn bootstrap(config: Arc<ConfigCore>, store: Arc<RouteStore>) -> Result<Arc<Self>, intent_error::Error> {
        let settings = config.current();
        let embedder = build_embedder(&settings).map_err(intent_error::Error::from)?;
        let dim = embedder.dim();
        let index = build_index(&settings, dim).map_err(intent_error::Error::from)?;
        let llm = build_llm(&settings);

        Ok(Arc::new(Self {
            config,
            store,
            embedder: ArcSwap::from_pointee(embedder),
            index: ArcSwap::from_pointee(index),
            llm: ArcSwap::from_pointee(llm),
            overlap_cache: Mutex::new(None),
        }))
    }

    /// Subscribes to the config's rebind channel for the lifetime of the
    /// process. `QDRANT_*` rebinds `VectorIndex` and runs an incremental
    /// sync; `EMBEDDING_*` rebinds `Embedder` and forces a full reindex if
    /// the dimension changed; `LLM_*` rebinds `LlmAdvisor`.
    pub fn spawn_rebind_task(self: &Arc<Self>) {
        let state = self.clone();
        tokio::spawn(async move {
            let mut rx = state.config.subscribe();
            loop {
                if rx.changed().await.is_err() {
                    break;
                }
                let settings = (*rx.borrow_and_update()).clone();
                state.rebind(&settings).await;
            }
        });
    }

    async fn rebind(&self, settings: &Settings) {
        let previous_dim = self.embedder.load().dim();
        let mut dim_changed = false;

        match build_embedder(settings) {
            Ok(embedder) => {
                dim_changed = embedder.dim() != previous_dim;
                self.embedder.store(Arc::new(embedder));
                tracing::info!(dim_changed, "rebound embedder from settings change");
            }
            Err(error) => tracing::error!(%error, "failed to rebind embedder"),
        }

        match build_index(settings, self.embedder.load().dim()) {
            Ok(index) => {
                self.index.store(Arc::new(index));
                tracing::info!("rebound vector index from settings change");
            }
            Err(error) => tracing::error!(%error, "failed to rebind vector index"),
        }

        self.llm.store(Arc::new(build_llm(settings)));
        self.invalidate_overlap_cache();

        let mode = if dim_changed { SyncMode::ForcedFull } else { SyncMode::Incremental };
        match run_sync(self, mode).await {
            Ok(report) => tracing::info!(?report, "post-rebind sync completed"),
            Err(error) => tracing::error!(%error, "post-rebind sync failed"),
        }
    }

    pub fn invalidate_overlap_cache(&self) {
        *self.overlap_cache.lock().expect("overlap cache lock poisoned") = None;
    }

    /// Called after every accepted RouteStore write: invalidates the
    /// diagnostics cache immediately and runs Synchronizer in the
    /// background, outside the write lock, so a slow sync never blocks the
    /// write response.
    pub fn after_route_mutation(self: &Arc<Self>) {
        self.invalidate_overlap_cache();
        let state = self.clone();
        tokio::spawn(async move {
            if let Err(error) = run_sync(&state, SyncMode::Incremental).await {
                tracing::error!(%error, "post-write incremental sync failed; next sync will converge");
            }
        });
    }
}

pub fn build_embedder(settings: &Settings) -> Result<EmbedderBackend, EmbedError> {
    let provider = match settings.huggingface_provider.as_deref() {
        Some("api") => EmbedderProvider::Api,
        _ => EmbedderProvider::Local,
    };
    let config = EmbedderConfig {
        provider,
        model_name: settings.embedding_model_name.clone(),
        device: settings.embedding_device.clone(),
        huggingface_access_token: settings.huggingface_access_token.clone(),
        batch_size: settings.batch_size,
        dimensions: 384,
    };
    EmbedderBackend::from_config(&config)
}

pub fn build_index(settings: &Settings, dim: usize) -> Result<VectorIndex, DbError> {
    VectorIndex::open(&settings.qdrant_url, dim)
}

pub fn build_llm(settings: &Settings) -> LlmAdvisor {
    let provider = parse_llm_provider(&settings.llm_provider);
    let config = ProviderConfig {
        prompt_template: doubao_folds_messages(provider),
        provider,
        base_url: settings.llm_base_url.clone(),
        model: settings.llm_model.clone(),
        api_key: settings.llm_api_key.clone().unwrap_or_default(),
        temperature: settings.llm_temperature,
    };

    match (&settings.utterance_generation_prompt, &settings.agent_repair_prompt) {
        (Some(utterance_prompt), Some(repair_prompt)) => {
            LlmAdvisor::with_prompts(config, utterance_prompt.clone(), repair_prompt.clone())
        }
        _ => LlmAdvisor::new(config),
    }
}

fn parse_llm_provider(raw: &str) -> LlmProvider {
    match raw {
        "deepseek" => LlmProvider::Deepseek,
        "doubao" => LlmProvider::Doubao,
        "qwen" => LlmProvider::Qwen,
        "gemini" => LlmProvider::Gemini,
        "openrouter" => LlmProvider::OpenRouter,
        other => {
            tracing::warn!(provider = other, "unknown LLM_PROVIDER, defaulting to openrouter");
            LlmProvider::OpenRouter
        }
    }
}

/// Doubao does not accept a separate `system` role on its chat-completions
/// endpoint; every other provider speaks standard OpenAI-compatible roles.
fn doubao_folds_messages(provider: LlmProvider) -> Option<String> {
    matches!(provider, LlmProvider::Doubao).then(|| "{system}\n\n{user}".to_string())
}

/// Runs the Synchronizer against the current snapshot of every bound
/// component. Shared by the `/reindex` handler and the rebind task so both
/// paths observe the same convergence behavior.
pub async fn run_sync(state: &AppState, mode: SyncMode) -> Result<SyncReport, intent_sync::SyncError> {
    let embedder = state.embedder.load_full();
    let index = state.index.load_full();
    let routes = state.store.routes();

    let sync = Synchronizer::new(&*embedder, &index);
    sync.run(&routes, mode, None).await
}
