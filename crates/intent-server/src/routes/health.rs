use std::sync::Arc;

use axum::extract::State;
use axum::response::Json;
use intent_embed::Embedder;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub route_store: bool,
    pub vector_index: bool,
    pub embedder: bool,
    pub llm_advisor: bool,
}

/// Component readiness flags. `VectorIndex`/`Embedder`/`LlmAdvisor` are each
/// probed with a cheap call (`count()`/`dim()`/`is_configured()`) rather than
/// assumed healthy just because a handle exists, since rebinding can leave a
/// stale handle on a dead backend.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let vector_index = state.index.load().count().is_ok();
    let embedder = state.embedder.load().dim() > 0;
    let llm_advisor = state.llm.load().is_configured();

    Json(HealthResponse {
        route_store: true,
        vector_index,
        embedder,
        llm_advisor,
    })
}
