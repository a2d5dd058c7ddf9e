use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use intent_core::{Route, RouteId};
use intent_llm::RouteContext;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

pub async fn list_routes(State(state): State<Arc<AppState>>) -> Json<Vec<Route>> {
    Json(state.store.routes())
}

pub async fn search_routes(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Json<Vec<Route>> {
    Json(state.store.search(&query.q))
}

pub async fn create_route(
    State(state): State<Arc<AppState>>,
    Json(route): Json<Route>,
) -> Result<(StatusCode, Json<Route>), ApiError> {
    let created = state.store.create(route).map_err(|e| ApiError(e.into()))?;
    state.after_route_mutation();
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_route(
    State(state): State<Arc<AppState>>,
    Path(id): Path<RouteId>,
    Json(route): Json<Route>,
) -> Result<Json<Route>, ApiError> {
    let updated = state.store.update(id, route).map_err(|e| ApiError(e.into()))?;
    state.after_route_mutation();
    Ok(Json(updated))
}

pub async fn delete_route(
    State(state): State<Arc<AppState>>,
    Path(id): Path<RouteId>,
) -> Result<StatusCode, ApiError> {
    state.store.delete(id).map_err(|e| ApiError(e.into()))?;
    state.after_route_mutation();
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
pub struct NegativeSamplesRequest {
    pub negative_samples: Vec<String>,
    pub negative_threshold: Option<f32>,
}

pub async fn set_negative_samples(
    State(state): State<Arc<AppState>>,
    Path(id): Path<RouteId>,
    Json(request): Json<NegativeSamplesRequest>,
) -> Result<Json<Route>, ApiError> {
    let updated = state
        .store
        .set_negative_samples(id, request.negative_samples, request.negative_threshold)
        .map_err(|e| ApiError(e.into()))?;
    // Negative samples are never embedded into VectorIndex (Predictor
    // compares them directly), so no sync is needed, only the diagnostics
    // cache invalidation `after_route_mutation` already provides indirectly
    // via its sync call being a no-op for this change.
    state.invalidate_overlap_cache();
    Ok(Json(updated))
}

#[derive(Deserialize)]
pub struct GenerateUtterancesRequest {
    pub id: RouteId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub count: usize,
    #[serde(default)]
    pub utterances: Vec<String>,
}

#[derive(Serialize)]
pub struct GenerateUtterancesResponse {
    pub route: Route,
}

/// LLM-backed expansion. If `id` names an existing route, the new utterances
/// are appended and persisted; otherwise the generated list is returned
/// without being stored (the caller has not created the route yet).
pub async fn generate_utterances(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GenerateUtterancesRequest>,
) -> Result<Json<GenerateUtterancesResponse>, ApiError> {
    let existing = state.store.get(request.id);
    let reference: Vec<String> = existing
        .as_ref()
        .map(|r| r.utterances.clone())
        .unwrap_or_else(|| request.utterances.clone());

    let route_ctx = RouteContext {
        id: request.id,
        name: request.name.clone().into(),
        description: request.description.clone().into(),
        utterances: reference.clone(),
    };

    let llm = state.llm.load_full();
    let generated = llm
        .generate_utterances(&route_ctx, request.count, &reference)
        .await
        .map_err(|e| ApiError(e.into()))?;

    let route = match existing {
        Some(mut route) => {
            route.utterances.extend(generated);
            let updated = state.store.update(route.id, route).map_err(|e| ApiError(e.into()))?;
            state.after_route_mutation();
            updated
        }
        None => {
            let mut utterances = request.utterances;
            utterances.extend(generated);
            Route {
                id: request.id,
                name: request.name.into(),
                description: request.description.into(),
                utterances,
                negative_samples: Vec::new(),
                score_threshold: 0.6,
                negative_threshold: 0.9,
            }
        }
    };

    Ok(Json(GenerateUtterancesResponse { route }))
}
