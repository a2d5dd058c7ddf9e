use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::Json;
use intent_core::RouteId;
use intent_llm::{RepairSuggestion, RouteContext};
use intent_rag::{DiagnosticsEngine, OverlapReport, ProjectedPoint};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct OverlapQuery {
    #[serde(default)]
    pub refresh: bool,
}

/// Server-level cache keyed by `RouteStore::version`, since a fresh
/// `DiagnosticsEngine` must be built per request (it borrows the current
/// `Embedder` snapshot, which can be swapped out from under a long-lived one).
pub async fn overlap(
    State(state): State<Arc<AppState>>,
    Query(query): Query<OverlapQuery>,
) -> Result<Json<OverlapReport>, ApiError> {
    let routes = state.store.routes();
    let version = state.store.version();

    if !query.refresh {
        if let Some((cached_version, report)) = &*state.overlap_cache.lock().expect("overlap cache lock poisoned") {
            if *cached_version == version {
                return Ok(Json((**report).clone()));
            }
        }
    }

    let embedder = state.embedder.load_full();
    let engine = DiagnosticsEngine::new(&*embedder);
    let report = engine
        .overlap(&routes, version, true)
        .await
        .map_err(|e| ApiError(e.into()))?;

    *state.overlap_cache.lock().expect("overlap cache lock poisoned") = Some((version, report.clone()));
    Ok(Json((*report).clone()))
}

#[derive(Deserialize)]
pub struct RepairRequest {
    pub source_route_id: RouteId,
    pub target_route_id: RouteId,
}

pub async fn repair(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RepairRequest>,
) -> Result<Json<RepairSuggestion>, ApiError> {
    let source = state.store.get(request.source_route_id).ok_or_else(|| {
        ApiError(intent_error::Error::from(intent_error::DomainError::NotFound {
            message: format!("route {} not found", request.source_route_id),
        }))
    })?;
    let target = state.store.get(request.target_route_id).ok_or_else(|| {
        ApiError(intent_error::Error::from(intent_error::DomainError::NotFound {
            message: format!("route {} not found", request.target_route_id),
        }))
    })?;

    let source_ctx = RouteContext {
        id: source.id,
        name: source.name.clone(),
        description: source.description.clone(),
        utterances: source.utterances.clone(),
    };
    let target_ctx = RouteContext {
        id: target.id,
        name: target.name.clone(),
        description: target.description.clone(),
        utterances: target.utterances.clone(),
    };

    let llm = state.llm.load_full();
    let suggestion = llm
        .suggest_repair(&source_ctx, &target_ctx)
        .await
        .map_err(|e| ApiError(e.into()))?;

    Ok(Json(suggestion))
}

#[derive(Deserialize)]
pub struct ApplyRepairRequest {
    pub route_id: RouteId,
    pub utterances: Vec<String>,
}

#[derive(Serialize)]
pub struct ApplyRepairResponse {
    pub route: intent_core::Route,
}

pub async fn apply_repair(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ApplyRepairRequest>,
) -> Result<Json<ApplyRepairResponse>, ApiError> {
    let route = state
        .store
        .apply_repair(request.route_id, request.utterances)
        .map_err(|e| ApiError(e.into()))?;
    state.after_route_mutation();
    Ok(Json(ApplyRepairResponse { route }))
}

#[derive(Deserialize)]
pub struct UmapQuery {
    #[serde(default = "default_n_neighbors")]
    pub n_neighbors: usize,
    #[serde(default = "default_min_dist")]
    pub min_dist: f64,
    #[serde(default)]
    pub seed: u64,
}

fn default_n_neighbors() -> usize {
    15
}

fn default_min_dist() -> f64 {
    0.1
}

pub async fn umap(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UmapQuery>,
) -> Result<Json<Vec<ProjectedPoint>>, ApiError> {
    let routes = state.store.routes();
    let embedder = state.embedder.load_full();
    let engine = DiagnosticsEngine::new(&*embedder);
    let points = engine
        .project(&routes, query.n_neighbors, query.min_dist, query.seed)
        .await
        .map_err(|e| ApiError(e.into()))?;
    Ok(Json(points))
}

