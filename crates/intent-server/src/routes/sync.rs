use std::sync::Arc;

use axum::extract::State;
use axum::response::Json;
use intent_sync::SyncMode;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::{run_sync, AppState};

#[derive(Deserialize)]
pub struct ReindexRequest {
    #[serde(default)]
    pub force_full: bool,
}

#[derive(Serialize)]
pub struct ReindexResponse {
    pub routes_count: usize,
    pub total_points: usize,
    pub upserted: usize,
    pub deleted: usize,
    pub mode: &'static str,
}

/// Runs the same Synchronizer path the rebind task and write-triggered
/// background sync use, but synchronously and under direct operator control.
pub async fn reindex(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ReindexRequest>,
) -> Result<Json<ReindexResponse>, ApiError> {
    let mode = if request.force_full {
        SyncMode::ForcedFull
    } else {
        SyncMode::Incremental
    };

    let report = run_sync(&state, mode).await.map_err(|e| ApiError(e.into()))?;
    state.invalidate_overlap_cache();

    Ok(Json(ReindexResponse {
        routes_count: report.routes_count,
        total_points: report.total_points,
        upserted: report.upserted,
        deleted: report.deleted,
        mode: if request.force_full { "forced_full" } else { "incremental" },
    }))
}
