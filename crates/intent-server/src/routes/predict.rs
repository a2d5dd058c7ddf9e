use std::sync::Arc;

use axum::extract::State;
use axum::response::Json;
use intent_core::{RouteId, Score};
use intent_rag::Predictor;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct PredictRequest {
    pub text: String,
}

#[derive(Serialize)]
pub struct PredictedRoute {
    pub id: RouteId,
    pub name: String,
    pub score: Option<Score>,
}

pub async fn predict(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PredictRequest>,
) -> Result<Json<Vec<PredictedRoute>>, ApiError> {
    let embedder = state.embedder.load_full();
    let index = state.index.load_full();
    let routes = state.store.routes();

    let predictor = Predictor::new(&*embedder, &index);
    let predictions = predictor
        .predict(&request.text, &routes)
        .await
        .map_err(|e| ApiError(e.into()))?;

    Ok(Json(
        predictions
            .into_iter()
            .map(|p| PredictedRoute {
                id: p.route_id,
                name: p.name.to_string(),
                score: p.score,
            })
            .collect(),
    ))
}
