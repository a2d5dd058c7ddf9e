mod diagnostics;
mod health;
mod predict;
mod routes_crud;
mod session;
mod settings;
mod sync;

use std::sync::Arc;

use axum::middleware::from_fn_with_state;
use axum::routing::{get, post, put};
use axum::Router;

use crate::auth::{require_api_key, require_predict_key};
use crate::state::AppState;

/// Wires the full HTTP surface. `/health` and `/auth/login` are unauthenticated,
/// `/predict` accepts either the predict-only or management key, and every
/// route/diagnostics/settings/reindex endpoint requires the management key.
pub fn build_router(state: Arc<AppState>) -> Router {
    let public = Router::new()
        .route("/health", get(health::health))
        .route("/auth/login", post(session::login));

    let predict_router = Router::new()
        .route("/predict", post(predict::predict))
        .layer(from_fn_with_state(state.clone(), require_predict_key));

    let management = Router::new()
        .route("/routes", get(routes_crud::list_routes).post(routes_crud::create_route))
        .route("/routes/search", get(routes_crud::search_routes))
        .route(
            "/routes/generate-utterances",
            post(routes_crud::generate_utterances),
        )
        .route(
            "/routes/{id}",
            put(routes_crud::update_route).delete(routes_crud::delete_route),
        )
        .route(
            "/routes/{id}/negative-samples",
            post(routes_crud::set_negative_samples),
        )
        .route("/reindex", post(sync::reindex))
        .route("/diagnostics/overlap", get(diagnostics::overlap))
        .route("/diagnostics/repair", post(diagnostics::repair))
        .route("/diagnostics/apply-repair", post(diagnostics::apply_repair))
        .route("/diagnostics/umap", get(diagnostics::umap))
        .route(
            "/settings",
            get(settings::get_settings).post(settings::update_settings),
        )
        .layer(from_fn_with_state(state.clone(), require_api_key));

    public.merge(predict_router).merge(management).with_state(state)
}
