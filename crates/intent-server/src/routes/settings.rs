use std::sync::Arc;

use axum::extract::State;
use axum::response::Json;
use intent_config::Settings;

use crate::error::ApiError;
use crate::state::AppState;

const REDACTED: &str = "********";

/// Secrets are replaced rather than omitted, so the response shape stays a
/// full `Settings` object regardless of which fields happen to be set.
fn redact(mut settings: Settings) -> Settings {
    if settings.qdrant_api_key.is_some() {
        settings.qdrant_api_key = Some(REDACTED.to_string());
    }
    if settings.huggingface_access_token.is_some() {
        settings.huggingface_access_token = Some(REDACTED.to_string());
    }
    if settings.llm_api_key.is_some() {
        settings.llm_api_key = Some(REDACTED.to_string());
    }
    if settings.predict_auth_key.is_some() {
        settings.predict_auth_key = Some(REDACTED.to_string());
    }
    if settings.api_key.is_some() {
        settings.api_key = Some(REDACTED.to_string());
    }
    if settings.admin_password.is_some() {
        settings.admin_password = Some(REDACTED.to_string());
    }
    settings
}

pub async fn get_settings(State(state): State<Arc<AppState>>) -> Json<Settings> {
    Json(redact((*state.config.current()).clone()))
}

/// Persists the new settings, which triggers `ConfigCore`'s rebind
/// notification; `AppState::spawn_rebind_task` picks it up and rebuilds the
/// affected backends asynchronously rather than here.
pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    Json(settings): Json<Settings>,
) -> Result<Json<Settings>, ApiError> {
    state.config.update(settings.clone()).map_err(|e| ApiError(e.into()))?;
    Ok(Json(redact(settings)))
}
