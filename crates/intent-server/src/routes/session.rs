use std::sync::Arc;

use axum::extract::State;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub api_key: String,
}

/// Full session/login handling lives outside this engine; this is a thin
/// single-operator credential check that exists only because the endpoint
/// is part of the documented HTTP surface. It hands back the
/// already-configured management `api_key`, it does not mint tokens.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let settings = state.config.current();

    let username_ok: bool = request.username.as_bytes().ct_eq(settings.admin_username.as_bytes()).into();
    let password_ok = settings
        .admin_password
        .as_deref()
        .is_some_and(|expected| request.password.as_bytes().ct_eq(expected.as_bytes()).into());

    if !username_ok || !password_ok {
        return Err(ApiError(intent_error::Error::from(intent_error::DomainError::Auth {
            message: "invalid username or password".to_string(),
        })));
    }

    let api_key = settings.api_key.clone().ok_or_else(|| {
        ApiError(intent_error::Error::from(intent_error::DomainError::Config {
            message: "no api_key configured for this server".to_string(),
        }))
    })?;

    Ok(Json(LoginResponse { api_key }))
}
