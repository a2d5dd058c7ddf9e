use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use subtle::ConstantTimeEq;

use crate::error::ApiError;
use crate::state::AppState;

fn extract_key(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers.get("x-api-key") {
        return value.to_str().ok().map(str::to_string);
    }
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

fn keys_match(provided: &str, expected: &str) -> bool {
    provided.as_bytes().ct_eq(expected.as_bytes()).into()
}

/// Management endpoints: bearer or `X-API-Key` must match the configured
/// `api_key`. A `None` `api_key` disables the check (local development).
pub async fn require_api_key(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let settings = state.config.current();
    if let Some(expected) = &settings.api_key {
        let provided = extract_key(&headers).unwrap_or_default();
        if !keys_match(&provided, expected) {
            return Err(auth_error());
        }
    }
    Ok(next.run(request).await)
}

/// `/predict` accepts either the management `api_key` or the narrower
/// `predict_auth_key`, so downstream services can call prediction without
/// administrative credentials.
pub async fn require_predict_key(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let settings = state.config.current();
    let provided = extract_key(&headers).unwrap_or_default();

    let predict_ok = settings
        .predict_auth_key
        .as_deref()
        .is_some_and(|expected| keys_match(&provided, expected));
    let admin_ok = settings
        .api_key
        .as_deref()
        .is_some_and(|expected| keys_match(&provided, expected));

    if settings.predict_auth_key.is_none() && settings.api_key.is_none() {
        return Ok(next.run(request).await);
    }
    if predict_ok || admin_ok {
        return Ok(next.run(request).await);
    }
    Err(auth_error())
}

fn auth_error() -> ApiError {
    ApiError(intent_error::Error::from(intent_error::DomainError::Auth {
        message: "missing or invalid API key".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_match_is_case_sensitive_and_exact() {
        assert!(keys_match("secret", "secret"));
        assert!(!keys_match("secret", "Secret"));
        assert!(!keys_match("secret", "secret2"));
    }

    #[test]
    fn extract_key_prefers_x_api_key_header() {
        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", "abc".parse().unwrap());
        headers.insert(axum::http::header::AUTHORIZATION, "Bearer xyz".parse().unwrap());
        assert_eq!(extract_key(&headers), Some("abc".to_string()));
    }

    #[test]
    fn extract_key_falls_back_to_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert(axum::http::header::AUTHORIZATION, "Bearer xyz".parse().unwrap());
        assert_eq!(extract_key(&headers), Some("xyz".to_string()));
    }
}
