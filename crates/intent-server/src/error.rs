use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use intent_error::policy::{ErrorPolicy, TracingPolicy};
use intent_error::{DomainError, Error as HubError};
use serde::Serialize;

/// Emits at the HTTP boundary via the policy intent-error is designed around,
/// rather than interleaving `tracing` calls into the domain crates themselves.
const POLICY: TracingPolicy = TracingPolicy;

/// Wraps the workspace's `intent_error::Error` for the HTTP boundary,
/// mapping each `DomainError` kind to the status code it carries.
pub struct ApiError(pub HubError);

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    detail: String,
}

impl From<HubError> for ApiError {
    fn from(err: HubError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, detail) = match &self.0 {
            HubError::Domain(DomainError::Validation { message }) => {
                (StatusCode::BAD_REQUEST, "validation_error", message.clone())
            }
            HubError::Domain(DomainError::NotFound { message }) => {
                (StatusCode::NOT_FOUND, "not_found", message.clone())
            }
            HubError::Domain(DomainError::Auth { message }) => {
                (StatusCode::UNAUTHORIZED, "auth_error", message.clone())
            }
            HubError::Domain(DomainError::BackendUnavailable { backend, message }) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "backend_unavailable",
                format!("{backend}: {message}"),
            ),
            HubError::Domain(DomainError::ConflictState { message }) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "conflict_state", message.clone())
            }
            HubError::Domain(DomainError::Cancelled) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "cancelled",
                "operation cancelled".to_string(),
            ),
            HubError::Domain(DomainError::Config { message }) => {
                (StatusCode::BAD_REQUEST, "config_error", message.clone())
            }
            HubError::Fatal(fatal) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "fatal_error",
                fatal.to_string(),
            ),
            other => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                other.to_string(),
            ),
        };

        POLICY.emit(&self.0);
        (status, Json(ErrorBody { error: error.to_string(), detail })).into_response()
    }
}
