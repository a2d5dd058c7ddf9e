use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use intent_config::ConfigCore;
use intent_core::Route;
use intent_server::{build_router, AppState};
use intent_store::RouteStore;
use tower::ServiceExt;

/// Builds an `AppState` that never touches the network: the embedder is
/// provider "api" (construction only stores a token, no request is made
/// unless a handler actually calls `embed`) and the index is in-memory cozo.
/// Tests that would exercise `predict`/`diagnostics`/`reindex` end-to-end are
/// left to `intent-rag`/`intent-sync`'s own `FakeEmbedder`-based unit tests;
/// these integration tests cover routing, auth, and persistence instead.
fn test_app() -> (Arc<AppState>, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");

    let config = ConfigCore::load(dir.path().join("settings.toml"), None).expect("load config");
    let mut settings = (*config.current()).clone();
    settings.qdrant_url = "mem".to_string();
    settings.huggingface_provider = Some("api".to_string());
    settings.huggingface_access_token = Some("test-token".to_string());
    settings.api_key = Some("mgmt-secret".to_string());
    settings.predict_auth_key = Some("predict-secret".to_string());
    settings.admin_username = "admin".to_string();
    settings.admin_password = Some("hunter2".to_string());
    config.update(settings).expect("persist settings");

    let store = Arc::new(RouteStore::open(dir.path().join("routes.json")).expect("open store"));
    let state = AppState::bootstrap(Arc::new(config), store).expect("bootstrap");
    (state, dir)
}

fn empty_route(id: u32, name: &str) -> Route {
    Route {
        id,
        name: name.into(),
        description: "".into(),
        utterances: vec![],
        negative_samples: vec![],
        score_threshold: 0.6,
        negative_threshold: 0.9,
    }
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.expect("collect body").to_bytes();
    serde_json::from_slice(&bytes).expect("valid json body")
}

#[tokio::test]
async fn health_check_reports_ready() {
    let (state, _dir) = test_app();
    let router = build_router(state);

    let response = router
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["vector_index"], true);
    assert_eq!(body["llm_advisor"], true);
}

#[tokio::test]
async fn management_endpoint_rejects_missing_key() {
    let (state, _dir) = test_app();
    let router = build_router(state);

    let response = router
        .oneshot(Request::builder().uri("/routes").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn management_endpoint_accepts_valid_key() {
    let (state, _dir) = test_app();
    let router = build_router(state);

    let response = router
        .oneshot(
            Request::builder()
                .uri("/routes")
                .header("x-api-key", "mgmt-secret")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn predict_rejects_missing_key_without_touching_embedder() {
    let (state, _dir) = test_app();
    let router = build_router(state);

    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/predict")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"text":"cancel my booking"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_succeeds_with_correct_credentials() {
    let (state, _dir) = test_app();
    let router = build_router(state);

    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/login")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"username":"admin","password":"hunter2"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["api_key"], "mgmt-secret");
}

#[tokio::test]
async fn login_rejects_wrong_password() {
    let (state, _dir) = test_app();
    let router = build_router(state);

    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/login")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"username":"admin","password":"wrong"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn routes_crud_round_trip() {
    let (state, _dir) = test_app();
    let store = state.store.clone();
    let router = build_router(state);

    let create_body = serde_json::to_string(&empty_route(0, "billing")).unwrap();
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/routes")
                .header("x-api-key", "mgmt-secret")
                .header("content-type", "application/json")
                .body(Body::from(create_body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    let id = created["id"].as_u64().unwrap() as u32;
    assert_eq!(id, 1);

    let listed = store.routes();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name.as_ref(), "billing");

    let update_body = serde_json::to_string(&empty_route(0, "billing-renamed")).unwrap();
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(format!("/routes/{id}"))
                .header("x-api-key", "mgmt-secret")
                .header("content-type", "application/json")
                .body(Body::from(update_body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(store.get(id).unwrap().name.as_ref(), "billing-renamed");

    let response = router
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/routes/{id}"))
                .header("x-api-key", "mgmt-secret")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(store.get(id).is_none());
}

#[tokio::test]
async fn settings_get_redacts_secrets_and_post_updates() {
    let (state, _dir) = test_app();
    let router = build_router(state);

    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/settings")
                .header("x-api-key", "mgmt-secret")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["api_key"], "********");
    assert_eq!(body["admin_password"], "********");

    let mut updated = serde_json::from_value::<intent_config::Settings>(body.clone()).unwrap();
    updated.llm_model = "gpt-oss".to_string();
    updated.api_key = Some("mgmt-secret".to_string());
    updated.admin_password = Some("hunter2".to_string());
    let post_body = serde_json::to_string(&updated).unwrap();

    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/settings")
                .header("x-api-key", "mgmt-secret")
                .header("content-type", "application/json")
                .body(Body::from(post_body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["llm_model"], "gpt-oss");
}
