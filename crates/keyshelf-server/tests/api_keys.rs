use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use keyshelf_core::auth::SessionContext;
use keyshelf_core::config::ServerConfig;
use keyshelf_core::storage::{KeyStore, LocalKeyStore};
use keyshelf_core::{AppCore, KeyPatch, KeyRecord, NewKey};
use keyshelf_server::{AppState, build_router};
use serde_json::{Value, json};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

fn local_app(config: &ServerConfig) -> (Router, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let store = LocalKeyStore::open(temp_dir.path().join("api.db")).unwrap();
    let core = Arc::new(AppCore::with_store(Arc::new(store), SessionContext::default()));
    let app = build_router(AppState::new(core, config.expose_store_errors), config);
    (app, temp_dir)
}

struct UnreachableStore;

#[async_trait]
impl KeyStore for UnreachableStore {
    async fn list(&self) -> anyhow::Result<Vec<KeyRecord>> {
        Err(anyhow::anyhow!("permission denied for table api_keys"))
    }
    async fn insert(&self, _new_key: NewKey) -> anyhow::Result<KeyRecord> {
        Err(anyhow::anyhow!("permission denied for table api_keys"))
    }
    async fn update(&self, _id: &str, _patch: KeyPatch) -> anyhow::Result<KeyRecord> {
        Err(anyhow::anyhow!("permission denied for table api_keys"))
    }
    async fn delete(&self, _id: &str) -> anyhow::Result<()> {
        Err(anyhow::anyhow!("permission denied for table api_keys"))
    }
}

fn failing_app(config: &ServerConfig) -> Router {
    let core = Arc::new(AppCore::with_store(
        Arc::new(UnreachableStore),
        SessionContext::default(),
    ));
    build_router(AppState::new(core, config.expose_store_errors), config)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Option<String>, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|value| value.to_str().unwrap().to_string());
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec();
    (status, content_type, body)
}

async fn send_json(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, content_type, body) = send(app, request).await;
    assert_eq!(content_type.as_deref(), Some("application/json"));
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_health() {
    let (app, _tmp) = local_app(&ServerConfig::default());
    let (status, body) = send_json(&app, empty_request("GET", "/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_create_key_scenario() {
    let (app, _tmp) = local_app(&ServerConfig::default());

    let (status, body) = send_json(
        &app,
        json_request(
            "POST",
            "/api/keys",
            json!({ "name": "My App", "value": "sk-abcdef1234567890" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "My App");
    assert_eq!(body["key_value"], "sk-abcdef1234567890");
    assert_eq!(body["key_type"], "dev");
    assert!(!body["id"].as_str().unwrap().is_empty());
    assert!(body["created_at"].is_string());
    let usage = body["usage"].as_i64().unwrap();
    assert!((0..100).contains(&usage));
}

#[tokio::test]
async fn test_create_requires_name_and_value() {
    let (app, _tmp) = local_app(&ServerConfig::default());

    for payload in [
        json!({ "name": "", "value": "x" }),
        json!({ "name": "x", "value": "" }),
        json!({ "value": "x" }),
        json!({ "name": "x", "value": null }),
    ] {
        let (status, body) = send_json(&app, json_request("POST", "/api/keys", payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Name and value are required" }));
    }

    let (_, listed) = send_json(&app, empty_request("GET", "/api/keys")).await;
    assert_eq!(listed, json!([]));
}

#[tokio::test]
async fn test_malformed_body_is_a_json_400() {
    let (app, _tmp) = local_app(&ServerConfig::default());
    let request = Request::builder()
        .method("POST")
        .uri("/api/keys")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, body) = send_json(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_list_is_newest_first() {
    let (app, _tmp) = local_app(&ServerConfig::default());

    for name in ["first", "second", "third"] {
        let (status, _) = send_json(
            &app,
            json_request("POST", "/api/keys", json!({ "name": name, "value": "v", "type": "prod" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }

    let (status, body) = send_json(&app, empty_request("GET", "/api/keys")).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|record| record["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["third", "second", "first"]);
    assert_eq!(body[0]["key_type"], "prod");
}

#[tokio::test]
async fn test_update_round_trip() {
    let (app, _tmp) = local_app(&ServerConfig::default());
    let (_, created) = send_json(
        &app,
        json_request("POST", "/api/keys", json!({ "name": "My App", "value": "sk-old", "type": "prod" })),
    )
    .await;
    let id = created["id"].as_str().unwrap();

    let (status, updated) = send_json(
        &app,
        json_request(
            "PUT",
            &format!("/api/keys/{id}"),
            json!({ "name": "Renamed", "value": "sk-new" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Renamed");
    assert_eq!(updated["key_value"], "sk-new");

    let (_, listed) = send_json(&app, empty_request("GET", "/api/keys")).await;
    let stored = &listed[0];
    assert_eq!(stored["id"], created["id"]);
    assert_eq!(stored["created_at"], created["created_at"]);
    assert_eq!(stored["key_type"], "prod");
    assert_eq!(stored["usage"], created["usage"]);
    assert_eq!(stored["name"], "Renamed");
}

#[tokio::test]
async fn test_update_validation_and_unknown_id() {
    let (app, _tmp) = local_app(&ServerConfig::default());

    let (status, body) = send_json(
        &app,
        json_request("PUT", "/api/keys/some-id", json!({ "name": "  ", "value": "v" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Name and value are required");

    let (status, body) = send_json(
        &app,
        json_request("PUT", "/api/keys/missing", json!({ "name": "n", "value": "v" })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "API key missing not found");
}

#[tokio::test]
async fn test_delete_returns_no_content() {
    let (app, _tmp) = local_app(&ServerConfig::default());
    let (_, created) = send_json(
        &app,
        json_request("POST", "/api/keys", json!({ "name": "Doomed", "value": "sk-doomed" })),
    )
    .await;
    let uri = format!("/api/keys/{}", created["id"].as_str().unwrap());

    let (status, _, body) = send(&app, empty_request("DELETE", &uri)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_empty());

    let (_, listed) = send_json(&app, empty_request("GET", "/api/keys")).await;
    assert_eq!(listed, json!([]));

    let (status, _, _) = send(&app, empty_request("DELETE", &uri)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_validate_scenarios() {
    let (app, _tmp) = local_app(&ServerConfig::default());
    send_json(
        &app,
        json_request(
            "POST",
            "/api/keys",
            json!({ "name": "My App", "value": "sk-abcdef1234567890" }),
        ),
    )
    .await;

    let (status, hit) = send_json(
        &app,
        json_request("POST", "/api/validate", json!({ "key": "sk-abcdef1234567890" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(hit["success"], true);
    assert!(hit["details"].as_str().unwrap().contains("My App"));

    let (status, miss) = send_json(
        &app,
        json_request("POST", "/api/validate", json!({ "key": "not-a-real-key" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(miss["success"], false);
    assert_eq!(miss["message"], "API key not found");
    assert!(miss.get("key_name").is_none());

    let (status, _) = send_json(&app, json_request("POST", "/api/validate", json!({ "key": "  " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_store_errors_pass_through_by_default() {
    let app = failing_app(&ServerConfig::default());

    let requests = vec![
        empty_request("GET", "/api/keys"),
        json_request("POST", "/api/keys", json!({ "name": "n", "value": "v" })),
        json_request("PUT", "/api/keys/1", json!({ "name": "n", "value": "v" })),
        empty_request("DELETE", "/api/keys/1"),
    ];
    for request in requests {
        let (status, body) = send_json(&app, request).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "permission denied for table api_keys" }));
    }
}

#[tokio::test]
async fn test_store_errors_can_be_hidden() {
    let config = ServerConfig {
        expose_store_errors: false,
        ..ServerConfig::default()
    };
    let app = failing_app(&config);

    let (status, body) = send_json(&app, empty_request("GET", "/api/keys")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Internal server error" }));
}

#[tokio::test]
async fn test_api_token_guards_api_routes_only() {
    let config = ServerConfig {
        api_token: Some("s3cret".to_string()),
        ..ServerConfig::default()
    };
    let (app, _tmp) = local_app(&config);

    let (status, body) = send_json(&app, empty_request("GET", "/api/keys")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Missing Authorization header");

    let wrong = Request::builder()
        .uri("/api/keys")
        .header(header::AUTHORIZATION, "Bearer nope")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send_json(&app, wrong).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let authorized = Request::builder()
        .uri("/api/keys")
        .header(header::AUTHORIZATION, "Bearer s3cret")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send_json(&app, authorized).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, _) = send_json(&app, empty_request("GET", "/health")).await;
    assert_eq!(status, StatusCode::OK);
}
