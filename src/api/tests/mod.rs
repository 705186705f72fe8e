use super::*;
use crate::error::ApiError;
use axum::body::Body;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::response::Response;
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;

mod system;

/// Manager rooted in a fresh tempdir (which must be kept alive)
async fn create_test_manager() -> (Arc<ZimManager>, TempDir) {
    create_test_manager_with(|_| {}).await
}

async fn create_test_manager_with(
    customize: impl FnOnce(&mut Config),
) -> (Arc<ZimManager>, TempDir) {
    let temp_dir = tempfile::tempdir().unwrap();

    let mut config = Config::default();
    config.storage.storage_path = temp_dir.path().join("zim");
    config.server.api.bind_address = "127.0.0.1:0".parse().unwrap();
    customize(&mut config);

    let manager = ZimManager::new(config).await.unwrap();
    (Arc::new(manager), temp_dir)
}

/// Router over `manager` with its own configuration
fn router_for(manager: &Arc<ZimManager>) -> Router {
    create_router(manager.clone(), manager.get_config())
}

async fn get(app: &Router, uri: &str) -> Response {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn send(app: &Router, request: Request) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

async fn json_body<T: serde::de::DeserializeOwned>(response: Response) -> T {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

async fn text_body(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

#[tokio::test]
async fn test_cors_enabled() {
    let (manager, _temp_dir) = create_test_manager().await;
    let app = router_for(&manager);

    let response = send(
        &app,
        Request::builder()
            .uri("/api/health")
            .header("Origin", "http://localhost:3000")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .headers()
            .contains_key("access-control-allow-origin"),
        "CORS header should be present when CORS is enabled"
    );
}

#[tokio::test]
async fn test_cors_disabled() {
    let (manager, _temp_dir) =
        create_test_manager_with(|c| c.server.api.cors_enabled = false).await;
    let app = router_for(&manager);

    let response = send(
        &app,
        Request::builder()
            .uri("/api/health")
            .header("Origin", "http://localhost:3000")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert!(
        !response
            .headers()
            .contains_key("access-control-allow-origin")
    );
}

#[tokio::test]
async fn test_api_key_protects_api_routes_only() {
    let (manager, _temp_dir) =
        create_test_manager_with(|c| c.server.api.api_key = Some("s3cret".to_string())).await;
    let app = router_for(&manager);

    assert_eq!(get(&app, "/api/zim").await.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(get(&app, "/").await.status(), StatusCode::OK);

    let response = send(
        &app,
        Request::builder()
            .uri("/api/zim")
            .header("X-Api-Key", "s3cret")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_swagger_ui_toggle() {
    let (manager, _temp_dir) = create_test_manager().await;
    let response = get(&router_for(&manager), "/api-docs/openapi.json").await;
    assert_eq!(response.status(), StatusCode::OK);

    let (manager, _temp_dir) =
        create_test_manager_with(|c| c.server.api.swagger_ui = false).await;
    let response = get(&router_for(&manager), "/api-docs/openapi.json").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_server_stops_on_shutdown() {
    let (manager, _temp_dir) = create_test_manager().await;

    let api_handle = manager.spawn_api_server();
    tokio::time::sleep(Duration::from_millis(100)).await;

    manager.shutdown().await.unwrap();

    let result = tokio::time::timeout(Duration::from_secs(5), api_handle)
        .await
        .expect("server should stop after shutdown")
        .unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_bind_failure_is_reported() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let taken = listener.local_addr().unwrap();

    let (manager, _temp_dir) =
        create_test_manager_with(|c| c.server.api.bind_address = taken).await;

    let result = start_api_server(manager.clone(), manager.get_config()).await;
    assert!(matches!(result, Err(crate::Error::Io(_))));
}
