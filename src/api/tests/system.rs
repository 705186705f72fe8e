use super::*;
use crate::api::routes::HealthResponse;
use crate::types::Event;

#[tokio::test]
async fn test_health_endpoint() {
    let (manager, _temp_dir) = create_test_manager().await;
    let response = get(&router_for(&manager), "/api/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let health: HealthResponse = json_body(response).await;
    assert_eq!(health.status, "ok");
    assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
    assert!(health.accepting_downloads);
}

#[tokio::test]
async fn test_health_reports_shutdown() {
    let (manager, _temp_dir) = create_test_manager().await;
    manager.shutdown().await.unwrap();

    let health: HealthResponse = json_body(get(&router_for(&manager), "/api/health").await).await;
    assert!(!health.accepting_downloads);
}

#[tokio::test]
async fn test_index_serves_ui() {
    let (manager, _temp_dir) = create_test_manager().await;
    let response = get(&router_for(&manager), "/").await;

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()["content-type"].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/html"));
    let html = text_body(response).await;
    assert!(html.contains("Kiwix ZIM File Manager"));
    assert!(html.contains("/api/zim/download"));
}

#[tokio::test]
async fn test_openapi_endpoint() {
    let (manager, _temp_dir) = create_test_manager().await;
    let response = get(&router_for(&manager), "/api/openapi.json").await;

    assert_eq!(response.status(), StatusCode::OK);
    let spec: serde_json::Value = json_body(response).await;
    assert_eq!(spec["info"]["title"], "kiwix-manager REST API");
    assert!(spec["paths"]["/api/zim/download"].is_object());
}

#[tokio::test]
async fn test_event_stream_delivers_events_and_ends_on_shutdown() {
    let (manager, _temp_dir) = create_test_manager().await;
    let response = get(&router_for(&manager), "/api/events").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "text/event-stream"
    );

    manager.emit_event(Event::Failed {
        id: "download_1_1".into(),
        error: "HTTP error 404".to_string(),
    });
    manager.shutdown().await.unwrap();

    let body = tokio::time::timeout(Duration::from_secs(5), text_body(response))
        .await
        .expect("event stream should end after shutdown");

    assert!(body.contains("event: failed"));
    assert!(body.contains("HTTP error 404"));
    assert!(body.contains("event: shutdown"));
}

#[tokio::test]
async fn test_connected_event_stream_does_not_hold_up_server_shutdown() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let (manager, _temp_dir) = create_test_manager_with(|c| {
        c.server.api.bind_address = std::net::SocketAddr::from(([127, 0, 0, 1], port));
    })
    .await;
    let api_handle = manager.spawn_api_server();

    let url = format!("http://127.0.0.1:{}/api/events", port);
    let response = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match reqwest::get(&url).await {
                Ok(response) => return response,
                Err(_) => tokio::time::sleep(Duration::from_millis(20)).await,
            }
        }
    })
    .await
    .expect("API server did not start");
    assert_eq!(response.status().as_u16(), 200);

    manager.shutdown().await.unwrap();

    let body = tokio::time::timeout(Duration::from_secs(5), response.text())
        .await
        .expect("event stream stayed open after shutdown")
        .unwrap();
    assert!(body.contains("event: shutdown"));

    let result = tokio::time::timeout(Duration::from_secs(5), api_handle)
        .await
        .expect("server kept waiting on the event stream")
        .unwrap();
    assert!(result.is_ok());
}
