use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use panelsync::{Role, SyncHub, api};
use serde_json::{Value, json};
use tower::ServiceExt;

async fn call(router: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    let response = router.oneshot(request.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn test_current_state_starts_empty() {
    let router = api::router(SyncHub::spawn());
    let (status, body) = call(router, "GET", "/current-state", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"currentAssetId": null, "isPlaying": false}));
}

#[tokio::test]
async fn test_rest_commands_are_broadcast() {
    let hub = SyncHub::spawn();
    let router = api::router(hub.clone());
    let mut display = hub.subscribe(Role::Display).await.unwrap();

    let (status, body) = call(
        router.clone(),
        "POST",
        "/control/set-current",
        Some(json!({"id": "v1"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"currentAssetId": "v1", "isPlaying": false}));

    let (_, body) = call(router.clone(), "POST", "/control/play", None).await;
    assert_eq!(body["isPlaying"], true);

    let (_, body) = call(
        router.clone(),
        "POST",
        "/control/pause",
        Some(json!({"id": "v1"})),
    )
    .await;
    assert_eq!(body["isPlaying"], false);

    let mut seen = Vec::new();
    for _ in 0..3 {
        let state = tokio::time::timeout(Duration::from_secs(1), display.recv())
            .await
            .unwrap()
            .unwrap();
        seen.push(state.is_playing);
    }
    assert_eq!(seen, vec![false, true, false]);

    let (_, body) = call(router, "GET", "/current-state", None).await;
    assert_eq!(body, json!({"currentAssetId": "v1", "isPlaying": false}));
}

#[tokio::test]
async fn test_set_current_requires_an_id() {
    let router = api::router(SyncHub::spawn());
    let (status, _) = call(router, "POST", "/control/set-current", Some(json!({}))).await;
    assert!(status.is_client_error());
}

#[tokio::test]
async fn test_sync_status_counts_subscribers() {
    let hub = SyncHub::spawn();
    let router = api::router(hub.clone());
    let _controller = hub.subscribe(Role::Controller).await.unwrap();
    let _display_a = hub.subscribe(Role::Display).await.unwrap();
    let _display_b = hub.subscribe(Role::Display).await.unwrap();
    hub.select_asset("x").await.unwrap();

    let (status, body) = call(router, "GET", "/sync/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["controllers"], 1);
    assert_eq!(body["displays"], 2);
    assert_eq!(body["commands_applied"], 1);
    assert_eq!(body["state"]["currentAssetId"], "x");
}

#[tokio::test]
async fn test_sse_stream_starts_with_snapshot() {
    let hub = SyncHub::spawn();
    hub.select_asset("intro").await.unwrap();
    let router = api::router(hub);

    let response = router
        .oneshot(
            Request::builder()
                .uri("/sync/events")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let mut body = response.into_body();
    let frame = tokio::time::timeout(Duration::from_secs(1), body.frame())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    let chunk = String::from_utf8(frame.into_data().unwrap().to_vec()).unwrap();
    assert!(chunk.contains("event: server:state"), "{}", chunk);
    assert!(chunk.contains(r#""currentAssetId":"intro""#), "{}", chunk);
}

#[tokio::test]
async fn test_sync_api_mounts_on_server_from_spawned_task() {
    // L'extension doit pouvoir s'exécuter dans une tâche tokio (future Send)
    let (status, body) = tokio::spawn(async {
        use panelsync::SyncServerExt;

        let mut server = panelserver::Server::new("sync-test", "127.0.0.1", 0);
        let hub = server.init_sync_api().await.unwrap();
        hub.select_asset("intro").await.unwrap();
        call(server.router().await, "GET", "/api/current-state", None).await
    })
    .await
    .unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"currentAssetId": "intro", "isPlaying": false}));
}
