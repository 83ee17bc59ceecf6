use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use http_body_util::BodyExt;
use panelcatalog::{CatalogProvider, api};
use serde_json::Value;
use tower::ServiceExt;

const CATALOG: &str = r#"{
    "playlist": [
        { "id": "logo", "type": "image", "title": "Logo", "filename": "logo.png" },
        { "id": "intro", "type": "video", "title": "Intro", "filename": "intro.mp4", "thumbnail": "intro.jpg" },
        { "id": "talk", "type": "youtube", "title": "Talk", "description": "Keynote", "videoId": "dQw4w9WgXcQ" }
    ]
}"#;

async fn call(router: Router, method: Method, uri: &str) -> (StatusCode, Value) {
    let response = router
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

fn catalog_file(dir: &tempfile::TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("assets.json");
    std::fs::write(&path, content).unwrap();
    path
}

#[tokio::test]
async fn test_assets_and_playlist() {
    let dir = tempfile::tempdir().unwrap();
    let provider = Arc::new(CatalogProvider::open(catalog_file(&dir, CATALOG)));
    let router = api::router(provider);

    let (status, body) = call(router.clone(), Method::GET, "/assets").await;
    assert_eq!(status, StatusCode::OK);
    let playlist = body["playlist"].as_array().unwrap();
    assert_eq!(playlist.len(), 3);
    assert_eq!(playlist[2]["videoId"], "dQw4w9WgXcQ");
    assert_eq!(playlist[0]["description"], "");

    let (status, body) = call(router, Method::GET, "/playlist").await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids, vec!["logo", "intro", "talk"]);
}

#[tokio::test]
async fn test_single_asset_lookup() {
    let dir = tempfile::tempdir().unwrap();
    let router = api::router(Arc::new(CatalogProvider::open(catalog_file(&dir, CATALOG))));

    let (status, body) = call(router.clone(), Method::GET, "/assets/intro").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["type"], "video");
    assert_eq!(body["thumbnail"], "intro.jpg");

    let (status, body) = call(router, Method::GET, "/assets/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("nope"));
}

#[tokio::test]
async fn test_unreadable_catalog_is_an_error_not_an_empty_list() {
    let dir = tempfile::tempdir().unwrap();
    let path = catalog_file(&dir, "{ broken");
    let provider = Arc::new(CatalogProvider::open(&path));
    let router = api::router(provider);

    for uri in ["/assets", "/playlist", "/assets/logo"] {
        let (status, body) = call(router.clone(), Method::GET, uri).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{}", uri);
        assert!(body["error"].is_string());
    }

    std::fs::write(&path, CATALOG).unwrap();
    let (status, body) = call(router.clone(), Method::POST, "/catalog/reload").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["assets"], 3);

    let (status, _) = call(router, Method::GET, "/playlist").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_catalog_api_mounts_on_server_from_spawned_task() {
    let dir = tempfile::tempdir().unwrap();
    let path = catalog_file(&dir, CATALOG);

    // L'extension doit pouvoir s'exécuter dans une tâche tokio (future Send)
    let (status, body) = tokio::spawn(async move {
        use panelcatalog::CatalogServerExt;

        let mut server = panelserver::Server::new("catalog-test", "127.0.0.1", 0);
        let provider = server.init_catalog_api(&path).await.unwrap();
        assert_eq!(provider.get().unwrap().len(), 3);
        call(server.router().await, Method::GET, "/api/assets/talk").await
    })
    .await
    .unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Talk");
}
