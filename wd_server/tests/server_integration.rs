//! Integration tests for the HTTP endpoints.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use std::path::PathBuf;
use tower::ServiceExt; // For `oneshot` method
use wager_duel::{
    ConnectionId,
    duel::{DuelActor, DuelConfig, DuelHandle},
};
use wd_server::api::{AppState, create_router};

/// Helper to create a test router backed by a running duel actor
fn create_test_server(static_dir: PathBuf) -> (axum::Router, DuelHandle) {
    let (actor, duel) = DuelActor::new(DuelConfig::default());
    tokio::spawn(actor.run());

    let app = create_router(AppState {
        duel: duel.clone(),
        static_dir,
    });
    (app, duel)
}

/// Helper to create a unique static directory with an index page
fn static_dir_with_index() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("wd_server_static_{}", ConnectionId::new()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("index.html"), "<h1>Wager Duel</h1>").unwrap();
    dir
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, body.to_vec())
}

#[tokio::test]
async fn test_health_check() {
    let (app, _duel) = create_test_server(PathBuf::from("public"));
    let (status, body) = get(app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["phase"], "waiting_for_players");
}

#[tokio::test]
async fn test_health_check_after_duel_closed() {
    let (app, duel) = create_test_server(PathBuf::from("public"));
    duel.close().await.unwrap();

    let (status, body) = get(app, "/health").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "unhealthy");
}

#[tokio::test]
async fn test_match_snapshot_endpoint() {
    let (app, _duel) = create_test_server(PathBuf::from("public"));
    let (status, body) = get(app, "/api/v1/match").await;

    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["phase"], "waiting_for_players");
    assert_eq!(json["round"], 0);
    assert_eq!(json["seats"].as_array().unwrap().len(), 2);
    assert_eq!(json["seats"][0]["label"], "Player 1");
    assert_eq!(json["seats"][0]["occupied"], false);
}

#[tokio::test]
async fn test_static_files_served() {
    let dir = static_dir_with_index();
    let (app, _duel) = create_test_server(dir.clone());

    let (status, body) = get(app.clone(), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(String::from_utf8(body).unwrap(), "<h1>Wager Duel</h1>");

    let (status, _) = get(app, "/missing.js").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let _ = std::fs::remove_dir_all(dir);
}
