//! HTTP/WebSocket API for the duel server.
//!
//! # Modules
//!
//! - [`duel`]: Read-only match state over HTTP
//! - [`websocket`]: Bidirectional connection carrying wagers and match notifications
//!
//! # Endpoints Overview
//!
//! ```text
//! GET  /health             - Server health status
//! GET  /api/v1/match       - Current match snapshot
//! GET  /ws?session=<token> - WebSocket (session optional, used to reclaim a seat)
//! GET  /*                  - Static client files
//! ```
//!
//! # CORS
//!
//! CORS is configured permissively for development. In production, configure
//! appropriate origins, methods, and headers.

pub mod duel;
pub mod websocket;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
};
use serde_json::json;
use std::path::PathBuf;
use tower_http::{cors::CorsLayer, services::ServeDir};
use wager_duel::duel::DuelHandle;

/// Application state shared across all HTTP handlers and WebSocket connections.
#[derive(Clone)]
pub struct AppState {
    /// Handle to the actor owning the match
    pub duel: DuelHandle,
    /// Directory of static client files
    pub static_dir: PathBuf,
}

/// Create the API router with all endpoints and middleware.
///
/// # Example
///
/// ```rust,no_run
/// # use wd_server::api::{create_router, AppState};
/// # use wager_duel::duel::{DuelActor, DuelConfig};
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let (actor, duel) = DuelActor::new(DuelConfig::default());
/// tokio::spawn(actor.run());
///
/// let app = create_router(AppState { duel, static_dir: "public".into() });
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```
pub fn create_router(state: AppState) -> Router {
    let v1_routes = Router::new().route("/match", get(duel::get_match));

    Router::new()
        .route("/health", get(health_check))
        .route("/ws", get(websocket::websocket_handler))
        .nest("/api/v1", v1_routes)
        .fallback_service(ServeDir::new(&state.static_dir))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint for monitoring and load balancers.
///
/// Returns `200 OK` when the duel actor answers, `503 Service Unavailable`
/// otherwise.
///
/// ```bash
/// curl http://localhost:3000/health
/// # {"status":"healthy","duel":true,"phase":"waiting_for_players","timestamp":"..."}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.duel.state().await.ok();
    let duel_healthy = snapshot.is_some();

    let status_code = if duel_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if duel_healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "duel": duel_healthy,
        "phase": snapshot.map(|snapshot| snapshot.phase),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}
