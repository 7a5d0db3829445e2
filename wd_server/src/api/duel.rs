//! Match state over HTTP.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use tracing::error;

use super::AppState;

/// Current match snapshot.
///
/// Pending wager amounts are never included; a seat only reports whether it
/// has wagered.
///
/// # Response
///
/// - `200 OK` with the snapshot
/// - `503 Service Unavailable` if the duel actor has stopped
pub async fn get_match(State(state): State<AppState>) -> Response {
    match state.duel.state().await {
        Ok(snapshot) => Json(snapshot).into_response(),
        Err(e) => {
            error!("Failed to read match state: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "error": e })),
            )
                .into_response()
        }
    }
}
