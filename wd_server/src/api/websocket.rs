//! WebSocket handler for real-time match play.
//!
//! # Connection Flow
//!
//! 1. Client connects via `GET /ws`, optionally with `?session=<token>` from
//!    an earlier `seat_assigned` notification
//! 2. The connection joins the match; a full match answers with an `error`
//!    notification and closes the socket
//! 3. Server spawns a send task forwarding match notifications
//! 4. Incoming client commands are forwarded to the duel actor
//! 5. On disconnect the connection leaves the match
//!
//! # Client Messages
//!
//! ```javascript
//! ws.send(JSON.stringify({ type: "wager", amount: 50 }));
//! ws.send(JSON.stringify({ type: "rematch" }));
//! ```
//!
//! # Server Messages
//!
//! Every message is a match notification tagged by `event`, e.g.
//! `{"event":"timer","remaining_secs":42}`.

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt, stream::SplitSink};
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use wager_duel::{ConnectionId, Notification, SessionToken, duel::DuelResponse};

use super::AppState;
use crate::{logging, metrics};

/// Outbound queue depth per connection
const NOTIFICATION_BUFFER: usize = 64;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    session: Option<String>,
}

/// Client messages received via WebSocket
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ClientMessage {
    /// Lock in a wager for the current round
    Wager { amount: i64 },
    /// Ready for a rematch
    Rematch,
}

/// Upgrade HTTP connection to WebSocket.
///
/// An unparsable `session` is ignored and the connection joins as a new
/// player.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
    State(state): State<AppState>,
) -> Response {
    let session = query
        .session
        .as_deref()
        .and_then(|token| token.parse::<SessionToken>().ok());

    ws.on_upgrade(move |socket| handle_socket(socket, session, state))
}

/// Handle an established WebSocket connection.
async fn handle_socket(socket: WebSocket, session: Option<SessionToken>, state: AppState) {
    let connection = ConnectionId::new();
    let (mut sender, mut receiver) = socket.split();

    metrics::websocket_connection_opened();
    logging::log_connection_event("opened", &connection.to_string(), None);

    let (notification_tx, mut notification_rx) =
        mpsc::channel::<Notification>(NOTIFICATION_BUFFER);

    match state
        .duel
        .join(connection, session, notification_tx.clone())
        .await
    {
        Ok(DuelResponse::Seated(seat)) => {
            info!("Connection {} seated as {}", connection, seat);
        }
        Ok(response) => {
            let reason = response.error_message().unwrap_or_default();
            metrics::joins_rejected_total();
            logging::log_connection_event("rejected", &connection.to_string(), Some(reason.as_str()));

            // The rejection notice is already queued for this connection
            while let Ok(notification) = notification_rx.try_recv() {
                if send_notification(&mut sender, &notification).await.is_err() {
                    break;
                }
            }
            let _ = sender.send(Message::Close(None)).await;
            metrics::websocket_connection_closed();
            return;
        }
        Err(e) => {
            error!("Duel unavailable for {}: {}", connection, e);
            let _ = sender.send(Message::Close(None)).await;
            metrics::websocket_connection_closed();
            return;
        }
    }

    let send_task = tokio::spawn(async move {
        while let Some(notification) = notification_rx.recv().await {
            if send_notification(&mut sender, &notification).await.is_err() {
                break;
            }
        }
    });

    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                metrics::websocket_messages_received();

                match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(client_msg) => {
                        handle_client_message(client_msg, connection, &state).await;
                    }
                    Err(e) => {
                        warn!("Failed to parse client message: {}", e);
                        let notification = Notification::Error {
                            message: "Invalid message format".to_string(),
                        };
                        if notification_tx.send(notification).await.is_err() {
                            break;
                        }
                    }
                }
            }
            Ok(Message::Close(_)) => {
                info!("WebSocket closed: connection={}", connection);
                break;
            }
            Err(e) => {
                error!("WebSocket error: {}", e);
                break;
            }
            _ => {}
        }
    }

    send_task.abort();

    if let Err(e) = state.duel.leave(connection).await {
        warn!("Failed to leave match for {}: {}", connection, e);
    }

    metrics::websocket_connection_closed();
    logging::log_connection_event("closed", &connection.to_string(), None);
}

/// Forward a client command to the duel actor.
///
/// Rejections are reported to the client by the match itself, so only
/// transport failures are handled here.
async fn handle_client_message(msg: ClientMessage, connection: ConnectionId, state: &AppState) {
    let result = match msg {
        ClientMessage::Wager { amount } => {
            let result = state.duel.submit_wager(connection, amount).await;
            if let Ok(response) = &result {
                metrics::wagers_submitted_total(response.is_success());
            }
            result
        }
        ClientMessage::Rematch => state.duel.request_rematch(connection).await,
    };

    match result {
        Ok(DuelResponse::Rejected(err)) => {
            info!("Connection {} rejected: {}", connection, err);
        }
        Ok(_) => {}
        Err(e) => error!("Duel unavailable for {}: {}", connection, e),
    }
}

async fn send_notification(
    sender: &mut SplitSink<WebSocket, Message>,
    notification: &Notification,
) -> Result<(), axum::Error> {
    let json = match serde_json::to_string(notification) {
        Ok(json) => json,
        Err(e) => {
            error!("Failed to serialize notification: {}", e);
            return Ok(());
        }
    };
    sender.send(Message::Text(json.into())).await?;
    metrics::websocket_messages_sent();
    Ok(())
}
