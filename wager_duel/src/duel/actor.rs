//! Duel actor implementation with async message handling.

use super::{
    config::DuelConfig,
    messages::{DuelMessage, DuelResponse},
};
use crate::game::{
    ConnectionId, Match, MatchError, MatchSnapshot, Notification, Recipient, SessionToken,
};
use std::collections::HashMap;
use tokio::{
    sync::{mpsc, oneshot},
    time::{Duration, Instant, interval_at},
};

/// Inbox capacity of a duel actor
const INBOX_CAPACITY: usize = 100;

/// Duel actor handle for sending messages
#[derive(Clone, Debug)]
pub struct DuelHandle {
    sender: mpsc::Sender<DuelMessage>,
}

impl DuelHandle {
    /// Create a new duel handle
    pub fn new(sender: mpsc::Sender<DuelMessage>) -> Self {
        Self { sender }
    }

    /// Send a message to the duel
    pub async fn send(&self, message: DuelMessage) -> Result<(), String> {
        self.sender
            .send(message)
            .await
            .map_err(|_| "Duel is closed".to_string())
    }

    /// Seat `connection`; notifications for it arrive on `notifications`.
    pub async fn join(
        &self,
        connection: ConnectionId,
        session: Option<SessionToken>,
        notifications: mpsc::Sender<Notification>,
    ) -> Result<DuelResponse, String> {
        let (response, rx) = oneshot::channel();
        self.send(DuelMessage::Join {
            connection,
            session,
            sender: notifications,
            response,
        })
        .await?;
        rx.await.map_err(|_| "Duel dropped the request".to_string())
    }

    pub async fn leave(&self, connection: ConnectionId) -> Result<(), String> {
        self.send(DuelMessage::Leave { connection }).await
    }

    pub async fn submit_wager(
        &self,
        connection: ConnectionId,
        amount: i64,
    ) -> Result<DuelResponse, String> {
        let (response, rx) = oneshot::channel();
        self.send(DuelMessage::SubmitWager {
            connection,
            amount,
            response,
        })
        .await?;
        rx.await.map_err(|_| "Duel dropped the request".to_string())
    }

    pub async fn request_rematch(&self, connection: ConnectionId) -> Result<DuelResponse, String> {
        let (response, rx) = oneshot::channel();
        self.send(DuelMessage::RequestRematch {
            connection,
            response,
        })
        .await?;
        rx.await.map_err(|_| "Duel dropped the request".to_string())
    }

    /// Get a snapshot of the match
    pub async fn state(&self) -> Result<MatchSnapshot, String> {
        let (response, rx) = oneshot::channel();
        self.send(DuelMessage::GetState { response }).await?;
        rx.await.map_err(|_| "Duel dropped the request".to_string())
    }

    /// Stop the actor
    pub async fn close(&self) -> Result<DuelResponse, String> {
        let (response, rx) = oneshot::channel();
        self.send(DuelMessage::Close { response }).await?;
        rx.await.map_err(|_| "Duel dropped the request".to_string())
    }
}

/// Duel actor owning a single match
///
/// Every inbound event and every clock tick is applied to the match one at a
/// time, so the match never observes concurrent mutation.
pub struct DuelActor {
    /// Duel configuration
    config: DuelConfig,

    /// Match state machine
    game: Match,

    /// Message inbox
    inbox: mpsc::Receiver<DuelMessage>,

    /// Outbound channel per connection
    subscribers: HashMap<ConnectionId, mpsc::Sender<Notification>>,

    /// Timer generation the tick cadence is aligned to
    timer_generation: u64,

    /// Is duel closed
    is_closed: bool,
}

impl DuelActor {
    /// Create a new duel actor
    ///
    /// # Returns
    ///
    /// * `(DuelActor, DuelHandle)` - Actor and handle for sending messages
    pub fn new(config: DuelConfig) -> (Self, DuelHandle) {
        let (sender, inbox) = mpsc::channel(INBOX_CAPACITY);
        let game = Match::new(config.settings());

        let actor = Self {
            timer_generation: game.timer_generation(),
            config,
            game,
            inbox,
            subscribers: HashMap::new(),
            is_closed: false,
        };

        (actor, DuelHandle::new(sender))
    }

    /// Run the duel actor event loop
    pub async fn run(mut self) {
        log::info!("Duel '{}' starting", self.config.name);

        let tick_duration = Duration::from_secs(1);
        let mut tick_interval = interval_at(Instant::now() + tick_duration, tick_duration);

        loop {
            tokio::select! {
                message = self.inbox.recv() => {
                    let Some(message) = message else {
                        break;
                    };
                    self.handle_message(message);
                }

                _ = tick_interval.tick() => {
                    self.game.tick();
                }
            }

            // A freshly started round gets a full second before its first tick
            if self.game.timer_generation() != self.timer_generation {
                self.timer_generation = self.game.timer_generation();
                tick_interval.reset();
            }
            self.dispatch();

            if self.is_closed {
                break;
            }
        }

        log::info!("Duel '{}' closed", self.config.name);
    }

    /// Handle a duel message
    fn handle_message(&mut self, message: DuelMessage) {
        match message {
            DuelMessage::Join {
                connection,
                session,
                sender,
                response,
            } => {
                self.subscribers.insert(connection, sender);
                let result = match self.game.join(connection, session) {
                    Ok(seat) => DuelResponse::Seated(seat),
                    Err(err) => {
                        log::debug!("Join from {connection} rejected: {err}");
                        // Deliver the rejection before forgetting the connection
                        self.dispatch();
                        self.subscribers.remove(&connection);
                        DuelResponse::Rejected(err)
                    }
                };
                let _ = response.send(result);
            }

            DuelMessage::Leave { connection } => {
                self.subscribers.remove(&connection);
                if self.game.leave(connection).is_err() {
                    log::debug!("Unseated connection {connection} left");
                }
            }

            DuelMessage::SubmitWager {
                connection,
                amount,
                response,
            } => {
                let result = self.game.submit_wager(connection, amount);
                if let Err(err @ MatchError::InternalConsistency(_)) = &result {
                    log::error!("Duel '{}': {err}", self.config.name);
                }
                let _ = response.send(result.into());
            }

            DuelMessage::RequestRematch {
                connection,
                response,
            } => {
                let result = self.game.request_rematch(connection);
                let _ = response.send(result.into());
            }

            DuelMessage::GetState { response } => {
                let _ = response.send(self.game.snapshot());
            }

            DuelMessage::Close { response } => {
                self.is_closed = true;
                let _ = response.send(DuelResponse::Success);
            }
        }
    }

    /// Fan queued notifications out to their recipients
    fn dispatch(&mut self) {
        for envelope in self.game.drain_notifications() {
            let targets = match envelope.recipient {
                Recipient::Everyone => self.game.seated_connections(),
                Recipient::Seat(seat) => self.game.connection_of(seat).into_iter().collect(),
                Recipient::Connection(connection) => vec![connection],
            };
            for connection in targets {
                self.deliver(connection, envelope.notification.clone());
            }
        }
    }

    fn deliver(&mut self, connection: ConnectionId, notification: Notification) {
        let Some(sender) = self.subscribers.get(&connection) else {
            return;
        };
        match sender.try_send(notification) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                log::warn!("Subscriber {connection} channel full, dropping notification");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                log::debug!("Subscriber {connection} disconnected, removing");
                self.subscribers.remove(&connection);
            }
        }
    }
}
