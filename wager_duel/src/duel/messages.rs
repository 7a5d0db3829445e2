//! Duel actor message types.

use tokio::sync::{mpsc, oneshot};

use crate::game::{ConnectionId, MatchError, MatchSnapshot, Notification, Seat, SessionToken};

/// Messages that can be sent to a DuelActor
#[derive(Debug)]
pub enum DuelMessage {
    /// Seat a connection and subscribe it to notifications
    Join {
        connection: ConnectionId,
        session: Option<SessionToken>,
        sender: mpsc::Sender<Notification>,
        response: oneshot::Sender<DuelResponse>,
    },

    /// Connection closed
    Leave { connection: ConnectionId },

    /// Lock in a wager for the current round
    SubmitWager {
        connection: ConnectionId,
        amount: i64,
        response: oneshot::Sender<DuelResponse>,
    },

    /// Ask for a rematch once the match is over
    RequestRematch {
        connection: ConnectionId,
        response: oneshot::Sender<DuelResponse>,
    },

    /// Get current match state
    GetState {
        response: oneshot::Sender<MatchSnapshot>,
    },

    /// Shut the actor down
    Close {
        response: oneshot::Sender<DuelResponse>,
    },
}

/// Response from duel operations
#[derive(Debug, Clone, PartialEq)]
pub enum DuelResponse {
    /// Operation succeeded
    Success,

    /// Connection holds this seat
    Seated(Seat),

    /// Operation failed
    Rejected(MatchError),
}

impl DuelResponse {
    /// Check if response is success
    pub fn is_success(&self) -> bool {
        matches!(self, DuelResponse::Success | DuelResponse::Seated(_))
    }

    /// Get error message if response is error
    pub fn error_message(&self) -> Option<String> {
        match self {
            DuelResponse::Rejected(err) => Some(err.to_string()),
            _ => None,
        }
    }
}

impl From<Result<(), MatchError>> for DuelResponse {
    fn from(result: Result<(), MatchError>) -> Self {
        match result {
            Ok(()) => DuelResponse::Success,
            Err(err) => DuelResponse::Rejected(err),
        }
    }
}
