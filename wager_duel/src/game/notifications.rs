//! Outbound notifications produced by a match, addressed to one connection,
//! one seat, or both players.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{
    entities::{ConnectionId, RuleApplied, Seat, SeatBalances, SessionToken, Units},
    state_machine::MatchSnapshot,
};

/// Who a notification is for
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Recipient {
    /// Every seated connection
    Everyone,
    /// Whoever currently holds the seat
    Seat(Seat),
    /// A specific connection, seated or not
    Connection(ConnectionId),
}

/// Why a match ended
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    Bankruptcy,
    DoubleTimeouts,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Notification {
    SeatAssigned {
        seat: Seat,
        label: String,
        session: SessionToken,
    },
    PlayerJoined {
        seat: Seat,
        label: String,
    },
    PlayerLeft {
        seat: Seat,
    },
    PlayerDisconnected {
        seat: Seat,
        grace_secs: u32,
    },
    PlayerReconnected {
        seat: Seat,
    },
    MatchReady {
        balances: SeatBalances,
    },
    Timer {
        remaining_secs: u32,
    },
    OpponentLockedWager,
    WagerRejected {
        message: String,
        min: Units,
        max: Units,
    },
    RoundResult {
        round: u32,
        is_draw: bool,
        winner: Option<Seat>,
        rule: RuleApplied,
        transfer: Units,
        capped: bool,
        balances: SeatBalances,
        narrative: String,
    },
    GameLog {
        message: String,
    },
    MatchOver {
        is_draw: bool,
        winner: Option<Seat>,
        reason: EndReason,
        balances: SeatBalances,
    },
    MatchReset,
    RematchRequested {
        seat: Seat,
    },
    ResetComplete {
        balances: SeatBalances,
    },
    Snapshot {
        snapshot: MatchSnapshot,
    },
    Error {
        message: String,
    },
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::SeatAssigned { label, .. } => format!("seated as {label}"),
            Self::PlayerJoined { label, .. } => format!("{label} joined the game"),
            Self::PlayerLeft { seat } => format!("{seat} left the game"),
            Self::PlayerDisconnected { seat, grace_secs } => {
                format!("{seat} disconnected, seat held for {grace_secs}s")
            }
            Self::PlayerReconnected { seat } => format!("{seat} reconnected"),
            Self::MatchReady { .. } => "both players seated, match starting".to_string(),
            Self::Timer { remaining_secs } => format!("{remaining_secs}s remaining"),
            Self::OpponentLockedWager => "opponent locked in a wager".to_string(),
            Self::WagerRejected { message, .. } => message.clone(),
            Self::RoundResult { narrative, .. } => narrative.clone(),
            Self::GameLog { message } => message.clone(),
            Self::MatchOver { winner, .. } => match winner {
                Some(seat) => format!("match over, {seat} wins"),
                None => "match over, draw".to_string(),
            },
            Self::MatchReset => "match reset".to_string(),
            Self::RematchRequested { seat } => format!("{seat} wants a rematch"),
            Self::ResetComplete { .. } => "rematch starting".to_string(),
            Self::Snapshot { snapshot } => format!("match {}", snapshot.phase),
            Self::Error { message } => message.clone(),
        };
        write!(f, "{repr}")
    }
}

/// A notification paired with its recipient
#[derive(Clone, Debug, PartialEq)]
pub struct Envelope {
    pub recipient: Recipient,
    pub notification: Notification,
}

impl Envelope {
    pub fn new(recipient: Recipient, notification: Notification) -> Self {
        Self {
            recipient,
            notification,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_is_event_tagged() {
        let json = serde_json::to_value(Notification::Timer { remaining_secs: 42 }).unwrap();
        assert_eq!(json["event"], "timer");
        assert_eq!(json["remaining_secs"], 42);
    }

    #[test]
    fn test_unit_notification_serializes_tag_only() {
        let json = serde_json::to_string(&Notification::OpponentLockedWager).unwrap();
        assert_eq!(json, r#"{"event":"opponent_locked_wager"}"#);
    }

    #[test]
    fn test_round_result_carries_seat_balances() {
        let notification = Notification::RoundResult {
            round: 3,
            is_draw: false,
            winner: Some(Seat::B),
            rule: RuleApplied::Disparity,
            transfer: 50,
            capped: false,
            balances: SeatBalances::new(150, 250),
            narrative: "Player 2 wins".to_string(),
        };
        let json = serde_json::to_value(&notification).unwrap();

        assert_eq!(json["winner"], "seat_b");
        assert_eq!(json["rule"], "disparity");
        assert_eq!(json["balances"]["seat_a"], 150);
        assert_eq!(json["balances"]["seat_b"], 250);
    }
}
