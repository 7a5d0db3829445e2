//! Match error types.

use thiserror::Error;

use super::entities::Units;

/// Errors raised while applying an event to a match
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum MatchError {
    /// Both seats are taken; the connection should be turned away
    #[error("The game already has two players.")]
    SeatUnavailable,

    /// Wager outside `[min, max]`
    #[error("Your wager must be between {min} and {max} units.")]
    InvalidWager { min: Units, max: Units },

    /// Event from a connection that holds no seat
    #[error("You are not part of this game.")]
    NotSeated,

    /// Wager submitted before both seats are filled
    #[error("The match has not started yet.")]
    MatchNotInProgress,

    /// Wager submitted after the match ended
    #[error("The game has ended. Please start a new game.")]
    MatchOver,

    /// Rematch requested with an empty opposing seat
    #[error("Waiting for an opponent to join.")]
    AwaitingOpponent,

    /// Guard violated inside the lifecycle controller
    #[error("internal consistency error: {0}")]
    InternalConsistency(&'static str),
}

impl MatchError {
    /// Whether the transport should drop the connection
    pub fn is_fatal(&self) -> bool {
        matches!(self, MatchError::SeatUnavailable)
    }
}

/// Result type for match operations
pub type MatchResult<T> = Result<T, MatchError>;
