//! # Wager Duel
//!
//! A two-player sealed-wager game engine with an async match coordinator.
//!
//! Each player starts with the same balance and, every round, secretly
//! commits a wager before the round clock runs out. Once both wagers are in
//! they are revealed and the round is settled:
//!
//! - Equal wagers draw and nothing moves
//! - Otherwise the higher wager wins the loser's wager
//! - Unless it is more than four times the lower one, in which case the
//!   lower wager wins instead (the disparity rule)
//!
//! A player who lets the clock expire while the opponent has wagered pays
//! that wager. Rounds where nobody wagers escalate; three in a row end the
//! match on balances. A balance below the bankruptcy threshold ends it too.
//!
//! ## Core Modules
//!
//! - [`game`]: Roster, timer, ledger, resolver and the match state machine
//! - [`duel`]: Actor that serializes events for one match and fans out notifications
//!
//! ## Example
//!
//! ```
//! use wager_duel::{ConnectionId, Match, MatchPhase};
//!
//! let mut game = Match::default();
//! let (a, b) = (ConnectionId::new(), ConnectionId::new());
//! game.join(a, None).unwrap();
//! game.join(b, None).unwrap();
//! assert_eq!(game.phase(), MatchPhase::InProgress);
//!
//! game.submit_wager(a, 30).unwrap();
//! game.submit_wager(b, 20).unwrap();
//! assert_eq!(game.balances().seat_a, 220);
//! ```

/// Core game logic, entities, and state machine.
pub mod game;
pub use game::{
    ConnectionId, EndReason, Envelope, Match, MatchError, MatchPhase, MatchResult, MatchSettings,
    MatchSnapshot, Notification, Recipient, RuleApplied, Seat, SeatBalances, SessionToken, Units,
    Verdict, constants,
};

/// Async match coordinator.
pub mod duel;
pub use duel::{DuelActor, DuelConfig, DuelHandle, DuelMessage, DuelResponse, RoundSpeed};
