//! Wager duel engine - match lifecycle and round rules.
//!
//! This module provides the synchronous core of a match:
//! - Seat roster with optional reconnect windows
//! - Per-round countdown driven by an external one-second tick
//! - Balance ledger with sealed pending wagers
//! - Round resolution under the disparity rule
//! - Consecutive double-timeout escalation
//! - The [`Match`] state machine tying them together

pub mod constants;
pub mod entities;
pub mod errors;
pub mod escalation;
pub mod ledger;
pub mod notifications;
pub mod resolver;
pub mod roster;
pub mod state_machine;
pub mod timer;

pub use entities::{
    ConnectionId, MatchPhase, PlayerSeatView, RoundOutcome, RuleApplied, Seat, SeatBalances,
    SessionToken, Units, Verdict,
};
pub use errors::{MatchError, MatchResult};
pub use notifications::{EndReason, Envelope, Notification, Recipient};
pub use state_machine::{Match, MatchSettings, MatchSnapshot};
