use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// Placeholder for unit amounts (balances, wagers, transfers).
pub type Units = u32;

/// One of the two seats at the table.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Seat {
    #[serde(rename = "seat_a")]
    A,
    #[serde(rename = "seat_b")]
    B,
}

impl Seat {
    pub const ALL: [Seat; 2] = [Seat::A, Seat::B];

    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
        }
    }

    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }

    /// Display label shown to players.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::A => "Player 1",
            Self::B => "Player 2",
        }
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Identity of a live transport connection.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque token handed to a seated player so they can reclaim the seat
/// after a dropped connection.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SessionToken(Uuid);

impl SessionToken {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionToken {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionToken {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPhase {
    #[default]
    WaitingForPlayers,
    InProgress,
    MatchOver,
}

impl fmt::Display for MatchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::WaitingForPlayers => "waiting for players",
            Self::InProgress => "in progress",
            Self::MatchOver => "match over",
        };
        write!(f, "{repr}")
    }
}

/// Which rule decided a round.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleApplied {
    /// Higher wager wins (or equal wagers draw).
    Standard,
    /// Higher wager overwhelmed the lower one, so the lower wager wins.
    Disparity,
    /// Exactly one seat wagered before the timer ran out.
    Timeout,
    /// Neither seat wagered; no transfer.
    DoubleTimeout,
    /// The double-timeout limit was reached and the match was decided on balances.
    TripleTimeout,
}

impl fmt::Display for RuleApplied {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Standard => "standard rule",
            Self::Disparity => "disparity rule",
            Self::Timeout => "timeout",
            Self::DoubleTimeout => "double timeout",
            Self::TripleTimeout => "triple timeout",
        };
        write!(f, "{repr}")
    }
}

/// Result of a round or match: a draw or exactly one winning seat.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "kind", content = "seat", rename_all = "snake_case")]
pub enum Verdict {
    Draw,
    Winner(Seat),
}

impl Verdict {
    /// Strictly greater balance wins; equal balances draw.
    #[must_use]
    pub fn by_balance(balances: &SeatBalances) -> Self {
        match balances.seat_a.cmp(&balances.seat_b) {
            std::cmp::Ordering::Greater => Self::Winner(Seat::A),
            std::cmp::Ordering::Less => Self::Winner(Seat::B),
            std::cmp::Ordering::Equal => Self::Draw,
        }
    }

    #[must_use]
    pub fn winner(&self) -> Option<Seat> {
        match self {
            Self::Draw => None,
            Self::Winner(seat) => Some(*seat),
        }
    }

    #[must_use]
    pub fn is_draw(&self) -> bool {
        matches!(self, Self::Draw)
    }
}

/// Per-seat balances, serialized with one field per seat.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct SeatBalances {
    pub seat_a: Units,
    pub seat_b: Units,
}

impl SeatBalances {
    #[must_use]
    pub const fn new(seat_a: Units, seat_b: Units) -> Self {
        Self { seat_a, seat_b }
    }

    #[must_use]
    pub const fn uniform(amount: Units) -> Self {
        Self::new(amount, amount)
    }

    #[must_use]
    pub const fn get(&self, seat: Seat) -> Units {
        match seat {
            Seat::A => self.seat_a,
            Seat::B => self.seat_b,
        }
    }

    pub fn set(&mut self, seat: Seat, amount: Units) {
        match seat {
            Seat::A => self.seat_a = amount,
            Seat::B => self.seat_b = amount,
        }
    }

    /// Sum of both balances, widened so it can't overflow.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.seat_a as u64 + self.seat_b as u64
    }

    /// Seat holding strictly more units, if any.
    #[must_use]
    pub fn leader(&self) -> Option<Seat> {
        Verdict::by_balance(self).winner()
    }
}

/// Output of resolving one round. Not persisted; applied to the ledger and
/// used to compose notifications.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct RoundOutcome {
    pub verdict: Verdict,
    pub rule: RuleApplied,
    /// Units moved from the loser to the winner.
    pub transfer: Units,
    /// Whether the loser's wager was cut down to their balance.
    pub capped: bool,
    /// Balances after the transfer.
    pub balances: SeatBalances,
}

impl RoundOutcome {
    #[must_use]
    pub fn is_draw(&self) -> bool {
        self.verdict.is_draw()
    }

    #[must_use]
    pub fn winner(&self) -> Option<Seat> {
        self.verdict.winner()
    }

    #[must_use]
    pub fn loser(&self) -> Option<Seat> {
        self.winner().map(Seat::opponent)
    }
}

/// Public view of a seat. The pending wager amount stays sealed; only
/// whether one is locked in is shown.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PlayerSeatView {
    pub seat: Seat,
    pub label: String,
    pub occupied: bool,
    pub connected: bool,
    pub balance: Units,
    pub has_wagered: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    // === Seat Tests ===

    #[test]
    fn test_seat_opponent() {
        assert_eq!(Seat::A.opponent(), Seat::B);
        assert_eq!(Seat::B.opponent(), Seat::A);
    }

    #[test]
    fn test_seat_labels() {
        assert_eq!(Seat::A.to_string(), "Player 1");
        assert_eq!(Seat::B.to_string(), "Player 2");
    }

    #[test]
    fn test_seat_serializes_as_seat_name() {
        assert_eq!(serde_json::to_string(&Seat::A).unwrap(), "\"seat_a\"");
        assert_eq!(serde_json::to_string(&Seat::B).unwrap(), "\"seat_b\"");
    }

    // === Verdict Tests ===

    #[test]
    fn test_verdict_by_balance() {
        assert_eq!(
            Verdict::by_balance(&SeatBalances::new(210, 190)),
            Verdict::Winner(Seat::A)
        );
        assert_eq!(
            Verdict::by_balance(&SeatBalances::new(100, 300)),
            Verdict::Winner(Seat::B)
        );
        assert_eq!(
            Verdict::by_balance(&SeatBalances::uniform(200)),
            Verdict::Draw
        );
    }

    #[test]
    fn test_verdict_never_both_draw_and_winner() {
        for verdict in [Verdict::Draw, Verdict::Winner(Seat::A), Verdict::Winner(Seat::B)] {
            assert_ne!(verdict.is_draw(), verdict.winner().is_some());
        }
    }

    // === Balance Tests ===

    #[test]
    fn test_balances_get_set() {
        let mut balances = SeatBalances::uniform(200);
        balances.set(Seat::B, 150);
        assert_eq!(balances.get(Seat::A), 200);
        assert_eq!(balances.get(Seat::B), 150);
        assert_eq!(balances.total(), 350);
    }

    #[test]
    fn test_balances_total_does_not_overflow() {
        let balances = SeatBalances::uniform(Units::MAX);
        assert_eq!(balances.total(), 2 * u64::from(Units::MAX));
    }

    // === Token Tests ===

    #[test]
    fn test_session_token_round_trips_through_string() {
        let token = SessionToken::new();
        let parsed: SessionToken = token.to_string().parse().unwrap();
        assert_eq!(token, parsed);
        assert!("not-a-token".parse::<SessionToken>().is_err());
    }
}
