//! Default match constants.

use super::entities::Units;

/// Units each seat holds when a match starts or is reset.
pub const DEFAULT_STARTING_BALANCE: Units = 200;

/// Smallest wager a seat may lock in.
pub const DEFAULT_MIN_WAGER: Units = 10;

/// A balance strictly below this ends the match.
pub const DEFAULT_BANKRUPTCY_THRESHOLD: Units = 20;

/// Seconds each round runs before timing out.
pub const DEFAULT_ROUND_DURATION_SECS: u32 = 60;

/// If the higher wager exceeds the lower one times this, the lower wager wins.
pub const DEFAULT_DISPARITY_MULTIPLIER: u32 = 4;

/// Consecutive double timeouts that end the match.
pub const DEFAULT_DOUBLE_TIMEOUT_LIMIT: u32 = 3;

/// Seconds a disconnected seat is held for its session. Zero disables reconnects.
pub const DEFAULT_RECONNECT_GRACE_SECS: u32 = 0;

/// Number of seats in a match.
pub const SEAT_COUNT: usize = 2;
