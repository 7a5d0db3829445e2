//! Round resolution rules.
//!
//! Everything here is pure: callers apply the returned [`RoundOutcome`] to
//! the ledger and clear wagers themselves.

use super::entities::{RoundOutcome, RuleApplied, Seat, SeatBalances, Units, Verdict};

/// Resolve a round in which both seats wagered.
///
/// Equal wagers draw. Otherwise the higher wager wins, unless it exceeds the
/// lower wager times `disparity_multiplier`, in which case the lower wager
/// wins instead. The loser pays their own wager, capped at their balance.
#[must_use]
pub fn resolve(
    balance_a: Units,
    wager_a: Units,
    balance_b: Units,
    wager_b: Units,
    disparity_multiplier: u32,
) -> RoundOutcome {
    let balances = SeatBalances::new(balance_a, balance_b);
    if wager_a == wager_b {
        return RoundOutcome {
            verdict: Verdict::Draw,
            rule: RuleApplied::Standard,
            transfer: 0,
            capped: false,
            balances,
        };
    }

    let (high_seat, high, low) = if wager_a > wager_b {
        (Seat::A, wager_a, wager_b)
    } else {
        (Seat::B, wager_b, wager_a)
    };

    let (winner, rule) = if u64::from(high) > u64::from(low) * u64::from(disparity_multiplier) {
        (high_seat.opponent(), RuleApplied::Disparity)
    } else {
        (high_seat, RuleApplied::Standard)
    };

    let losing_wager = match winner.opponent() {
        Seat::A => wager_a,
        Seat::B => wager_b,
    };
    transfer(balances, winner, losing_wager, rule)
}

/// Resolve a round where only `wagered` locked in `wager` before the timer
/// ran out. The seat that timed out pays that wager, capped at its balance.
#[must_use]
pub fn resolve_timeout(balances: SeatBalances, wagered: Seat, wager: Units) -> RoundOutcome {
    transfer(balances, wagered, wager, RuleApplied::Timeout)
}

/// Neither seat wagered. Nothing moves.
///
/// The verdict is a draw, so `is_draw` alone does not tell this apart from an
/// equal-wager round. Clients check `rule` for [`RuleApplied::DoubleTimeout`].
#[must_use]
pub fn double_timeout(balances: SeatBalances) -> RoundOutcome {
    RoundOutcome {
        verdict: Verdict::Draw,
        rule: RuleApplied::DoubleTimeout,
        transfer: 0,
        capped: false,
        balances,
    }
}

fn transfer(
    mut balances: SeatBalances,
    winner: Seat,
    owed: Units,
    rule: RuleApplied,
) -> RoundOutcome {
    let loser = winner.opponent();
    let loser_balance = balances.get(loser);
    let amount = owed.min(loser_balance);

    balances.set(loser, loser_balance - amount);
    balances.set(winner, balances.get(winner).saturating_add(amount));

    RoundOutcome {
        verdict: Verdict::Winner(winner),
        rule,
        transfer: amount,
        capped: amount < owed,
        balances,
    }
}
