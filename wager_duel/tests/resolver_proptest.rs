/// Property-based tests for round resolution using proptest
///
/// These tests verify that every resolved round conserves units, never
/// takes more than the loser holds, and picks the winner the disparity rule
/// dictates, across a wide range of balances and wagers.
use proptest::prelude::*;
use wager_duel::game::{
    RuleApplied, Seat, SeatBalances, Units, Verdict,
    constants::DEFAULT_DISPARITY_MULTIPLIER,
    escalation::{Escalation, EscalationTracker},
    resolver::{double_timeout, resolve, resolve_timeout},
};

const MIN_WAGER: Units = 10;

// Strategy to generate a balance together with a legal wager against it
fn balance_and_wager() -> impl Strategy<Value = (Units, Units)> {
    (MIN_WAGER..=10_000u32).prop_flat_map(|balance| (Just(balance), MIN_WAGER..=balance))
}

fn seat_strategy() -> impl Strategy<Value = Seat> {
    prop_oneof![Just(Seat::A), Just(Seat::B)]
}

proptest! {
    #[test]
    fn test_resolution_conserves_units(
        (balance_a, wager_a) in balance_and_wager(),
        (balance_b, wager_b) in balance_and_wager(),
    ) {
        let outcome = resolve(balance_a, wager_a, balance_b, wager_b, DEFAULT_DISPARITY_MULTIPLIER);
        let before = SeatBalances::new(balance_a, balance_b);

        prop_assert_eq!(outcome.balances.total(), before.total());
    }

    #[test]
    fn test_transfer_never_exceeds_loser_balance(
        balance_a in 0u32..=10_000,
        wager_a in MIN_WAGER..=20_000u32,
        balance_b in 0u32..=10_000,
        wager_b in MIN_WAGER..=20_000u32,
    ) {
        let outcome = resolve(balance_a, wager_a, balance_b, wager_b, DEFAULT_DISPARITY_MULTIPLIER);

        if let Some(loser) = outcome.loser() {
            let before = SeatBalances::new(balance_a, balance_b);
            prop_assert!(outcome.transfer <= before.get(loser));
            prop_assert_eq!(outcome.capped, outcome.transfer < match loser {
                Seat::A => wager_a,
                Seat::B => wager_b,
            });
        }
    }

    #[test]
    fn test_draw_only_on_equal_wagers(
        (balance_a, wager_a) in balance_and_wager(),
        (balance_b, wager_b) in balance_and_wager(),
    ) {
        let outcome = resolve(balance_a, wager_a, balance_b, wager_b, DEFAULT_DISPARITY_MULTIPLIER);

        prop_assert_eq!(outcome.is_draw(), wager_a == wager_b);
        if outcome.is_draw() {
            prop_assert_eq!(outcome.transfer, 0);
        }
    }

    #[test]
    fn test_winner_follows_disparity_rule(
        (balance_a, wager_a) in balance_and_wager(),
        (balance_b, wager_b) in balance_and_wager(),
    ) {
        prop_assume!(wager_a != wager_b);
        let outcome = resolve(balance_a, wager_a, balance_b, wager_b, DEFAULT_DISPARITY_MULTIPLIER);

        let (high_seat, high, low) = if wager_a > wager_b {
            (Seat::A, wager_a, wager_b)
        } else {
            (Seat::B, wager_b, wager_a)
        };
        let disparity = u64::from(high) > u64::from(low) * u64::from(DEFAULT_DISPARITY_MULTIPLIER);

        if disparity {
            prop_assert_eq!(outcome.verdict, Verdict::Winner(high_seat.opponent()));
            prop_assert_eq!(outcome.rule, RuleApplied::Disparity);
        } else {
            prop_assert_eq!(outcome.verdict, Verdict::Winner(high_seat));
            prop_assert_eq!(outcome.rule, RuleApplied::Standard);
        }
    }

    #[test]
    fn test_timeout_pays_the_waiting_seat(
        balance_a in 0u32..=10_000,
        balance_b in 0u32..=10_000,
        wagered in seat_strategy(),
        wager in MIN_WAGER..=10_000u32,
    ) {
        let before = SeatBalances::new(balance_a, balance_b);
        let outcome = resolve_timeout(before, wagered, wager);

        prop_assert_eq!(outcome.verdict, Verdict::Winner(wagered));
        prop_assert_eq!(outcome.balances.total(), before.total());
        prop_assert!(outcome.transfer <= before.get(wagered.opponent()));
    }

    #[test]
    fn test_double_timeout_never_moves_units(
        balance_a in 0u32..=10_000,
        balance_b in 0u32..=10_000,
    ) {
        let balances = SeatBalances::new(balance_a, balance_b);
        let outcome = double_timeout(balances);

        prop_assert_eq!(outcome.transfer, 0);
        prop_assert_eq!(outcome.balances, balances);
    }

    #[test]
    fn test_escalation_terminal_exactly_at_limit(
        limit in 1u32..=10,
        balance_a in 0u32..=10_000,
        balance_b in 0u32..=10_000,
    ) {
        let balances = SeatBalances::new(balance_a, balance_b);
        let mut tracker = EscalationTracker::new(limit);

        for _ in 1..limit {
            let escalation = tracker.record_double_timeout(&balances);
            prop_assert!(!matches!(escalation, Escalation::Terminal { .. }), "escalation went terminal before the limit");
        }
        let terminal = tracker.record_double_timeout(&balances);
        prop_assert_eq!(terminal, Escalation::Terminal { verdict: Verdict::by_balance(&balances) });
    }
}
