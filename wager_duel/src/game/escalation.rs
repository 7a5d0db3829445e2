//! Consecutive double-timeout tracking.

use super::entities::{Seat, SeatBalances, Verdict};

/// Classification of a double-timeout round.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Escalation {
    /// More double timeouts are needed before the match ends.
    Warning { count: u32, leader: Option<Seat> },
    /// The next double timeout decides the match.
    FinalWarning { leader: Option<Seat> },
    /// The limit was reached; the match is decided on balances.
    Terminal { verdict: Verdict },
}

#[derive(Debug)]
pub struct EscalationTracker {
    consecutive: u32,
    limit: u32,
}

impl EscalationTracker {
    #[must_use]
    pub fn new(limit: u32) -> Self {
        Self {
            consecutive: 0,
            limit: limit.max(1),
        }
    }

    /// At least one seat wagered this round.
    pub fn record_wagered_round(&mut self) {
        self.consecutive = 0;
    }

    /// Neither seat wagered this round.
    pub fn record_double_timeout(&mut self, balances: &SeatBalances) -> Escalation {
        self.consecutive = self.consecutive.saturating_add(1);
        if self.consecutive >= self.limit {
            Escalation::Terminal {
                verdict: Verdict::by_balance(balances),
            }
        } else if self.consecutive + 1 == self.limit {
            Escalation::FinalWarning {
                leader: balances.leader(),
            }
        } else {
            Escalation::Warning {
                count: self.consecutive,
                leader: balances.leader(),
            }
        }
    }

    pub fn reset(&mut self) {
        self.consecutive = 0;
    }

    #[must_use]
    pub fn consecutive(&self) -> u32 {
        self.consecutive
    }

    #[must_use]
    pub fn limit(&self) -> u32 {
        self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_double_timeouts_escalate() {
        let mut tracker = EscalationTracker::new(3);
        let balances = SeatBalances::new(230, 170);

        assert_eq!(
            tracker.record_double_timeout(&balances),
            Escalation::Warning {
                count: 1,
                leader: Some(Seat::A)
            }
        );
        assert_eq!(
            tracker.record_double_timeout(&balances),
            Escalation::FinalWarning {
                leader: Some(Seat::A)
            }
        );
        assert_eq!(
            tracker.record_double_timeout(&balances),
            Escalation::Terminal {
                verdict: Verdict::Winner(Seat::A)
            }
        );
    }

    #[test]
    fn test_even_balances_report_no_leader_and_draw() {
        let mut tracker = EscalationTracker::new(3);
        let balances = SeatBalances::uniform(200);

        assert_eq!(
            tracker.record_double_timeout(&balances),
            Escalation::Warning {
                count: 1,
                leader: None
            }
        );
        assert_eq!(
            tracker.record_double_timeout(&balances),
            Escalation::FinalWarning { leader: None }
        );
        assert_eq!(
            tracker.record_double_timeout(&balances),
            Escalation::Terminal {
                verdict: Verdict::Draw
            }
        );
    }

    #[test]
    fn test_wagered_round_resets_counter() {
        let mut tracker = EscalationTracker::new(3);
        let balances = SeatBalances::uniform(200);
        tracker.record_double_timeout(&balances);
        tracker.record_double_timeout(&balances);
        tracker.record_wagered_round();

        assert_eq!(tracker.consecutive(), 0);
        assert!(matches!(
            tracker.record_double_timeout(&balances),
            Escalation::Warning { count: 1, .. }
        ));
    }

    #[test]
    fn test_limit_of_one_is_immediately_terminal() {
        let mut tracker = EscalationTracker::new(1);
        assert!(matches!(
            tracker.record_double_timeout(&SeatBalances::new(150, 250)),
            Escalation::Terminal {
                verdict: Verdict::Winner(Seat::B)
            }
        ));
    }
}
