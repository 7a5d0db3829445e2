//! Per-round countdown.
//!
//! The timer holds no clock of its own. Whoever drives the match calls
//! [`RoundTimer::tick`] once per second; the countdown only advances while it
//! is live, so a canceled or expired timer can never fire again.

/// What a single tick produced.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TimerEvent {
    /// Seconds left in the round.
    Tick(u32),
    /// Countdown reached zero. Fired exactly once per start.
    Expired,
}

#[derive(Debug, Default)]
pub struct RoundTimer {
    remaining: u32,
    live: bool,
    generation: u64,
}

impl RoundTimer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fresh countdown, replacing any running one.
    pub fn start(&mut self, duration_secs: u32) {
        self.cancel();
        self.remaining = duration_secs;
        self.live = true;
        self.generation = self.generation.wrapping_add(1);
    }

    /// Stop the countdown. No-op if it already expired or was never started.
    pub fn cancel(&mut self) {
        self.live = false;
    }

    /// Advance by one second.
    pub fn tick(&mut self) -> Option<TimerEvent> {
        if !self.live {
            return None;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.live = false;
            Some(TimerEvent::Expired)
        } else {
            Some(TimerEvent::Tick(self.remaining))
        }
    }

    #[must_use]
    pub fn is_live(&self) -> bool {
        self.live
    }

    /// Seconds left, or zero when not running.
    #[must_use]
    pub fn remaining(&self) -> u32 {
        if self.live { self.remaining } else { 0 }
    }

    /// Bumped on every start so a driver can realign its tick cadence.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_down_then_expires_once() {
        let mut timer = RoundTimer::new();
        timer.start(3);

        assert_eq!(timer.tick(), Some(TimerEvent::Tick(2)));
        assert_eq!(timer.tick(), Some(TimerEvent::Tick(1)));
        assert_eq!(timer.tick(), Some(TimerEvent::Expired));
        assert_eq!(timer.tick(), None);
        assert!(!timer.is_live());
    }

    #[test]
    fn test_cancel_suppresses_expiry() {
        let mut timer = RoundTimer::new();
        timer.start(1);
        timer.cancel();

        assert_eq!(timer.tick(), None);
        assert_eq!(timer.remaining(), 0);
    }

    #[test]
    fn test_cancel_after_expiry_is_noop() {
        let mut timer = RoundTimer::new();
        timer.start(1);
        assert_eq!(timer.tick(), Some(TimerEvent::Expired));

        timer.cancel();
        assert_eq!(timer.tick(), None);
    }

    #[test]
    fn test_restart_replaces_running_countdown() {
        let mut timer = RoundTimer::new();
        timer.start(2);
        let first = timer.generation();
        assert_eq!(timer.tick(), Some(TimerEvent::Tick(1)));

        timer.start(5);
        assert_ne!(timer.generation(), first);
        assert_eq!(timer.remaining(), 5);
        assert_eq!(timer.tick(), Some(TimerEvent::Tick(4)));
    }

    #[test]
    fn test_never_started_timer_is_idle() {
        let mut timer = RoundTimer::new();
        assert_eq!(timer.tick(), None);
        assert_eq!(timer.generation(), 0);
    }
}
