//! Match lifecycle state machine.
//!
//! A [`Match`] owns the roster, ledger, escalation tracker and round timer of
//! a single two-player match. Every inbound event is applied synchronously;
//! the resulting notifications are queued and handed to the driver through
//! [`Match::drain_notifications`] once the state is consistent again.

use chrono::{DateTime, Utc};
use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use super::{
    constants::{
        DEFAULT_BANKRUPTCY_THRESHOLD, DEFAULT_DISPARITY_MULTIPLIER, DEFAULT_DOUBLE_TIMEOUT_LIMIT,
        DEFAULT_MIN_WAGER, DEFAULT_RECONNECT_GRACE_SECS, DEFAULT_ROUND_DURATION_SECS,
        DEFAULT_STARTING_BALANCE,
    },
    entities::{
        ConnectionId, MatchPhase, PlayerSeatView, RoundOutcome, RuleApplied, Seat, SeatBalances,
        SessionToken, Units, Verdict,
    },
    errors::{MatchError, MatchResult},
    escalation::{Escalation, EscalationTracker},
    ledger::Ledger,
    notifications::{EndReason, Envelope, Notification, Recipient},
    resolver,
    roster::Roster,
    timer::{RoundTimer, TimerEvent},
};

/// Match configuration constants
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct MatchSettings {
    pub starting_balance: Units,
    pub min_wager: Units,
    pub bankruptcy_threshold: Units,
    pub round_duration_secs: u32,
    pub disparity_multiplier: u32,
    pub double_timeout_limit: u32,
    pub reconnect_grace_secs: u32,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            starting_balance: DEFAULT_STARTING_BALANCE,
            min_wager: DEFAULT_MIN_WAGER,
            bankruptcy_threshold: DEFAULT_BANKRUPTCY_THRESHOLD,
            round_duration_secs: DEFAULT_ROUND_DURATION_SECS,
            disparity_multiplier: DEFAULT_DISPARITY_MULTIPLIER,
            double_timeout_limit: DEFAULT_DOUBLE_TIMEOUT_LIMIT,
            reconnect_grace_secs: DEFAULT_RECONNECT_GRACE_SECS,
        }
    }
}

/// Serializable view of a match
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct MatchSnapshot {
    pub phase: MatchPhase,
    /// Rounds resolved so far in this match
    pub round: u32,
    pub seats: Vec<PlayerSeatView>,
    pub remaining_secs: u32,
    pub consecutive_double_timeouts: u32,
    pub started_at: Option<DateTime<Utc>>,
}

#[derive(Debug)]
pub struct Match {
    settings: MatchSettings,
    phase: MatchPhase,
    roster: Roster,
    ledger: Ledger,
    escalation: EscalationTracker,
    timer: RoundTimer,
    /// Rounds resolved; round `round + 1` is the one in play.
    round: u32,
    rematch_ready: [bool; 2],
    started_at: Option<DateTime<Utc>>,
    outbox: VecDeque<Envelope>,
}

impl Default for Match {
    fn default() -> Self {
        Self::new(MatchSettings::default())
    }
}

impl Match {
    #[must_use]
    pub fn new(settings: MatchSettings) -> Self {
        Self {
            phase: MatchPhase::WaitingForPlayers,
            roster: Roster::new(),
            ledger: Ledger::new(settings.starting_balance),
            escalation: EscalationTracker::new(settings.double_timeout_limit),
            timer: RoundTimer::new(),
            round: 0,
            rematch_ready: [false; 2],
            started_at: None,
            outbox: VecDeque::new(),
            settings,
        }
    }

    /// Seat a connection. With a `session` token from an earlier seat that
    /// is still inside its reconnect window, that seat is handed back.
    pub fn join(
        &mut self,
        connection: ConnectionId,
        session: Option<SessionToken>,
    ) -> MatchResult<Seat> {
        if let Some(seat) = self.roster.seat_of(connection) {
            self.send_seat_assignment(connection, seat);
            return Ok(seat);
        }

        if let Some(token) = session
            && let Some(seat) = self.roster.claim_with_session(connection, token)
        {
            info!("{seat} reconnected on {connection}");
            self.send_seat_assignment(connection, seat);
            self.push(Recipient::Everyone, Notification::PlayerReconnected { seat });
            let snapshot = self.snapshot();
            self.push(
                Recipient::Connection(connection),
                Notification::Snapshot { snapshot },
            );
            return Ok(seat);
        }

        let seat = match self.roster.claim_seat(connection) {
            Ok(seat) => seat,
            Err(err) => return Err(self.reject(connection, err)),
        };
        self.ledger
            .reset_seat(seat, self.settings.starting_balance);
        self.rematch_ready[seat.index()] = false;

        info!("{seat} has joined the game on {connection}");
        self.send_seat_assignment(connection, seat);
        self.push(
            Recipient::Everyone,
            Notification::PlayerJoined {
                seat,
                label: seat.label().to_string(),
            },
        );

        if self.roster.is_full() && self.phase == MatchPhase::WaitingForPlayers {
            self.start_match();
        }
        Ok(seat)
    }

    /// The connection went away. The seat is held for the reconnect window
    /// when one is configured and a match is running; otherwise it is
    /// released immediately.
    pub fn leave(&mut self, connection: ConnectionId) -> MatchResult<Seat> {
        let seat = self
            .roster
            .seat_of(connection)
            .ok_or(MatchError::NotSeated)?;
        let grace_secs = self.settings.reconnect_grace_secs;

        if grace_secs > 0 && self.phase != MatchPhase::WaitingForPlayers {
            self.roster.mark_disconnected(connection, grace_secs);
            self.rematch_ready[seat.index()] = false;
            info!("{seat} disconnected, holding seat for {grace_secs}s");
            self.push(
                Recipient::Everyone,
                Notification::PlayerDisconnected { seat, grace_secs },
            );
        } else {
            info!("{seat} disconnected");
            self.roster.release_seat(connection);
            self.seat_released(seat);
        }
        Ok(seat)
    }

    /// Lock in a wager for the round in play. `amount` is taken as it came
    /// off the wire so negative or oversized values are rejected like any
    /// other out-of-range wager.
    pub fn submit_wager(&mut self, connection: ConnectionId, amount: i64) -> MatchResult<()> {
        let seat = self.require_seat(connection)?;
        match self.phase {
            MatchPhase::WaitingForPlayers => {
                return Err(self.reject(connection, MatchError::MatchNotInProgress));
            }
            MatchPhase::MatchOver => return Err(self.reject(connection, MatchError::MatchOver)),
            MatchPhase::InProgress => {}
        }

        let min_wager = self.settings.min_wager;
        let placed = match Units::try_from(amount) {
            Ok(amount) => self.ledger.place_wager(seat, amount, min_wager),
            Err(_) => Err(MatchError::InvalidWager {
                min: min_wager,
                max: self.ledger.balance(seat),
            }),
        };
        let placed = match placed {
            Ok(placed) => placed,
            Err(err) => return Err(self.reject(connection, err)),
        };

        debug!("{seat} placed a wager of {amount} units");
        if placed.first_lock && !placed.opponent_wagered {
            self.push(
                Recipient::Seat(seat.opponent()),
                Notification::OpponentLockedWager,
            );
        }

        if self.ledger.both_wagered() {
            self.timer.cancel();
            self.resolve_wagered_round()?;
        }
        Ok(())
    }

    /// Mark the sender ready for a rematch. Once both seats are ready the
    /// match restarts from starting balances.
    pub fn request_rematch(&mut self, connection: ConnectionId) -> MatchResult<()> {
        let seat = self.require_seat(connection)?;
        if !self.roster.is_full() || self.phase == MatchPhase::WaitingForPlayers {
            return Err(self.reject(connection, MatchError::AwaitingOpponent));
        }

        self.rematch_ready[seat.index()] = true;
        if self.rematch_ready.iter().all(|ready| *ready) {
            self.reset_match();
        } else {
            info!("{seat} is ready for a rematch");
            self.push(
                Recipient::Seat(seat.opponent()),
                Notification::RematchRequested { seat },
            );
        }
        Ok(())
    }

    /// Advance one second: reconnect windows first, then the round timer.
    pub fn tick(&mut self) {
        for seat in self.roster.tick_grace() {
            info!("{seat} did not reconnect in time");
            self.roster.release(seat);
            self.seat_released(seat);
        }

        if self.phase != MatchPhase::InProgress {
            return;
        }

        match self.timer.tick() {
            None => {}
            Some(TimerEvent::Tick(remaining_secs)) => {
                self.push(Recipient::Everyone, Notification::Timer { remaining_secs });
            }
            Some(TimerEvent::Expired) => {
                self.push(
                    Recipient::Everyone,
                    Notification::Timer { remaining_secs: 0 },
                );
                if let Err(err) = self.handle_timeout() {
                    error!("Round timeout aborted: {err}");
                }
            }
        }
    }

    /// Take every queued notification.
    pub fn drain_notifications(&mut self) -> VecDeque<Envelope> {
        std::mem::take(&mut self.outbox)
    }

    #[must_use]
    pub fn snapshot(&self) -> MatchSnapshot {
        let seats = Seat::ALL
            .into_iter()
            .map(|seat| PlayerSeatView {
                seat,
                label: seat.label().to_string(),
                occupied: self.roster.is_occupied(seat),
                connected: self.roster.is_connected(seat),
                balance: self.ledger.balance(seat),
                has_wagered: self.ledger.wager(seat).is_some(),
            })
            .collect();

        MatchSnapshot {
            phase: self.phase,
            round: self.round,
            seats,
            remaining_secs: self.timer.remaining(),
            consecutive_double_timeouts: self.escalation.consecutive(),
            started_at: self.started_at,
        }
    }

    #[must_use]
    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    #[must_use]
    pub fn round(&self) -> u32 {
        self.round
    }

    #[must_use]
    pub fn settings(&self) -> &MatchSettings {
        &self.settings
    }

    #[must_use]
    pub fn balances(&self) -> SeatBalances {
        self.ledger.balances()
    }

    #[must_use]
    pub fn seat_of(&self, connection: ConnectionId) -> Option<Seat> {
        self.roster.seat_of(connection)
    }

    #[must_use]
    pub fn connection_of(&self, seat: Seat) -> Option<ConnectionId> {
        self.roster.connection_of(seat)
    }

    /// Connections currently attached to a seat.
    #[must_use]
    pub fn seated_connections(&self) -> Vec<ConnectionId> {
        Seat::ALL
            .into_iter()
            .filter_map(|seat| self.roster.connection_of(seat))
            .collect()
    }

    #[must_use]
    pub fn consecutive_double_timeouts(&self) -> u32 {
        self.escalation.consecutive()
    }

    #[must_use]
    pub fn remaining_secs(&self) -> u32 {
        self.timer.remaining()
    }

    #[must_use]
    pub fn timer_generation(&self) -> u64 {
        self.timer.generation()
    }

    fn start_match(&mut self) {
        self.phase = MatchPhase::InProgress;
        self.round = 0;
        self.escalation.reset();
        self.ledger.clear_wagers();
        self.rematch_ready = [false; 2];
        self.started_at = Some(Utc::now());

        info!("Two players are ready. Match starting");
        self.push(
            Recipient::Everyone,
            Notification::MatchReady {
                balances: self.ledger.balances(),
            },
        );
        self.start_round_timer();
    }

    fn start_round_timer(&mut self) {
        let duration = self.settings.round_duration_secs;
        self.timer.start(duration);
        self.push(
            Recipient::Everyone,
            Notification::Timer {
                remaining_secs: duration,
            },
        );
    }

    fn resolve_wagered_round(&mut self) -> MatchResult<()> {
        if !self.roster.is_full() {
            return self.abort_round("resolution attempted with an incomplete roster");
        }
        let (Some(wager_a), Some(wager_b)) =
            (self.ledger.wager(Seat::A), self.ledger.wager(Seat::B))
        else {
            return self.abort_round("resolution attempted without both wagers");
        };

        let outcome = resolver::resolve(
            self.ledger.balance(Seat::A),
            wager_a,
            self.ledger.balance(Seat::B),
            wager_b,
            self.settings.disparity_multiplier,
        );
        self.escalation.record_wagered_round();
        self.round += 1;

        let round = self.round;
        let narrative = match outcome.verdict {
            Verdict::Draw => {
                format!("Round {round}: Both players wagered {wager_a} units. It's a draw!")
            }
            Verdict::Winner(winner) => {
                let mut note = String::new();
                if outcome.rule == RuleApplied::Disparity {
                    note.push_str(" due to the disparity rule");
                }
                if outcome.capped {
                    note.push_str(&format!(
                        " (transfer capped at {} units)",
                        outcome.transfer
                    ));
                }
                format!(
                    "Round {round}: {} wagered {wager_a}, {} wagered {wager_b}. {winner} wins{note}!",
                    Seat::A,
                    Seat::B
                )
            }
        };

        self.finish_round(outcome, narrative);
        Ok(())
    }

    fn handle_timeout(&mut self) -> MatchResult<()> {
        if !self.roster.is_full() {
            return self.abort_round("timeout handled with an incomplete roster");
        }

        let balances = self.ledger.balances();
        match (self.ledger.wager(Seat::A), self.ledger.wager(Seat::B)) {
            (Some(_), Some(_)) => self.resolve_wagered_round(),
            (Some(wager), None) | (None, Some(wager)) => {
                let wagered = if self.ledger.wager(Seat::A).is_some() {
                    Seat::A
                } else {
                    Seat::B
                };
                self.escalation.record_wagered_round();
                self.round += 1;

                let outcome = resolver::resolve_timeout(balances, wagered, wager);
                let narrative = format!(
                    "{} timed out and lost {} units to {wagered}.",
                    wagered.opponent(),
                    outcome.transfer
                );
                self.finish_round(outcome, narrative);
                Ok(())
            }
            (None, None) => {
                self.round += 1;
                let outcome = resolver::double_timeout(balances);
                let limit = self.escalation.limit();

                match self.escalation.record_double_timeout(&balances) {
                    Escalation::Warning { leader, .. } => {
                        let standing = match leader {
                            Some(seat) => format!("{seat} currently leads."),
                            None => "Balances are even.".to_string(),
                        };
                        let narrative = format!(
                            "Double timeout. After {limit} consecutive double timeouts in a row, \
                             the player with the most units will win the game. {standing}"
                        );
                        self.finish_round(outcome, narrative);
                    }
                    Escalation::FinalWarning { leader } => {
                        let narrative = match leader {
                            Some(_) => "Double timeout. If the next round is a double timeout, \
                                        the player with the most units will win the game."
                                .to_string(),
                            None => "Double timeout. If the next round is a double timeout, \
                                     the match will end in a draw."
                                .to_string(),
                        };
                        self.finish_round(outcome, narrative);
                    }
                    Escalation::Terminal { verdict } => {
                        let outcome = RoundOutcome {
                            verdict,
                            rule: RuleApplied::TripleTimeout,
                            ..outcome
                        };
                        self.ledger.clear_wagers();
                        self.push_round_result(
                            &outcome,
                            format!("Double timeout. {limit} consecutive double timeouts end the match."),
                        );
                        self.announce_double_timeout_ending(verdict, limit);
                        self.end_match(verdict, EndReason::DoubleTimeouts);
                    }
                }
                Ok(())
            }
        }
    }

    fn announce_double_timeout_ending(&mut self, verdict: Verdict, limit: u32) {
        match verdict {
            Verdict::Winner(winner) => {
                self.push(
                    Recipient::Seat(winner),
                    Notification::GameLog {
                        message: format!(
                            "Game Over. You won due to {limit} consecutive double timeouts."
                        ),
                    },
                );
                self.push(
                    Recipient::Seat(winner.opponent()),
                    Notification::GameLog {
                        message: format!(
                            "Game Over. You lost due to {limit} consecutive double timeouts."
                        ),
                    },
                );
            }
            Verdict::Draw => {
                self.push(
                    Recipient::Everyone,
                    Notification::GameLog {
                        message: format!(
                            "Game Over. The game was a draw due to {limit} consecutive double timeouts."
                        ),
                    },
                );
            }
        }
    }

    /// Apply a resolved round, then either end the match or start the next
    /// round.
    fn finish_round(&mut self, outcome: RoundOutcome, narrative: String) {
        self.ledger.apply_balances(outcome.balances);
        self.ledger.clear_wagers();
        self.push_round_result(&outcome, narrative);

        match self.bankruptcy_verdict() {
            Some(verdict) => self.end_match(verdict, EndReason::Bankruptcy),
            None => self.start_round_timer(),
        }
    }

    fn push_round_result(&mut self, outcome: &RoundOutcome, narrative: String) {
        info!("{narrative}");
        self.push(
            Recipient::Everyone,
            Notification::RoundResult {
                round: self.round,
                is_draw: outcome.is_draw(),
                winner: outcome.winner(),
                rule: outcome.rule,
                transfer: outcome.transfer,
                capped: outcome.capped,
                balances: outcome.balances,
                narrative,
            },
        );
    }

    /// A seat strictly below the threshold loses. Both below is decided on
    /// balances.
    fn bankruptcy_verdict(&self) -> Option<Verdict> {
        let threshold = self.settings.bankruptcy_threshold;
        let balances = self.ledger.balances();
        match (
            balances.seat_a < threshold,
            balances.seat_b < threshold,
        ) {
            (false, false) => None,
            (true, false) => Some(Verdict::Winner(Seat::B)),
            (false, true) => Some(Verdict::Winner(Seat::A)),
            (true, true) => Some(Verdict::by_balance(&balances)),
        }
    }

    fn end_match(&mut self, verdict: Verdict, reason: EndReason) {
        self.timer.cancel();
        self.phase = MatchPhase::MatchOver;
        self.rematch_ready = [false; 2];

        match verdict.winner() {
            Some(seat) => info!("Game over! Winner: {seat}"),
            None => info!("Game over! Draw"),
        }
        self.push(
            Recipient::Everyone,
            Notification::Timer { remaining_secs: 0 },
        );
        self.push(
            Recipient::Everyone,
            Notification::MatchOver {
                is_draw: verdict.is_draw(),
                winner: verdict.winner(),
                reason,
                balances: self.ledger.balances(),
            },
        );
    }

    fn reset_match(&mut self) {
        self.ledger.reset(self.settings.starting_balance);
        self.round = 0;
        self.escalation.reset();
        self.rematch_ready = [false; 2];
        self.phase = MatchPhase::InProgress;
        self.started_at = Some(Utc::now());

        info!("Game reset successfully!");
        self.push(
            Recipient::Everyone,
            Notification::ResetComplete {
                balances: self.ledger.balances(),
            },
        );
        self.start_round_timer();
    }

    /// Follow-up once `seat` left the roster. A running or finished match is
    /// abandoned.
    fn seat_released(&mut self, seat: Seat) {
        self.rematch_ready[seat.index()] = false;
        self.ledger
            .reset_seat(seat, self.settings.starting_balance);
        info!("Slot {} is now available.", seat.index() + 1);
        self.push(Recipient::Everyone, Notification::PlayerLeft { seat });

        if self.phase != MatchPhase::WaitingForPlayers {
            self.abort_match();
        }
    }

    fn abort_match(&mut self) {
        self.timer.cancel();
        self.phase = MatchPhase::WaitingForPlayers;
        self.round = 0;
        self.escalation.reset();
        self.ledger.reset(self.settings.starting_balance);
        self.rematch_ready = [false; 2];
        self.started_at = None;

        info!("Game reset due to disconnection.");
        self.push(Recipient::Everyone, Notification::MatchReset);

        // A seat still inside its reconnect window has no match to return to.
        for seat in Seat::ALL {
            if self.roster.is_occupied(seat) && !self.roster.is_connected(seat) {
                self.roster.release(seat);
                info!("Slot {} is now available.", seat.index() + 1);
                self.push(Recipient::Everyone, Notification::PlayerLeft { seat });
            }
        }
    }

    /// A guard inside the controller failed. Discard the round's wagers
    /// without touching balances and keep the match running if it can.
    fn abort_round(&mut self, reason: &'static str) -> MatchResult<()> {
        error!("Aborting round: {reason}");
        self.ledger.clear_wagers();
        if self.phase == MatchPhase::InProgress && self.roster.is_full() {
            self.start_round_timer();
        } else {
            self.timer.cancel();
        }
        Err(MatchError::InternalConsistency(reason))
    }

    fn require_seat(&mut self, connection: ConnectionId) -> MatchResult<Seat> {
        match self.roster.seat_of(connection) {
            Some(seat) => Ok(seat),
            None => Err(self.reject(connection, MatchError::NotSeated)),
        }
    }

    /// Tell the offending connection why its event was refused.
    fn reject(&mut self, connection: ConnectionId, err: MatchError) -> MatchError {
        let notification = match &err {
            MatchError::InvalidWager { min, max } => Notification::WagerRejected {
                message: err.to_string(),
                min: *min,
                max: *max,
            },
            _ => Notification::Error {
                message: err.to_string(),
            },
        };
        self.push(Recipient::Connection(connection), notification);
        err
    }

    fn send_seat_assignment(&mut self, connection: ConnectionId, seat: Seat) {
        let Some(session) = self.roster.session_of(seat) else {
            return;
        };
        self.push(
            Recipient::Connection(connection),
            Notification::SeatAssigned {
                seat,
                label: seat.label().to_string(),
                session,
            },
        );
    }

    fn push(&mut self, recipient: Recipient, notification: Notification) {
        self.outbox.push_back(Envelope::new(recipient, notification));
    }
}
