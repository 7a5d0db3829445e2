//! Seat assignment for the two players of a match.

use std::collections::HashMap;

use super::{
    constants::SEAT_COUNT,
    entities::{ConnectionId, Seat, SessionToken},
    errors::{MatchError, MatchResult},
};

/// Holder of a seat.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Occupant {
    /// Live connection, or `None` while the holder is inside a reconnect window.
    pub connection: Option<ConnectionId>,
    pub session: SessionToken,
    /// Seconds left before a disconnected seat is released.
    grace_remaining: Option<u32>,
}

impl Occupant {
    fn new(connection: ConnectionId) -> Self {
        Self {
            connection: Some(connection),
            session: SessionToken::new(),
            grace_remaining: None,
        }
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }
}

/// Tracks which seat each connection holds.
#[derive(Debug, Default)]
pub struct Roster {
    seats: [Option<Occupant>; SEAT_COUNT],
    connections: HashMap<ConnectionId, Seat>,
}

impl Roster {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign the first empty seat to `connection`.
    ///
    /// A connection that already holds a seat gets that seat back.
    pub fn claim_seat(&mut self, connection: ConnectionId) -> MatchResult<Seat> {
        if let Some(seat) = self.seat_of(connection) {
            return Ok(seat);
        }
        let seat = Seat::ALL
            .into_iter()
            .find(|seat| self.seats[seat.index()].is_none())
            .ok_or(MatchError::SeatUnavailable)?;
        self.seats[seat.index()] = Some(Occupant::new(connection));
        self.connections.insert(connection, seat);
        Ok(seat)
    }

    /// Hand a seat held for `session` to a new connection. Only seats whose
    /// holder is currently disconnected can be reclaimed.
    pub fn claim_with_session(
        &mut self,
        connection: ConnectionId,
        session: SessionToken,
    ) -> Option<Seat> {
        let seat = Seat::ALL.into_iter().find(|seat| {
            self.seats[seat.index()]
                .as_ref()
                .is_some_and(|occupant| occupant.session == session && !occupant.is_connected())
        })?;
        let occupant = self.seats[seat.index()].as_mut()?;
        occupant.connection = Some(connection);
        occupant.grace_remaining = None;
        self.connections.insert(connection, seat);
        Some(seat)
    }

    /// Vacate the seat held by `connection`.
    pub fn release_seat(&mut self, connection: ConnectionId) -> Option<Seat> {
        let seat = self.connections.remove(&connection)?;
        self.seats[seat.index()] = None;
        Some(seat)
    }

    /// Vacate `seat` regardless of its connection state.
    pub fn release(&mut self, seat: Seat) -> Option<Occupant> {
        let occupant = self.seats[seat.index()].take()?;
        if let Some(connection) = occupant.connection {
            self.connections.remove(&connection);
        }
        Some(occupant)
    }

    /// Detach `connection` from its seat but keep the seat for `grace_secs`.
    pub fn mark_disconnected(&mut self, connection: ConnectionId, grace_secs: u32) -> Option<Seat> {
        let seat = self.connections.remove(&connection)?;
        let occupant = self.seats[seat.index()].as_mut()?;
        occupant.connection = None;
        occupant.grace_remaining = Some(grace_secs);
        Some(seat)
    }

    /// Count down every reconnect window by one second and return the seats
    /// whose window ran out. Those seats are still occupied; the caller
    /// releases them.
    pub fn tick_grace(&mut self) -> Vec<Seat> {
        let mut expired = Vec::new();
        for seat in Seat::ALL {
            if let Some(occupant) = self.seats[seat.index()].as_mut()
                && let Some(remaining) = occupant.grace_remaining.as_mut()
            {
                *remaining = remaining.saturating_sub(1);
                if *remaining == 0 {
                    expired.push(seat);
                }
            }
        }
        expired
    }

    #[must_use]
    pub fn seat_of(&self, connection: ConnectionId) -> Option<Seat> {
        self.connections.get(&connection).copied()
    }

    #[must_use]
    pub fn occupant(&self, seat: Seat) -> Option<&Occupant> {
        self.seats[seat.index()].as_ref()
    }

    #[must_use]
    pub fn connection_of(&self, seat: Seat) -> Option<ConnectionId> {
        self.occupant(seat).and_then(|occupant| occupant.connection)
    }

    #[must_use]
    pub fn session_of(&self, seat: Seat) -> Option<SessionToken> {
        self.occupant(seat).map(|occupant| occupant.session)
    }

    #[must_use]
    pub fn is_occupied(&self, seat: Seat) -> bool {
        self.seats[seat.index()].is_some()
    }

    #[must_use]
    pub fn is_connected(&self, seat: Seat) -> bool {
        self.occupant(seat).is_some_and(Occupant::is_connected)
    }

    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.seats.iter().filter(|seat| seat.is_some()).count()
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.occupied_count() == SEAT_COUNT
    }
}
