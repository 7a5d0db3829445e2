//! Balances and pending wagers for both seats.

use super::{
    constants::SEAT_COUNT,
    entities::{Seat, SeatBalances, Units},
    errors::{MatchError, MatchResult},
};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
struct Account {
    balance: Units,
    wager: Option<Units>,
}

/// Returned when a wager is accepted.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct WagerPlaced {
    /// The seat had no wager locked before this one.
    pub first_lock: bool,
    /// The opposing seat has also wagered this round.
    pub opponent_wagered: bool,
}

#[derive(Debug, Default)]
pub struct Ledger {
    accounts: [Account; SEAT_COUNT],
}

impl Ledger {
    #[must_use]
    pub fn new(starting_balance: Units) -> Self {
        let mut ledger = Self::default();
        ledger.reset(starting_balance);
        ledger
    }

    /// Lock in `amount` for `seat`. A pending wager may be revised until the
    /// round resolves.
    pub fn place_wager(
        &mut self,
        seat: Seat,
        amount: Units,
        min_wager: Units,
    ) -> MatchResult<WagerPlaced> {
        let account = &mut self.accounts[seat.index()];
        if amount < min_wager || amount > account.balance {
            return Err(MatchError::InvalidWager {
                min: min_wager,
                max: account.balance,
            });
        }
        let first_lock = account.wager.replace(amount).is_none();
        Ok(WagerPlaced {
            first_lock,
            opponent_wagered: self.wager(seat.opponent()).is_some(),
        })
    }

    #[must_use]
    pub fn both_wagered(&self) -> bool {
        self.accounts.iter().all(|account| account.wager.is_some())
    }

    /// The only way wagers leave the pending state.
    pub fn clear_wagers(&mut self) {
        for account in &mut self.accounts {
            account.wager = None;
        }
    }

    #[must_use]
    pub fn wager(&self, seat: Seat) -> Option<Units> {
        self.accounts[seat.index()].wager
    }

    #[must_use]
    pub fn balance(&self, seat: Seat) -> Units {
        self.accounts[seat.index()].balance
    }

    #[must_use]
    pub fn balances(&self) -> SeatBalances {
        SeatBalances::new(self.balance(Seat::A), self.balance(Seat::B))
    }

    /// Overwrite both balances, e.g. with a round outcome.
    pub fn apply_balances(&mut self, balances: SeatBalances) {
        for seat in Seat::ALL {
            self.accounts[seat.index()].balance = balances.get(seat);
        }
    }

    /// Restore one seat to the starting balance with no wager.
    pub fn reset_seat(&mut self, seat: Seat, starting_balance: Units) {
        self.accounts[seat.index()] = Account {
            balance: starting_balance,
            wager: None,
        };
    }

    pub fn reset(&mut self, starting_balance: Units) {
        for seat in Seat::ALL {
            self.reset_seat(seat, starting_balance);
        }
    }
}
