//! Player economy: cash stockpile and power balance.
//!
//! The production core never touches a player's cash directly. Everything
//! goes through the [`Economy`] port, which makes the economy the single
//! source of truth for currency and power.
//!
//! All calculations use integer math for deterministic simulation.

use serde::{Deserialize, Serialize};

/// Owner-wide power level that throttles production cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PowerState {
    /// Enough power for everything; production runs every tick.
    #[default]
    Normal,
    /// Power drain exceeds supply, but supply still covers more than half.
    Low,
    /// Supply covers half of the drain or less.
    Critical,
}

/// Economy port consumed by production items and queues.
pub trait Economy {
    /// Withdraw `amount` from the stockpile.
    ///
    /// Returns `false` and leaves the stockpile untouched when funds are short.
    fn take_cash(&mut self, amount: i32) -> bool;

    /// Add `amount` to the stockpile, saturating at `i32::MAX`.
    fn give_cash(&mut self, amount: i32);

    /// Current power state of the owner.
    fn power_state(&self) -> PowerState;
}

/// Player economy state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PlayerEconomy {
    /// Current cash stockpile.
    pub cash: i32,
    /// Power generated by the player's structures.
    pub power_provided: i32,
    /// Power consumed by the player's structures.
    pub power_drained: i32,
}

impl PlayerEconomy {
    /// Create a new player economy with starting cash and no power grid.
    #[must_use]
    pub const fn new(cash: i32) -> Self {
        Self {
            cash,
            power_provided: 0,
            power_drained: 0,
        }
    }

    /// Replace the power balance.
    pub fn set_power(&mut self, provided: i32, drained: i32) {
        self.power_provided = provided;
        self.power_drained = drained;
    }
}

impl Economy for PlayerEconomy {
    fn take_cash(&mut self, amount: i32) -> bool {
        if self.cash >= amount {
            self.cash -= amount;
            true
        } else {
            false
        }
    }

    fn give_cash(&mut self, amount: i32) {
        self.cash = self.cash.saturating_add(amount);
    }

    fn power_state(&self) -> PowerState {
        if self.power_provided >= self.power_drained {
            PowerState::Normal
        } else if self.power_provided > self.power_drained / 2 {
            PowerState::Low
        } else {
            PowerState::Critical
        }
    }
}
