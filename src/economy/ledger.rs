//! Per-player point balances
//!
//! Economic points buy units and resupply; special points are tracked but
//! only spent by outer game layers.

use serde::{Deserialize, Serialize};

use crate::core::error::{CommandError, Result};

/// A player's balance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Points {
    pub economic: u32,
    pub special: u32,
}

impl Points {
    pub fn new(economic: u32, special: u32) -> Self {
        Self { economic, special }
    }
}

/// Balance access used by planners and executors
pub trait Ledger {
    fn points(&self) -> Points;

    /// Spend economic points; fails without touching the balance on shortfall
    fn subtract_points(&mut self, amount: u32) -> Result<()>;

    fn add_points(&mut self, amount: u32);

    fn can_afford(&self, amount: u32) -> bool {
        self.points().economic >= amount
    }
}

/// In-memory ledger
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointLedger {
    balance: Points,
}

impl PointLedger {
    pub fn new(economic: u32) -> Self {
        Self {
            balance: Points::new(economic, 0),
        }
    }

    pub fn with_special(mut self, special: u32) -> Self {
        self.balance.special = special;
        self
    }

    /// Move up to `amount` economic points into `other`; returns the amount moved
    pub fn transfer_to(&mut self, other: &mut impl Ledger, amount: u32) -> u32 {
        let transfer = amount.min(self.balance.economic);
        self.balance.economic -= transfer;
        other.add_points(transfer);
        transfer
    }
}

impl Ledger for PointLedger {
    fn points(&self) -> Points {
        self.balance
    }

    fn subtract_points(&mut self, amount: u32) -> Result<()> {
        if amount > self.balance.economic {
            return Err(CommandError::InsufficientPoints {
                needed: amount,
                available: self.balance.economic,
            });
        }
        self.balance.economic -= amount;
        Ok(())
    }

    fn add_points(&mut self, amount: u32) {
        self.balance.economic = self.balance.economic.saturating_add(amount);
    }
}
