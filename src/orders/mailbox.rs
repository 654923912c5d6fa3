//! Order channel: one versioned slot per commander
//!
//! The General is the only writer and each Commander the only reader of its
//! own slot, so a plain map is enough.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::error::Result;
use crate::core::types::{Nation, PlayerId, Turn};
use crate::orders::order::{OrderStatus, StrategicOrder};

/// Slot key for a commander
pub fn channel_key(nation: &Nation, commander: PlayerId) -> String {
    format!("{}_commander_{}", nation, commander)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSlot {
    /// Bumped on every publish
    pub version: u64,
    pub order: StrategicOrder,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderChannel {
    slots: BTreeMap<String, OrderSlot>,
}

impl OrderChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a new order, returning the one it replaced marked as superseded
    pub fn publish(&mut self, key: &str, order: StrategicOrder) -> Option<StrategicOrder> {
        match self.slots.get_mut(key) {
            Some(slot) => {
                let mut previous = std::mem::replace(&mut slot.order, order);
                slot.version += 1;
                if previous.status == OrderStatus::Active {
                    previous.status = OrderStatus::Superseded;
                }
                Some(previous)
            }
            None => {
                self.slots
                    .insert(key.to_string(), OrderSlot { version: 1, order });
                None
            }
        }
    }

    /// Last order written to the slot, whatever its status
    pub fn read(&self, key: &str) -> Option<&StrategicOrder> {
        self.slots.get(key).map(|slot| &slot.order)
    }

    pub fn version(&self, key: &str) -> u64 {
        self.slots.get(key).map(|slot| slot.version).unwrap_or(0)
    }

    /// The order a commander should follow this turn, if any
    pub fn active_order(&self, key: &str, current_turn: Turn) -> Option<&StrategicOrder> {
        self.read(key).filter(|order| order.is_active(current_turn))
    }

    /// Mark stale orders as expired; returns how many changed
    pub fn expire_stale(&mut self, current_turn: Turn) -> usize {
        let mut expired = 0;
        for slot in self.slots.values_mut() {
            if slot.order.status == OrderStatus::Active && slot.order.is_stale(current_turn) {
                slot.order.status = OrderStatus::Expired;
                expired += 1;
            }
        }
        expired
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Slot record as JSON, for handing to an external reader
    pub fn record_json(&self, key: &str) -> Result<Option<String>> {
        match self.read(key) {
            Some(order) => Ok(Some(serde_json::to_string(order)?)),
            None => Ok(None),
        }
    }
}
