//! Strategic orders passed from a General to its Commanders

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::board::hex::HexCoord;
use crate::core::types::{Nation, PlayerId, Turn};
use crate::economy::keypoints::KeyPoint;

/// Turns an order stays valid after issue
pub const ORDER_LIFETIME: Turn = 5;

/// What the commander is asked to do around the target hex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MissionType {
    SecureKeypoint,
    IntelGathering,
    DefendKeypoints,
    AttackEnemyVP,
}

impl MissionType {
    /// Can this mission aim at `key_point` on behalf of `nation`?
    pub fn targets(&self, key_point: &KeyPoint, nation: &Nation) -> bool {
        match self {
            MissionType::SecureKeypoint => !key_point.is_held_by(nation),
            MissionType::IntelGathering => key_point.is_neutral(),
            MissionType::DefendKeypoints => key_point.is_held_by(nation),
            MissionType::AttackEnemyVP => key_point.is_enemy_of(nation),
        }
    }
}

impl fmt::Display for MissionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MissionType::SecureKeypoint => "SecureKeypoint",
            MissionType::IntelGathering => "IntelGathering",
            MissionType::DefendKeypoints => "DefendKeypoints",
            MissionType::AttackEnemyVP => "AttackEnemyVP",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OrderStatus {
    #[default]
    Active,
    Superseded,
    Expired,
}

/// One order for one commander
///
/// Serialized as the channel record:
/// `{commander, mission_type, target_hex: [q, r], priority, issued_turn, expires_turn, status}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategicOrder {
    pub commander: PlayerId,
    pub mission_type: MissionType,
    pub target_hex: HexCoord,
    pub priority: Priority,
    pub issued_turn: Turn,
    pub expires_turn: Turn,
    #[serde(default)]
    pub status: OrderStatus,
}

impl StrategicOrder {
    pub fn new(
        commander: PlayerId,
        mission_type: MissionType,
        target_hex: HexCoord,
        priority: Priority,
        issued_turn: Turn,
    ) -> Self {
        Self {
            commander,
            mission_type,
            target_hex,
            priority,
            issued_turn,
            expires_turn: issued_turn + ORDER_LIFETIME,
            status: OrderStatus::Active,
        }
    }

    /// Override the default lifetime
    pub fn with_lifetime(mut self, lifetime: Turn) -> Self {
        self.expires_turn = self.issued_turn + lifetime;
        self
    }

    /// Readers must ignore an order past its expiry turn
    pub fn is_stale(&self, current_turn: Turn) -> bool {
        current_turn > self.expires_turn
    }

    pub fn is_active(&self, current_turn: Turn) -> bool {
        self.status == OrderStatus::Active && !self.is_stale(current_turn)
    }

    /// Turns since issue
    pub fn age(&self, current_turn: Turn) -> Turn {
        current_turn.saturating_sub(self.issued_turn)
    }
}
