//! The General's read-only view of the turn
//!
//! Captured once at the start of the sub-turn and threaded through every
//! planning step, so no step can see state another step changed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::board::hex::HexCoord;
use crate::core::config::AiConfig;
use crate::core::types::{Nation, PlayerId, Turn, UnitId};
use crate::economy::keypoints::KeyPoints;
use crate::orders::order::StrategicOrder;
use crate::units::{Unit, UnitKind};

/// The General's own balance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EconomySnapshot {
    pub economic_points: u32,
    pub special_points: u32,
}

/// Condition of one commander's force
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitHealth {
    pub commander: PlayerId,
    pub unit_count: u32,
    pub avg_fuel_ratio: f64,
    pub avg_combat_ratio: f64,
    /// Share of units below the low-fuel ratio
    pub low_fuel_ratio: f64,
    /// Share of units below the damaged combat ratio
    pub damaged_ratio: f64,
    pub kind_counts: BTreeMap<UnitKind, u32>,
    pub has_supply: bool,
    pub has_artillery: bool,
    /// Points the commander still holds
    pub unspent_points: u32,
    pub centroid: Option<HexCoord>,
}

impl UnitHealth {
    /// A commander with no units yet
    pub fn empty(commander: PlayerId) -> Self {
        Self {
            commander,
            unit_count: 0,
            avg_fuel_ratio: 0.0,
            avg_combat_ratio: 0.0,
            low_fuel_ratio: 0.0,
            damaged_ratio: 0.0,
            kind_counts: BTreeMap::new(),
            has_supply: false,
            has_artillery: false,
            unspent_points: 0,
            centroid: None,
        }
    }

    pub fn from_units<'a>(
        commander: PlayerId,
        units: impl IntoIterator<Item = &'a Unit>,
        unspent_points: u32,
        config: &AiConfig,
    ) -> Self {
        let units: Vec<&Unit> = units.into_iter().filter(|u| !u.is_destroyed()).collect();
        let mut health = Self::empty(commander);
        health.unspent_points = unspent_points;
        if units.is_empty() {
            return health;
        }

        let n = units.len() as f64;
        health.unit_count = units.len() as u32;
        health.avg_fuel_ratio = units.iter().map(|u| u.fuel_ratio()).sum::<f64>() / n;
        health.avg_combat_ratio = units.iter().map(|u| u.combat_ratio()).sum::<f64>() / n;
        health.low_fuel_ratio = units
            .iter()
            .filter(|u| u.fuel_ratio() < config.economy.low_fuel_ratio)
            .count() as f64
            / n;
        health.damaged_ratio = units
            .iter()
            .filter(|u| u.combat_ratio() < config.orders.damaged_combat_ratio)
            .count() as f64
            / n;
        for unit in &units {
            *health.kind_counts.entry(unit.kind).or_insert(0) += 1;
        }
        health.has_supply = health.count(UnitKind::Supply) > 0;
        health.has_artillery = health.count(UnitKind::Artillery) > 0;
        health.centroid = HexCoord::centroid(units.iter().map(|u| &u.position));
        health
    }

    pub fn count(&self, kind: UnitKind) -> u32 {
        self.kind_counts.get(&kind).copied().unwrap_or(0)
    }
}

/// Where the game stands
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StrategicSnapshot {
    pub own_vp: u32,
    pub enemy_vp: u32,
    pub current_turn: Turn,
    pub max_turns: Turn,
    /// 0..1 early, 1..2 mid, above 2 late
    pub game_phase: f64,
    pub own_key_points: u32,
    pub enemy_key_points: u32,
    pub neutral_key_points: u32,
    pub enemy_has_armor: bool,
}

impl StrategicSnapshot {
    pub fn is_losing(&self) -> bool {
        self.own_vp < self.enemy_vp
    }
}

/// `current_turn / (max_turns / 3)`, divisor at least 1
pub fn game_phase(current_turn: Turn, max_turns: Turn) -> f64 {
    let third = (max_turns as f64 / 3.0).max(1.0);
    current_turn as f64 / third
}

/// A visible enemy unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyContact {
    pub id: UnitId,
    pub kind: UnitKind,
    pub position: HexCoord,
}

/// Everything the General plans from
#[derive(Debug, Clone)]
pub struct TurnContext {
    pub nation: Nation,
    pub general: PlayerId,
    pub current_turn: Turn,
    pub economy: EconomySnapshot,
    /// One entry per commander, ascending id
    pub commanders: Vec<UnitHealth>,
    pub strategic: StrategicSnapshot,
    pub key_points: KeyPoints,
    pub enemy_contacts: Vec<EnemyContact>,
    pub existing_orders: BTreeMap<PlayerId, StrategicOrder>,
    /// Paid for but still waiting for a free spawn hex
    pub pending_units: BTreeMap<UnitKind, u32>,
    /// Stand-in centroid for commanders without units
    pub anchor: HexCoord,
}

impl TurnContext {
    pub fn enemy_positions(&self) -> Vec<HexCoord> {
        self.enemy_contacts.iter().map(|c| c.position).collect()
    }

    pub fn centroid_of(&self, health: &UnitHealth) -> HexCoord {
        health.centroid.unwrap_or(self.anchor)
    }

    /// Units of each kind across all commanders, queued deployments included
    pub fn force_counts(&self) -> BTreeMap<UnitKind, u32> {
        let mut counts = self.pending_units.clone();
        for health in &self.commanders {
            for (kind, n) in &health.kind_counts {
                *counts.entry(*kind).or_insert(0) += n;
            }
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Ownership;
    use crate::units::{catalog, UnitSize};

    fn unit(id: u32, kind: UnitKind, pos: HexCoord) -> Unit {
        Unit::new(
            UnitId(id),
            kind,
            UnitSize::Platoon,
            Ownership::new(PlayerId(2), Nation::new("Polska")),
            pos,
            catalog::base_stats(kind, UnitSize::Platoon),
        )
    }

    #[test]
    fn test_health_of_mixed_force() {
        let mut low = unit(1, UnitKind::Infantry, HexCoord::new(0, 0));
        low.fuel = 1;
        low.combat = 2;
        let units = vec![
            low,
            unit(2, UnitKind::Supply, HexCoord::new(2, 0)),
            unit(3, UnitKind::Infantry, HexCoord::new(4, 0)),
            unit(4, UnitKind::Recon, HexCoord::new(2, 0)),
        ];
        let health = UnitHealth::from_units(PlayerId(2), &units, 7, &AiConfig::default());

        assert_eq!(health.unit_count, 4);
        assert!((health.low_fuel_ratio - 0.25).abs() < 1e-9);
        assert!((health.damaged_ratio - 0.25).abs() < 1e-9);
        assert!(health.has_supply);
        assert!(!health.has_artillery);
        assert_eq!(health.count(UnitKind::Infantry), 2);
        assert_eq!(health.unspent_points, 7);
        assert_eq!(health.centroid, Some(HexCoord::new(2, 0)));
    }

    #[test]
    fn test_health_without_units_defaults() {
        let health =
            UnitHealth::from_units(PlayerId(3), &Vec::<Unit>::new(), 0, &AiConfig::default());
        assert_eq!(health.unit_count, 0);
        assert_eq!(health.centroid, None);
        assert_eq!(health.low_fuel_ratio, 0.0);
    }

    #[test]
    fn test_game_phase() {
        assert!((game_phase(10, 30) - 1.0).abs() < 1e-9);
        assert!(game_phase(21, 30) > 2.0);
        // Tiny games still divide by at least one
        assert!((game_phase(2, 1) - 2.0).abs() < 1e-9);
    }
}
