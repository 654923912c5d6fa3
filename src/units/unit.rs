//! Typed unit record
//!
//! `UnitRecord` is the loose shape units arrive in (every stat optional);
//! `Unit::from_record` is the single place they are normalized.

use serde::{Deserialize, Serialize};

use crate::board::hex::HexCoord;
use crate::core::error::{CommandError, Result};
use crate::core::types::{Ownership, UnitId};
use crate::units::catalog::{self, SupportUpgrade};

/// Unit type
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum UnitKind {
    #[default]
    Infantry,
    Armor,
    Artillery,
    Cavalry,
    Recon,
    Supply,
}

impl UnitKind {
    pub fn all() -> [UnitKind; 6] {
        [
            UnitKind::Infantry,
            UnitKind::Armor,
            UnitKind::Artillery,
            UnitKind::Cavalry,
            UnitKind::Recon,
            UnitKind::Supply,
        ]
    }

    /// Cavalry and recon give a commander its reach
    pub fn is_mobility(&self) -> bool {
        matches!(self, UnitKind::Cavalry | UnitKind::Recon)
    }
}

/// Unit size
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum UnitSize {
    Platoon,
    Company,
    Battalion,
}

impl UnitSize {
    pub fn all() -> [UnitSize; 3] {
        [UnitSize::Platoon, UnitSize::Company, UnitSize::Battalion]
    }

    pub fn multiplier(&self) -> u32 {
        match self {
            UnitSize::Platoon => 1,
            UnitSize::Company => 2,
            UnitSize::Battalion => 3,
        }
    }
}

/// Per-unit movement posture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum MovementMode {
    /// Ready to fight, normal pace
    #[default]
    Combat,
    /// Road column, half again as far
    March,
    /// Cautious advance at half pace
    Recon,
}

impl MovementMode {
    /// Movement points a unit with `base` movement gets in this mode
    pub fn budget(&self, base: u32) -> u32 {
        match self {
            MovementMode::Combat => base,
            MovementMode::March => base * 3 / 2,
            MovementMode::Recon => base.div_ceil(2).max(1),
        }
    }
}

/// Stat block shared by units and pending deployments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitStats {
    pub max_fuel: u32,
    pub max_combat: u32,
    pub base_movement: u32,
    pub attack_range: u32,
    pub attack_value: u32,
    pub defense_value: u32,
    pub sight_range: u32,
}

impl UnitStats {
    pub fn new(
        max_fuel: u32,
        max_combat: u32,
        base_movement: u32,
        attack_range: u32,
        attack_value: u32,
        defense_value: u32,
        sight_range: u32,
    ) -> Self {
        Self {
            max_fuel,
            max_combat,
            base_movement,
            attack_range,
            attack_value,
            defense_value,
            sight_range,
        }
    }
}

/// A unit on the map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub kind: UnitKind,
    pub size: UnitSize,
    pub owner: Ownership,
    pub position: HexCoord,
    pub fuel: u32,
    pub combat: u32,
    pub movement_points: u32,
    pub movement_mode: MovementMode,
    pub stats: UnitStats,
    pub upgrades: Vec<SupportUpgrade>,
}

impl Unit {
    /// A fresh unit at full fuel and strength
    pub fn new(
        id: UnitId,
        kind: UnitKind,
        size: UnitSize,
        owner: Ownership,
        position: HexCoord,
        stats: UnitStats,
    ) -> Self {
        let movement_mode = MovementMode::default();
        Self {
            id,
            kind,
            size,
            owner,
            position,
            fuel: stats.max_fuel,
            combat: stats.max_combat,
            movement_points: movement_mode.budget(stats.base_movement),
            movement_mode,
            stats,
            upgrades: Vec::new(),
        }
    }

    /// Normalize a loose record into a unit
    pub fn from_record(record: UnitRecord) -> Result<Self> {
        let owner = match (record.owner, record.owner_label) {
            (Some(owner), _) => owner,
            (None, Some(label)) => Ownership::parse_legacy(&label).ok_or_else(|| {
                CommandError::InvalidUnitRecord(format!(
                    "unit {}: unreadable owner label {:?}",
                    record.id, label
                ))
            })?,
            (None, None) => {
                return Err(CommandError::InvalidUnitRecord(format!(
                    "unit {}: no owner",
                    record.id
                )))
            }
        };

        let size = record.size.unwrap_or(UnitSize::Platoon);
        let defaults = catalog::base_stats(record.kind, size);
        let stats = UnitStats {
            max_fuel: record.max_fuel.unwrap_or(defaults.max_fuel),
            max_combat: record.max_combat.unwrap_or(defaults.max_combat),
            base_movement: record.base_movement.unwrap_or(defaults.base_movement),
            attack_range: record.attack_range.unwrap_or(defaults.attack_range),
            attack_value: record.attack_value.unwrap_or(defaults.attack_value),
            defense_value: record.defense_value.unwrap_or(defaults.defense_value),
            sight_range: record.sight_range.unwrap_or(defaults.sight_range),
        };

        let mut unit = Unit::new(
            UnitId(record.id),
            record.kind,
            size,
            owner,
            record.position,
            stats,
        );
        unit.movement_mode = record.movement_mode.unwrap_or_default();
        unit.fuel = record.fuel.unwrap_or(stats.max_fuel).min(stats.max_fuel);
        unit.combat = record.combat.unwrap_or(stats.max_combat).min(stats.max_combat);
        unit.movement_points = record
            .movement_points
            .unwrap_or_else(|| unit.movement_mode.budget(stats.base_movement));
        Ok(unit)
    }

    pub fn fuel_ratio(&self) -> f64 {
        if self.stats.max_fuel == 0 {
            return 1.0;
        }
        self.fuel as f64 / self.stats.max_fuel as f64
    }

    pub fn combat_ratio(&self) -> f64 {
        if self.stats.max_combat == 0 {
            return 0.0;
        }
        self.combat as f64 / self.stats.max_combat as f64
    }

    pub fn is_destroyed(&self) -> bool {
        self.combat == 0
    }

    pub fn can_attack(&self) -> bool {
        self.stats.attack_value > 0 && self.movement_points > 0 && !self.is_destroyed()
    }

    /// Fast units lead assaults
    pub fn is_fast(&self, threshold: u32) -> bool {
        self.movement_points + self.fuel > threshold
    }

    /// Restore movement points to the current mode's budget
    pub fn refresh_movement(&mut self) {
        self.movement_points = self.movement_mode.budget(self.stats.base_movement);
    }

    /// Switch posture; the movement budget follows the mode
    pub fn set_mode(&mut self, mode: MovementMode) {
        self.movement_mode = mode;
        self.refresh_movement();
    }

    /// Add fuel up to max; returns how much was taken
    pub fn add_fuel(&mut self, amount: u32) -> u32 {
        let taken = amount.min(self.stats.max_fuel - self.fuel);
        self.fuel += taken;
        taken
    }

    /// Add combat value up to max; returns how much was taken
    pub fn add_combat(&mut self, amount: u32) -> u32 {
        let taken = amount.min(self.stats.max_combat - self.combat);
        self.combat += taken;
        taken
    }

    pub fn burn_fuel(&mut self, amount: u32) {
        self.fuel = self.fuel.saturating_sub(amount);
    }

    pub fn take_damage(&mut self, amount: u32) {
        self.combat = self.combat.saturating_sub(amount);
    }

    pub fn add_upgrade(&mut self, upgrade: SupportUpgrade) {
        if !self.upgrades.contains(&upgrade) && upgrade.applies_to(self.kind) {
            upgrade.apply(&mut self.stats);
            self.upgrades.push(upgrade);
        }
    }
}

/// Unit as found in scenario files and pending records
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnitRecord {
    pub id: u32,
    pub kind: UnitKind,
    #[serde(default)]
    pub size: Option<UnitSize>,
    #[serde(default)]
    pub owner: Option<Ownership>,
    /// Legacy `"2 (Polska)"` owner text, used only when `owner` is absent
    #[serde(default)]
    pub owner_label: Option<String>,
    #[serde(default)]
    pub position: HexCoord,
    #[serde(default)]
    pub fuel: Option<u32>,
    #[serde(default)]
    pub max_fuel: Option<u32>,
    #[serde(default)]
    pub combat: Option<u32>,
    #[serde(default)]
    pub max_combat: Option<u32>,
    #[serde(default)]
    pub movement_points: Option<u32>,
    #[serde(default)]
    pub base_movement: Option<u32>,
    #[serde(default)]
    pub movement_mode: Option<MovementMode>,
    #[serde(default)]
    pub attack_range: Option<u32>,
    #[serde(default)]
    pub attack_value: Option<u32>,
    #[serde(default)]
    pub defense_value: Option<u32>,
    #[serde(default)]
    pub sight_range: Option<u32>,
}
