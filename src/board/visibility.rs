//! Per-player visibility (fog of war)
//!
//! Each player sees what its own units can see; enemy units are only known
//! while they stand in a visible hex.

use std::collections::BTreeSet;

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::board::hex::HexCoord;
use crate::board::map::HexMap;
use crate::core::types::{Ownership, PlayerId, UnitId};
use crate::units::{MovementMode, Unit};

/// Sight bonus for units advancing in recon mode
pub const RECON_SIGHT_BONUS: u32 = 1;

/// Visibility state for one player
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerVisibility {
    /// Currently visible hexes
    pub visible: AHashSet<HexCoord>,
    /// Previously seen hexes (remembered)
    pub remembered: AHashSet<HexCoord>,
    /// Enemy units standing in visible hexes
    pub visible_enemies: BTreeSet<UnitId>,
}

impl PlayerVisibility {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visible(&self, coord: HexCoord) -> bool {
        self.visible.contains(&coord)
    }

    pub fn is_remembered(&self, coord: HexCoord) -> bool {
        self.remembered.contains(&coord)
    }

    pub fn sees_enemy(&self, unit: UnitId) -> bool {
        self.visible_enemies.contains(&unit)
    }

    /// Move current visible to remembered, set new visible
    pub fn update(&mut self, new_visible: AHashSet<HexCoord>, enemies: BTreeSet<UnitId>) {
        self.remembered.extend(self.visible.drain());
        self.visible = new_visible;
        for coord in &self.visible {
            self.remembered.remove(coord);
        }
        self.visible_enemies = enemies;
    }
}

/// Sight range of a unit, including its posture
pub fn unit_sight_range(unit: &Unit) -> u32 {
    let mut range = unit.stats.sight_range;
    if unit.movement_mode == MovementMode::Recon {
        range += RECON_SIGHT_BONUS;
    }
    range
}

/// Hexes and enemy units visible to `player`
pub fn calculate_visibility<'a>(
    map: &HexMap,
    player: PlayerId,
    viewer: &Ownership,
    units: impl IntoIterator<Item = &'a Unit> + Clone,
) -> (AHashSet<HexCoord>, BTreeSet<UnitId>) {
    let mut visible = AHashSet::new();
    for unit in units.clone() {
        if unit.owner.player_id != player || unit.is_destroyed() {
            continue;
        }
        visible.extend(map.visible_hexes(unit.position, unit_sight_range(unit)));
    }

    let enemies = units
        .into_iter()
        .filter(|u| !u.owner.is_ally_of(viewer) && !u.is_destroyed())
        .filter(|u| visible.contains(&u.position))
        .map(|u| u.id)
        .collect();

    (visible, enemies)
}

/// Refresh a player's visibility in place
pub fn update_player_visibility<'a>(
    visibility: &mut PlayerVisibility,
    map: &HexMap,
    player: PlayerId,
    viewer: &Ownership,
    units: impl IntoIterator<Item = &'a Unit> + Clone,
) {
    let (visible, enemies) = calculate_visibility(map, player, viewer, units);
    visibility.update(visible, enemies);
}
