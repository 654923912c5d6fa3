//! A commander's filtered view of the battlefield
//!
//! Respects fog of war: enemies are only those in the player's visible set,
//! and only while they are still on the map.

use std::collections::BTreeMap;

use crate::board::hex::HexCoord;
use crate::board::visibility::PlayerVisibility;
use crate::core::types::{Nation, PlayerId, UnitId};
use crate::economy::keypoints::{KeyPoint, KeyPoints};
use crate::units::Unit;

pub struct TacticalView<'a> {
    pub player: PlayerId,
    pub nation: &'a Nation,
    pub units: &'a BTreeMap<UnitId, Unit>,
    pub visibility: &'a PlayerVisibility,
    pub key_points: &'a KeyPoints,
    pub spawn_points: &'a [HexCoord],
}

impl<'a> TacticalView<'a> {
    /// Own units, ascending id
    pub fn own_units(&self) -> Vec<&'a Unit> {
        self.units
            .values()
            .filter(|u| u.owner.player_id == self.player && !u.is_destroyed())
            .collect()
    }

    /// Enemy units that are visible and still alive
    pub fn visible_enemies(&self) -> Vec<&'a Unit> {
        self.visibility
            .visible_enemies
            .iter()
            .filter_map(|id| self.units.get(id))
            .filter(|u| &u.owner.nation != self.nation && !u.is_destroyed())
            .collect()
    }

    pub fn has_enemy_contact(&self) -> bool {
        !self.visible_enemies().is_empty()
    }

    /// Distance to the closest visible enemy
    pub fn nearest_enemy_distance(&self, pos: HexCoord) -> Option<u32> {
        self.visible_enemies()
            .iter()
            .map(|u| u.position.distance(&pos))
            .min()
    }

    pub fn enemy_centroid(&self) -> Option<HexCoord> {
        let enemies = self.visible_enemies();
        HexCoord::centroid(enemies.iter().map(|u| &u.position))
    }

    pub fn own_centroid(&self) -> Option<HexCoord> {
        let own = self.own_units();
        HexCoord::centroid(own.iter().map(|u| &u.position))
    }

    pub fn friendly_key_points(&self) -> Vec<&'a KeyPoint> {
        self.key_points
            .iter()
            .filter(|kp| kp.is_held_by(self.nation))
            .collect()
    }

    /// Places a unit can fall back to: friendly key points and own spawns
    pub fn safe_points(&self) -> Vec<HexCoord> {
        let mut points: Vec<HexCoord> = self
            .friendly_key_points()
            .iter()
            .map(|kp| kp.hex)
            .chain(self.spawn_points.iter().copied())
            .collect();
        points.sort();
        points.dedup();
        points
    }
}
