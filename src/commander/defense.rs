//! Defensive subsystem: threat, retreat, grouping and autonomous targets

use std::cmp::Reverse;

use ordered_float::OrderedFloat;

use crate::board::hex::HexCoord;
use crate::core::config::TacticsConfig;
use crate::core::types::Nation;
use crate::economy::keypoints::{KeyPoint, KeyPoints};
use crate::units::Unit;

/// Enemy pressure on `unit`, relative to its own defense
pub fn threat_level(unit: &Unit, enemies: &[&Unit], config: &TacticsConfig) -> f64 {
    let raw: f64 = enemies
        .iter()
        .filter_map(|enemy| {
            let distance = unit.position.distance(&enemy.position);
            (distance <= config.threat_radius).then(|| {
                enemy.stats.attack_value as f64 * enemy.combat_ratio() / distance.max(1) as f64
            })
        })
        .sum();
    raw / unit.stats.defense_value.max(1) as f64
}

pub fn should_retreat(threat: f64, config: &TacticsConfig) -> bool {
    threat > config.retreat_threshold
}

/// Nearest safe point farther from the enemy than the unit is
pub fn retreat_point(
    position: HexCoord,
    enemy_centroid: HexCoord,
    safe_points: &[HexCoord],
) -> Option<HexCoord> {
    let current = position.distance(&enemy_centroid);
    safe_points
        .iter()
        .copied()
        .filter(|p| p.distance(&enemy_centroid) > current)
        .min_by_key(|p| (p.distance(&position), *p))
}

/// Ring slot around the friendly key point closest to `position`
pub fn grouping_point(
    position: HexCoord,
    friendly: &[&KeyPoint],
    slot: usize,
) -> Option<HexCoord> {
    let anchor = friendly
        .iter()
        .min_by_key(|kp| (kp.hex.distance(&position), kp.hex))?;
    Some(super::missions::ring_slot(anchor.hex, slot))
}

/// Target for a unit with no orders: the nearest valuable key point we do
/// not hold
pub fn autonomous_target(
    position: HexCoord,
    key_points: &KeyPoints,
    nation: &Nation,
) -> Option<HexCoord> {
    key_points
        .iter()
        .filter(|kp| !kp.is_held_by(nation) && kp.value > 0)
        .min_by_key(|kp| {
            (
                kp.hex.distance(&position),
                Reverse(OrderedFloat(kp.value as f64 + kp.kind.fortification_bonus())),
                kp.hex,
            )
        })
        .map(|kp| kp.hex)
}
