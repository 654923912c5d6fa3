//! Mission overlay: turning one target hex into per-unit destinations

use crate::board::hex::{HexCoord, HexDirection};
use crate::core::config::TacticsConfig;
use crate::orders::order::MissionType;
use crate::units::Unit;

/// Where the `index`-th unit of the force should head
///
/// `force_centroid` is the centroid of the commander's units; slow units in
/// an assault hang back on that side of the target.
pub fn mission_destination(
    mission: MissionType,
    target: HexCoord,
    index: usize,
    unit: &Unit,
    force_centroid: HexCoord,
    config: &TacticsConfig,
) -> HexCoord {
    match mission {
        MissionType::IntelGathering => {
            target.offset(HexDirection::from_index(index), config.intel_radius)
        }
        MissionType::DefendKeypoints => ring_slot(target, index),
        MissionType::AttackEnemyVP => {
            if unit.is_fast(config.fast_unit_threshold) {
                target
            } else {
                let distance = target.distance(&force_centroid) as i32;
                let hold_back = config.support_distance.min(distance).max(0) as u32;
                target.toward(&force_centroid, hold_back)
            }
        }
        MissionType::SecureKeypoint => {
            if index == 0 {
                target
            } else {
                ring_slot(target, index - 1)
            }
        }
    }
}

/// Slot `index` on the ring of hexes around `center`
pub fn ring_slot(center: HexCoord, index: usize) -> HexCoord {
    let ring = center.ring(1);
    ring[index % ring.len()]
}
