//! Mission choice and target selection

use std::collections::BTreeSet;

use ordered_float::OrderedFloat;

use crate::board::hex::HexCoord;
use crate::core::types::Nation;
use crate::economy::keypoints::{KeyPoint, KeyPoints};
use crate::general::strategy::BudgetStrategy;
use crate::orders::order::MissionType;

/// Mission a commander gets under the current strategy
pub fn choose_mission(strategy: BudgetStrategy, enemies_visible: bool) -> MissionType {
    match strategy {
        BudgetStrategy::FuelCrisis | BudgetStrategy::Protection => MissionType::DefendKeypoints,
        BudgetStrategy::Desperation => MissionType::AttackEnemyVP,
        BudgetStrategy::Development if !enemies_visible => MissionType::IntelGathering,
        BudgetStrategy::Development | BudgetStrategy::Expansion => MissionType::SecureKeypoint,
    }
}

/// Key points a mission can target
pub fn mission_candidates<'a>(
    mission: MissionType,
    key_points: &'a KeyPoints,
    nation: &Nation,
) -> Vec<&'a KeyPoint> {
    key_points
        .iter()
        .filter(|kp| mission.targets(kp, nation))
        .collect()
}

/// A scored target for one commander
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetChoice {
    pub mission: MissionType,
    pub target: HexCoord,
    pub score: f64,
}

/// Best-scoring key point from `candidates`, skipping claimed hexes unless
/// every candidate is claimed
fn best_target(
    candidates: &[&KeyPoint],
    from: HexCoord,
    claimed: &BTreeSet<HexCoord>,
) -> Option<(HexCoord, f64)> {
    let unclaimed: Vec<&KeyPoint> = candidates
        .iter()
        .copied()
        .filter(|kp| !claimed.contains(&kp.hex))
        .collect();
    let pool = if unclaimed.is_empty() {
        candidates
    } else {
        &unclaimed[..]
    };

    // Highest score; ties to the lowest hex
    pool.iter()
        .map(|kp| (kp.hex, kp.score_from(from)))
        .max_by_key(|(hex, score)| (OrderedFloat(*score), std::cmp::Reverse(*hex)))
}

/// Pick the mission's target, falling back to securing key points when the
/// mission has nothing to aim at
pub fn select_target(
    mission: MissionType,
    from: HexCoord,
    key_points: &KeyPoints,
    nation: &Nation,
    claimed: &BTreeSet<HexCoord>,
) -> Option<TargetChoice> {
    let candidates = mission_candidates(mission, key_points, nation);
    if let Some((target, score)) = best_target(&candidates, from, claimed) {
        return Some(TargetChoice {
            mission,
            target,
            score,
        });
    }
    if mission == MissionType::SecureKeypoint {
        return None;
    }

    let fallback = mission_candidates(MissionType::SecureKeypoint, key_points, nation);
    best_target(&fallback, from, claimed).map(|(target, score)| TargetChoice {
        mission: MissionType::SecureKeypoint,
        target,
        score,
    })
}
