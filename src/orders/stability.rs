//! Order stability protocol
//!
//! Decides whether a commander's standing order is replaced this turn.
//! Orders are sticky: once issued they survive a cooldown, are kept while
//! the force closes on the target, and are only replaced by a clearly
//! better target. An emergency overrides all of that.

use std::fmt;

use crate::board::hex::HexCoord;
use crate::core::config::OrdersConfig;
use crate::core::types::{Nation, Turn};
use crate::economy::keypoints::KeyPoints;
use crate::orders::order::{OrderStatus, StrategicOrder};

/// Why an order was (or was not) reissued
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StabilityReason {
    Emergency,
    NoOrder,
    Expired,
    Cooldown,
    MissionCompletion,
    TargetInvalid,
    Threshold,
    Superseded,
}

impl StabilityReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            StabilityReason::Emergency => "emergency",
            StabilityReason::NoOrder => "no order",
            StabilityReason::Expired => "expired",
            StabilityReason::Cooldown => "cooldown",
            StabilityReason::MissionCompletion => "mission completion",
            StabilityReason::TargetInvalid => "target invalid",
            StabilityReason::Threshold => "threshold",
            StabilityReason::Superseded => "superseded",
        }
    }
}

impl fmt::Display for StabilityReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the protocol looks at for one commander
#[derive(Debug, Clone, Copy)]
pub struct StabilityCheck<'a> {
    pub previous: Option<&'a StrategicOrder>,
    pub current_turn: Turn,
    /// Centroid of the commander's units
    pub centroid: HexCoord,
    /// Score of the best target found this turn
    pub candidate_score: f64,
    pub emergency: bool,
    pub key_points: &'a KeyPoints,
    /// Nation the commander fights for
    pub nation: &'a Nation,
}

/// Is the commander's force in trouble?
///
/// True when enough visible enemies are near the centroid, or when more than
/// the configured share of its units is badly damaged.
pub fn is_emergency(
    centroid: HexCoord,
    enemy_positions: &[HexCoord],
    damaged_ratio: f64,
    config: &OrdersConfig,
) -> bool {
    let nearby = enemy_positions
        .iter()
        .filter(|pos| pos.distance(&centroid) <= config.emergency_radius)
        .count();
    nearby >= config.emergency_enemy_count || damaged_ratio > config.damaged_unit_fraction
}

/// Decide whether to issue a new order
pub fn should_issue_new_order(
    check: &StabilityCheck<'_>,
    config: &OrdersConfig,
) -> (bool, StabilityReason) {
    if check.emergency {
        return (true, StabilityReason::Emergency);
    }

    let Some(previous) = check.previous.filter(|o| o.status != OrderStatus::Superseded) else {
        return (true, StabilityReason::NoOrder);
    };
    if previous.status == OrderStatus::Expired || previous.is_stale(check.current_turn) {
        return (true, StabilityReason::Expired);
    }

    if previous.age(check.current_turn) < config.cooldown_turns {
        return (false, StabilityReason::Cooldown);
    }

    if check.centroid.distance(&previous.target_hex) <= config.completion_radius {
        return (false, StabilityReason::MissionCompletion);
    }

    // Gone, or changed hands so the mission no longer applies to it
    let Some(old_target) = check
        .key_points
        .get(previous.target_hex)
        .filter(|kp| previous.mission_type.targets(kp, check.nation))
    else {
        return (true, StabilityReason::TargetInvalid);
    };

    let old_score = old_target.score_from(check.centroid);
    if check.candidate_score <= old_score * config.reissue_factor {
        return (false, StabilityReason::Threshold);
    }

    (true, StabilityReason::Superseded)
}
