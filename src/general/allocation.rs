//! Splitting points between commanders
//!
//! Needier commanders get a bigger share. The split is exact: floors first,
//! then leftover points one at a time by largest fractional remainder.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use ordered_float::OrderedFloat;

use crate::core::types::PlayerId;
use crate::general::analysis::UnitHealth;

/// Lowest weight any commander can have
pub const MIN_WEIGHT: f64 = 0.05;

/// Need-based weight of one commander
pub fn commander_weight(health: &UnitHealth) -> f64 {
    let mut weight = 0.1;
    if !health.has_supply {
        weight += 0.4;
    }
    if !health.has_artillery {
        weight += 0.3;
    }
    if health.avg_fuel_ratio < 0.6 {
        weight += 0.2;
    }
    weight += 0.1 * 3u32.saturating_sub(health.unit_count) as f64;
    weight -= (health.unspent_points as f64 / 80.0).min(0.4);
    weight.max(MIN_WEIGHT)
}

/// Weights for every commander, in the order given
pub fn allocation_weights(commanders: &[UnitHealth]) -> Vec<(PlayerId, f64)> {
    commanders
        .iter()
        .map(|h| (h.commander, commander_weight(h)))
        .collect()
}

/// Split `pool` points by weight
///
/// With at least one commander the result sums to exactly `pool`.
pub fn allocate_points(pool: u32, weights: &[(PlayerId, f64)]) -> BTreeMap<PlayerId, u32> {
    let mut shares = BTreeMap::new();
    if weights.is_empty() {
        return shares;
    }

    let total_weight: f64 = weights.iter().map(|(_, w)| w).sum();
    let mut parts: Vec<(PlayerId, f64, u32, f64)> = weights
        .iter()
        .map(|&(id, weight)| {
            let exact = if total_weight > 0.0 {
                pool as f64 * weight / total_weight
            } else {
                pool as f64 / weights.len() as f64
            };
            let floor = exact.floor() as u32;
            (id, weight, floor, exact - floor as f64)
        })
        .collect();

    let floored: u32 = parts.iter().map(|p| p.2).sum();
    let mut remainder = pool.saturating_sub(floored);

    parts.sort_by_key(|&(id, weight, _, frac)| {
        (Reverse(OrderedFloat(frac)), Reverse(OrderedFloat(weight)), id)
    });
    let n = parts.len();
    let mut i = 0;
    while remainder > 0 {
        parts[i % n].2 += 1;
        remainder -= 1;
        i += 1;
    }

    for (id, _, points, _) in parts {
        shares.insert(id, points);
    }
    shares
}
