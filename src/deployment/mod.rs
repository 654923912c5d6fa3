//! Placing purchased units on the map
//!
//! Purchases become pending records queued per commander. At the end of that
//! commander's sub-turn each record is placed on the best-scoring free hex
//! around the nation's spawn points. A record with nowhere to go stays queued.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::board::hex::HexCoord;
use crate::board::map::HexMap;
use crate::core::config::DeploymentConfig;
use crate::core::types::{Nation, Ownership, PlayerId, UnitId};
use crate::economy::keypoints::KeyPoints;
use crate::general::purchase::PurchasePlan;
use crate::units::{catalog, SupportUpgrade, Unit, UnitKind, UnitSize, UnitStats};

/// A bought unit waiting for a hex
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingDeployment {
    pub token: u32,
    pub unit_kind: UnitKind,
    pub unit_size: UnitSize,
    /// Final stats, upgrades included
    pub stats: UnitStats,
    pub owner: Ownership,
    pub upgrades: Vec<SupportUpgrade>,
}

impl PendingDeployment {
    fn into_unit(self, id: UnitId, position: HexCoord) -> Unit {
        let mut unit = Unit::new(
            id,
            self.unit_kind,
            self.unit_size,
            self.owner,
            position,
            self.stats,
        );
        unit.upgrades = self.upgrades;
        unit
    }
}

/// Pending records keyed by destination commander, in purchase order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeploymentQueue {
    pending: BTreeMap<PlayerId, Vec<PendingDeployment>>,
    next_token: u32,
}

impl DeploymentQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a paid-for purchase; returns its token
    pub fn enqueue(&mut self, plan: &PurchasePlan, nation: &Nation) -> u32 {
        let mut stats = catalog::base_stats(plan.unit_kind, plan.unit_size);
        let mut upgrades = Vec::new();
        for upgrade in &plan.support_upgrades {
            if upgrade.applies_to(plan.unit_kind) && !upgrades.contains(upgrade) {
                upgrade.apply(&mut stats);
                upgrades.push(*upgrade);
            }
        }

        self.next_token += 1;
        let token = self.next_token;
        self.pending
            .entry(plan.commander)
            .or_default()
            .push(PendingDeployment {
                token,
                unit_kind: plan.unit_kind,
                unit_size: plan.unit_size,
                stats,
                owner: Ownership::new(plan.commander, nation.clone()),
                upgrades,
            });
        token
    }

    pub fn pending_for(&self, commander: PlayerId) -> &[PendingDeployment] {
        self.pending
            .get(&commander)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.pending.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn take(&mut self, commander: PlayerId) -> Vec<PendingDeployment> {
        self.pending.remove(&commander).unwrap_or_default()
    }

    fn requeue(&mut self, commander: PlayerId, records: Vec<PendingDeployment>) {
        if !records.is_empty() {
            self.pending.entry(commander).or_default().extend(records);
        }
    }
}

/// What a deploying commander knows about the board
pub struct DeploymentSite<'a> {
    pub nation: &'a Nation,
    pub key_points: &'a KeyPoints,
    /// Positions of enemy units this player can see
    pub known_enemies: &'a [HexCoord],
    pub config: &'a DeploymentConfig,
}

/// Free hexes on and around the nation's spawn points, sorted
pub fn candidate_hexes(map: &HexMap, nation: &Nation) -> Vec<HexCoord> {
    let mut hexes: Vec<HexCoord> = map
        .spawn_points_for(nation)
        .iter()
        .flat_map(|spawn| std::iter::once(*spawn).chain(spawn.neighbors()))
        .filter(|hex| map.in_bounds(*hex) && map.is_free(*hex))
        .collect();
    hexes.sort();
    hexes.dedup();
    hexes
}

fn proximity(distance: u32, radius: u32, weight: f64) -> f64 {
    if distance > radius {
        0.0
    } else {
        weight * (radius + 1 - distance) as f64
    }
}

/// Desirability of placing a new unit on `hex`
pub fn score_hex(
    hex: HexCoord,
    map: &HexMap,
    units: &BTreeMap<UnitId, Unit>,
    site: &DeploymentSite<'_>,
) -> f64 {
    let config = site.config;
    let mut score = 0.0;

    if map.spawn_points_for(site.nation).contains(&hex) {
        score += config.spawn_bonus;
    }

    score += units
        .values()
        .filter(|u| &u.owner.nation == site.nation && !u.is_destroyed())
        .map(|u| {
            proximity(
                hex.distance(&u.position),
                config.friendly_radius,
                config.friendly_weight,
            )
        })
        .sum::<f64>();

    score -= site
        .known_enemies
        .iter()
        .map(|e| proximity(hex.distance(e), config.enemy_radius, config.enemy_weight))
        .sum::<f64>();

    score += site
        .key_points
        .iter()
        .filter(|kp| kp.is_held_by(site.nation))
        .map(|kp| proximity(hex.distance(&kp.hex), config.keypoint_radius, config.keypoint_weight))
        .sum::<f64>();

    score
}

/// A record that made it onto the map
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Placement {
    pub token: u32,
    pub unit: UnitId,
    pub hex: HexCoord,
    pub score: f64,
}

/// Place every pending record for `commander`
///
/// `next_unit_id` is advanced for each unit created. Records that find no
/// free hex go back on the queue in their original order.
pub fn deploy_pending(
    queue: &mut DeploymentQueue,
    commander: PlayerId,
    map: &mut HexMap,
    units: &mut BTreeMap<UnitId, Unit>,
    next_unit_id: &mut u32,
    site: &DeploymentSite<'_>,
) -> Vec<Placement> {
    let mut placements = Vec::new();
    let mut left = Vec::new();

    for record in queue.take(commander) {
        let best = candidate_hexes(map, site.nation)
            .into_iter()
            .map(|hex| (hex, score_hex(hex, map, units, site)))
            .max_by_key(|(hex, score)| (OrderedFloat(*score), Reverse(*hex)));

        let Some((hex, score)) = best else {
            tracing::warn!(
                commander = %commander,
                token = record.token,
                kind = ?record.unit_kind,
                "No free spawn hex, deployment stays queued"
            );
            left.push(record);
            continue;
        };

        let id = UnitId(*next_unit_id);
        if !map.place(hex, id) {
            left.push(record);
            continue;
        }
        *next_unit_id += 1;

        let token = record.token;
        tracing::info!(
            commander = %commander,
            unit = %id,
            kind = ?record.unit_kind,
            ?hex,
            score,
            "Deployed"
        );
        units.insert(id, record.into_unit(id, hex));
        placements.push(Placement {
            token,
            unit: id,
            hex,
            score,
        });
    }

    queue.requeue(commander, left);
    placements
}
