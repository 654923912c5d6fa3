//! Purchase planning
//!
//! Fills the most glaring hole in the force first, then diversifies. Left
//! over points go on support upgrades for the units just planned.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::config::EconomyConfig;
use crate::core::types::PlayerId;
use crate::units::catalog::{self, SupportUpgrade, UnitTemplate};
use crate::units::{UnitKind, UnitSize};

/// A unit the General intends to buy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchasePlan {
    pub unit_kind: UnitKind,
    pub unit_size: UnitSize,
    /// Price of the unit alone
    pub cost: u32,
    pub commander: PlayerId,
    pub support_upgrades: Vec<SupportUpgrade>,
}

impl PurchasePlan {
    /// Unit plus upgrades
    pub fn total_cost(&self) -> u32 {
        self.cost + self.support_upgrades.iter().map(|u| u.cost()).sum::<u32>()
    }
}

/// What the nation already fields
#[derive(Debug, Clone, Default)]
pub struct ForceComposition {
    pub kind_counts: BTreeMap<UnitKind, u32>,
    pub enemy_has_armor: bool,
}

impl ForceComposition {
    pub fn count(&self, kind: UnitKind) -> u32 {
        self.kind_counts.get(&kind).copied().unwrap_or(0)
    }

    fn add(&mut self, kind: UnitKind) {
        *self.kind_counts.entry(kind).or_insert(0) += 1;
    }
}

/// Which size of a kind to take
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SizePick {
    Smallest,
    Largest,
}

fn pick_template(
    candidates: &[UnitTemplate],
    kinds: &[UnitKind],
    remaining: u32,
    size: SizePick,
) -> Option<UnitTemplate> {
    let affordable = candidates
        .iter()
        .filter(|t| kinds.contains(&t.kind) && t.cost <= remaining);
    match size {
        // Cheapest first; ties by kind order
        SizePick::Smallest => affordable.min_by_key(|t| (t.cost, t.kind)).copied(),
        SizePick::Largest => affordable
            .max_by_key(|t| (t.size, std::cmp::Reverse(t.kind)))
            .copied(),
    }
}

/// Next unit to buy, by fixed priority
fn next_purchase(
    candidates: &[UnitTemplate],
    force: &ForceComposition,
    remaining: u32,
) -> Option<UnitTemplate> {
    let mut wants: Vec<(Vec<UnitKind>, SizePick)> = Vec::new();
    if force.count(UnitKind::Supply) == 0 {
        wants.push((vec![UnitKind::Supply], SizePick::Smallest));
    }
    if force.count(UnitKind::Artillery) == 0 {
        wants.push((vec![UnitKind::Artillery], SizePick::Largest));
    }
    if force.enemy_has_armor && force.count(UnitKind::Armor) == 0 {
        wants.push((vec![UnitKind::Armor], SizePick::Largest));
    }
    if force.count(UnitKind::Infantry) < 3 {
        wants.push((vec![UnitKind::Infantry], SizePick::Largest));
    }
    if force.count(UnitKind::Cavalry) + force.count(UnitKind::Recon) == 0 {
        wants.push((vec![UnitKind::Cavalry, UnitKind::Recon], SizePick::Smallest));
    }

    for (kinds, size) in &wants {
        if let Some(template) = pick_template(candidates, kinds, remaining, *size) {
            return Some(template);
        }
    }

    // Diversify: least-fielded kind we can still afford
    let kind = UnitKind::all()
        .into_iter()
        .filter(|k| candidates.iter().any(|t| t.kind == *k && t.cost <= remaining))
        .min_by_key(|k| (force.count(*k), *k))?;
    let size = if kind == UnitKind::Supply {
        SizePick::Smallest
    } else {
        SizePick::Largest
    };
    pick_template(candidates, &[kind], remaining, size)
}

/// Smooth weighted round-robin over commander weights
fn assign_commanders(count: usize, weights: &[(PlayerId, f64)]) -> Vec<PlayerId> {
    let total: f64 = weights.iter().map(|(_, w)| w).sum();
    let mut current: Vec<f64> = vec![0.0; weights.len()];
    let mut assigned = Vec::with_capacity(count);
    for _ in 0..count {
        for (c, (_, w)) in current.iter_mut().zip(weights) {
            *c += w;
        }
        let mut best = 0;
        for i in 1..weights.len() {
            let better = current[i] > current[best]
                || (current[i] == current[best] && weights[i].0 < weights[best].0);
            if better {
                best = i;
            }
        }
        current[best] -= total;
        assigned.push(weights[best].0);
    }
    assigned
}

/// Plan this turn's purchases within `budget`
///
/// `weights` are the commander need weights; with no commanders nothing is
/// bought since nobody could deploy it.
pub fn plan_purchases(
    budget: u32,
    force: &ForceComposition,
    weights: &[(PlayerId, f64)],
    config: &EconomyConfig,
) -> Vec<PurchasePlan> {
    if weights.is_empty() {
        return Vec::new();
    }

    let ceiling = budget as f64 * config.purchase_overshoot;
    let candidates: Vec<UnitTemplate> = catalog::templates()
        .into_iter()
        .filter(|t| t.cost as f64 <= ceiling)
        .collect();

    let mut force = force.clone();
    let mut remaining = budget;
    let mut picks = Vec::new();
    while picks.len() < config.purchase_cap {
        let Some(template) = next_purchase(&candidates, &force, remaining) else {
            break;
        };
        remaining -= template.cost;
        force.add(template.kind);
        picks.push(template);
    }

    let commanders = assign_commanders(picks.len(), weights);
    let mut plans: Vec<PurchasePlan> = picks
        .into_iter()
        .zip(commanders)
        .map(|(t, commander)| PurchasePlan {
            unit_kind: t.kind,
            unit_size: t.size,
            cost: t.cost,
            commander,
            support_upgrades: Vec::new(),
        })
        .collect();

    for plan in plans.iter_mut() {
        for upgrade in SupportUpgrade::all() {
            if upgrade.applies_to(plan.unit_kind) && upgrade.cost() <= remaining {
                remaining -= upgrade.cost();
                plan.support_upgrades.push(upgrade);
            }
        }
    }

    plans
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weights() -> Vec<(PlayerId, f64)> {
        vec![(PlayerId(2), 1.0), (PlayerId(3), 1.0)]
    }

    fn total(plans: &[PurchasePlan]) -> u32 {
        plans.iter().map(|p| p.total_cost()).sum()
    }

    #[test]
    fn test_empty_force_buys_supply_first() {
        let plans = plan_purchases(
            40,
            &ForceComposition::default(),
            &weights(),
            &EconomyConfig::default(),
        );
        assert_eq!(plans[0].unit_kind, UnitKind::Supply);
        assert_eq!(plans[0].unit_size, UnitSize::Platoon);
        assert!(total(&plans) <= 40);
    }

    #[test]
    fn test_priority_order() {
        let plans = plan_purchases(
            200,
            &ForceComposition::default(),
            &weights(),
            &EconomyConfig::default(),
        );
        let kinds: Vec<UnitKind> = plans.iter().map(|p| p.unit_kind).collect();
        assert_eq!(kinds, vec![UnitKind::Supply, UnitKind::Artillery, UnitKind::Infantry]);
        // Artillery bought at the largest affordable size
        assert_eq!(plans[1].unit_size, UnitSize::Battalion);
        assert!(total(&plans) <= 200);
    }

    #[test]
    fn test_enemy_armor_prompts_armor() {
        let mut force = ForceComposition {
            enemy_has_armor: true,
            ..Default::default()
        };
        force.kind_counts.insert(UnitKind::Supply, 1);
        force.kind_counts.insert(UnitKind::Artillery, 1);
        let plans = plan_purchases(100, &force, &weights(), &EconomyConfig::default());
        assert_eq!(plans[0].unit_kind, UnitKind::Armor);
    }

    #[test]
    fn test_mobility_then_diversify() {
        let mut force = ForceComposition::default();
        force.kind_counts.insert(UnitKind::Supply, 1);
        force.kind_counts.insert(UnitKind::Artillery, 2);
        force.kind_counts.insert(UnitKind::Infantry, 3);
        let plans = plan_purchases(30, &force, &weights(), &EconomyConfig::default());
        // Cheapest mobility unit is a recon platoon at 12
        assert_eq!(plans[0].unit_kind, UnitKind::Recon);
        assert_eq!(plans[0].unit_size, UnitSize::Platoon);
        assert!(total(&plans) <= 30);
    }

    #[test]
    fn test_cap_per_turn() {
        let config = EconomyConfig::default();
        let plans = plan_purchases(1000, &ForceComposition::default(), &weights(), &config);
        assert_eq!(plans.len(), config.purchase_cap);
    }

    #[test]
    fn test_nothing_affordable() {
        let plans = plan_purchases(
            5,
            &ForceComposition::default(),
            &weights(),
            &EconomyConfig::default(),
        );
        assert!(plans.is_empty());
    }

    #[test]
    fn test_no_commanders_no_purchases() {
        let plans =
            plan_purchases(100, &ForceComposition::default(), &[], &EconomyConfig::default());
        assert!(plans.is_empty());
    }

    #[test]
    fn test_leftover_buys_upgrades() {
        // One unit per turn: a supply platoon (8) leaves 12, motorized (6) fits
        let config = EconomyConfig {
            purchase_cap: 1,
            ..Default::default()
        };
        let plans = plan_purchases(20, &ForceComposition::default(), &weights(), &config);
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].unit_kind, UnitKind::Supply);
        assert_eq!(plans[0].support_upgrades, vec![SupportUpgrade::Motorized]);
        assert_eq!(total(&plans), 14);
    }

    #[test]
    fn test_round_robin_follows_weights() {
        let assigned = assign_commanders(4, &[(PlayerId(2), 3.0), (PlayerId(3), 1.0)]);
        assert_eq!(assigned.iter().filter(|id| **id == PlayerId(2)).count(), 3);
        assert_eq!(assigned.iter().filter(|id| **id == PlayerId(3)).count(), 1);
    }

    #[test]
    fn test_round_robin_alternates_equal_weights() {
        let assigned = assign_commanders(3, &weights());
        assert_eq!(assigned, vec![PlayerId(2), PlayerId(3), PlayerId(2)]);
    }
}
