//! Resupply from the commander's own points
//!
//! One point buys one unit of fuel or combat value. The most depleted units
//! are served first; fuel before combat.

use std::collections::BTreeMap;

use ordered_float::OrderedFloat;
use serde::Serialize;

use crate::core::types::UnitId;
use crate::economy::ledger::Ledger;
use crate::units::Unit;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResupplyReport {
    pub units_served: u32,
    pub fuel_added: u32,
    pub combat_added: u32,
}

impl ResupplyReport {
    pub fn points_spent(&self) -> u32 {
        self.fuel_added + self.combat_added
    }
}

fn needs_resupply(unit: &Unit, threshold: f64) -> bool {
    unit.fuel_ratio() < threshold || unit.combat_ratio() < threshold
}

/// Top up `unit_ids` within the ledger balance and charge the ledger
pub fn resupply_units(
    units: &mut BTreeMap<UnitId, Unit>,
    unit_ids: &[UnitId],
    ledger: &mut impl Ledger,
    threshold: f64,
) -> ResupplyReport {
    let mut report = ResupplyReport::default();
    let mut budget = ledger.points().economic;
    if budget == 0 {
        return report;
    }

    let mut queue: Vec<(f64, UnitId)> = unit_ids
        .iter()
        .filter_map(|id| units.get(id))
        .filter(|u| !u.is_destroyed() && needs_resupply(u, threshold))
        .map(|u| (u.fuel_ratio().min(u.combat_ratio()), u.id))
        .collect();
    queue.sort_by_key(|(ratio, id)| (OrderedFloat(*ratio), *id));

    for (_, id) in queue {
        if budget == 0 {
            break;
        }
        let Some(unit) = units.get_mut(&id) else {
            continue;
        };
        let fuel = unit.add_fuel(budget);
        budget -= fuel;
        let combat = unit.add_combat(budget);
        budget -= combat;

        if fuel + combat > 0 {
            report.units_served += 1;
            report.fuel_added += fuel;
            report.combat_added += combat;
            tracing::debug!(unit = %id, fuel, combat, "Resupplied");
        }
    }

    if let Err(err) = ledger.subtract_points(report.points_spent()) {
        tracing::warn!(%err, "Resupply could not be charged");
    }
    report
}
