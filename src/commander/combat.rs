//! Attack selection and resolution
//!
//! A unit only attacks when the odds are good: its attack value against the
//! defender's defense plus terrain must reach the configured ratio.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use ordered_float::OrderedFloat;
use serde::Serialize;

use crate::board::map::{Board, HexMap};
use crate::core::types::UnitId;
use crate::units::Unit;

/// Fuel an attack burns
pub const ATTACK_FUEL_COST: u32 = 1;

/// Defense of a unit on its current hex
pub fn effective_defense(defender: &Unit, board: &impl Board) -> u32 {
    let terrain = board
        .tile(defender.position)
        .map(|t| t.defense_mod())
        .unwrap_or(0);
    defender.stats.defense_value + terrain
}

/// `attack / (defense + terrain)`; a zero denominator counts as one
pub fn attack_ratio(attacker: &Unit, defender: &Unit, board: &impl Board) -> f64 {
    attacker.stats.attack_value as f64 / effective_defense(defender, board).max(1) as f64
}

/// The best target in range, if any clears `min_ratio`
///
/// Highest ratio wins; ties go to the lowest unit id.
pub fn best_attack<'a>(
    attacker: &Unit,
    enemies: impl IntoIterator<Item = &'a Unit>,
    board: &impl Board,
    min_ratio: f64,
) -> Option<(UnitId, f64)> {
    if !attacker.can_attack() || attacker.stats.attack_range == 0 {
        return None;
    }
    enemies
        .into_iter()
        .filter(|e| !e.is_destroyed())
        .filter(|e| {
            board.hex_distance(attacker.position, e.position) <= attacker.stats.attack_range
        })
        .map(|e| (e.id, attack_ratio(attacker, e, board)))
        .filter(|(_, ratio)| *ratio >= min_ratio)
        .max_by_key(|(id, ratio)| (OrderedFloat(*ratio), Reverse(*id)))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttackReport {
    pub attacker: UnitId,
    pub defender: UnitId,
    pub damage: u32,
    pub counter_damage: u32,
    pub defender_destroyed: bool,
    pub attacker_destroyed: bool,
    /// Victory points earned by the attacker's nation
    pub victory_points: u32,
}

/// Resolve one attack between two units
///
/// The defender loses `max(1, attack - defense / 2)`. A surviving defender
/// with the attacker in range fires back for a third of its attack.
pub fn resolve_attack(
    attacker: &mut Unit,
    defender: &mut Unit,
    board: &impl Board,
) -> AttackReport {
    let defense = effective_defense(defender, board);
    let damage = attacker.stats.attack_value.saturating_sub(defense / 2).max(1);
    defender.take_damage(damage);

    let distance = board.hex_distance(attacker.position, defender.position);
    let counter_damage = if !defender.is_destroyed() && distance <= defender.stats.attack_range {
        defender.stats.attack_value / 3
    } else {
        0
    };
    attacker.take_damage(counter_damage);

    attacker.burn_fuel(ATTACK_FUEL_COST);
    attacker.movement_points = 0;

    let mut victory_points = 0;
    if defender.is_destroyed() {
        victory_points += defender.stats.max_combat;
    }

    AttackReport {
        attacker: attacker.id,
        defender: defender.id,
        damage,
        counter_damage,
        defender_destroyed: defender.is_destroyed(),
        attacker_destroyed: attacker.is_destroyed(),
        victory_points,
    }
}

/// Attack `target` with `attacker_id`, removing any unit destroyed
pub fn execute_attack(
    units: &mut BTreeMap<UnitId, Unit>,
    map: &mut HexMap,
    attacker_id: UnitId,
    target: UnitId,
) -> Option<AttackReport> {
    let mut defender = units.remove(&target)?;
    let Some(attacker) = units.get_mut(&attacker_id) else {
        units.insert(target, defender);
        return None;
    };

    let report = resolve_attack(attacker, &mut defender, &*map);
    tracing::debug!(
        attacker = %report.attacker,
        defender = %report.defender,
        damage = report.damage,
        counter = report.counter_damage,
        "Attack"
    );

    if report.attacker_destroyed {
        let position = attacker.position;
        units.remove(&attacker_id);
        map.vacate(position, attacker_id);
    }
    if report.defender_destroyed {
        map.vacate(defender.position, target);
    } else {
        units.insert(target, defender);
    }
    Some(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::hex::HexCoord;
    use crate::board::terrain::Terrain;
    use crate::core::types::{Nation, Ownership, PlayerId};
    use crate::units::{catalog, UnitKind, UnitSize};

    fn unit(id: u32, kind: UnitKind, nation: &str, pos: HexCoord) -> Unit {
        Unit::new(
            UnitId(id),
            kind,
            UnitSize::Platoon,
            Ownership::new(PlayerId(if nation == "Polska" { 2 } else { 9 }), Nation::new(nation)),
            pos,
            catalog::base_stats(kind, UnitSize::Platoon),
        )
    }

    #[test]
    fn test_no_attack_below_ratio() {
        let map = HexMap::new(10, 10);
        // Infantry 4 attack vs infantry 4 defense: ratio 1.0
        let attacker = unit(1, UnitKind::Infantry, "Polska", HexCoord::new(0, 0));
        let defender = unit(2, UnitKind::Infantry, "Niemcy", HexCoord::new(1, 0));
        assert!(best_attack(&attacker, [&defender], &map, 1.3).is_none());
    }

    #[test]
    fn test_attack_at_good_odds() {
        let map = HexMap::new(10, 10);
        // Armor 8 attack vs infantry 4 defense: ratio 2.0
        let attacker = unit(1, UnitKind::Armor, "Polska", HexCoord::new(0, 0));
        let defender = unit(2, UnitKind::Infantry, "Niemcy", HexCoord::new(1, 0));
        let (target, ratio) = best_attack(&attacker, [&defender], &map, 1.3).expect("attack");
        assert_eq!(target, UnitId(2));
        assert!((ratio - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_terrain_protects_defender() {
        let mut map = HexMap::new(10, 10);
        map.set_terrain(HexCoord::new(1, 0), Terrain::Mountains);
        // Armor 8 vs infantry 4 + mountains 4: ratio 1.0
        let attacker = unit(1, UnitKind::Armor, "Polska", HexCoord::new(0, 0));
        let defender = unit(2, UnitKind::Infantry, "Niemcy", HexCoord::new(1, 0));
        assert!(best_attack(&attacker, [&defender], &map, 1.3).is_none());
    }

    #[test]
    fn test_out_of_range_ignored() {
        let map = HexMap::new(10, 10);
        let attacker = unit(1, UnitKind::Armor, "Polska", HexCoord::new(0, 0));
        let defender = unit(2, UnitKind::Supply, "Niemcy", HexCoord::new(3, 0));
        assert!(best_attack(&attacker, [&defender], &map, 1.3).is_none());
    }

    #[test]
    fn test_tie_goes_to_lowest_id() {
        let map = HexMap::new(10, 10);
        let attacker = unit(1, UnitKind::Artillery, "Polska", HexCoord::new(0, 0));
        let a = unit(7, UnitKind::Infantry, "Niemcy", HexCoord::new(2, 0));
        let b = unit(5, UnitKind::Infantry, "Niemcy", HexCoord::new(0, 2));
        let (target, _) = best_attack(&attacker, [&a, &b], &map, 1.3).expect("attack");
        assert_eq!(target, UnitId(5));
    }

    #[test]
    fn test_attack_zeroes_movement_and_burns_fuel() {
        let mut map = HexMap::new(10, 10);
        let mut units = BTreeMap::new();
        let attacker = unit(1, UnitKind::Armor, "Polska", HexCoord::new(0, 0));
        let defender = unit(2, UnitKind::Infantry, "Niemcy", HexCoord::new(1, 0));
        map.place(attacker.position, attacker.id);
        map.place(defender.position, defender.id);
        units.insert(attacker.id, attacker);
        units.insert(defender.id, defender);

        let report =
            execute_attack(&mut units, &mut map, UnitId(1), UnitId(2)).expect("both exist");
        // 8 - 4 / 2 = 6 damage; infantry fires back 4 / 3 = 1
        assert_eq!(report.damage, 6);
        assert_eq!(report.counter_damage, 1);
        let attacker = &units[&UnitId(1)];
        assert_eq!(attacker.movement_points, 0);
        assert_eq!(attacker.fuel, attacker.stats.max_fuel - ATTACK_FUEL_COST);
        assert_eq!(units[&UnitId(2)].combat, 4);
    }

    #[test]
    fn test_destroyed_defender_removed_and_scores() {
        let mut map = HexMap::new(10, 10);
        let mut units = BTreeMap::new();
        let attacker = unit(1, UnitKind::Armor, "Polska", HexCoord::new(0, 0));
        let mut defender = unit(2, UnitKind::Supply, "Niemcy", HexCoord::new(1, 0));
        defender.combat = 1;
        map.place(defender.position, defender.id);
        units.insert(attacker.id, attacker);
        units.insert(defender.id, defender);

        let report =
            execute_attack(&mut units, &mut map, UnitId(1), UnitId(2)).expect("both exist");
        assert!(report.defender_destroyed);
        assert_eq!(report.victory_points, 4);
        assert_eq!(report.counter_damage, 0);
        assert!(!units.contains_key(&UnitId(2)));
        assert!(!map.is_occupied(HexCoord::new(1, 0)));
    }

    #[test]
    fn test_minimum_damage_is_one() {
        let map = HexMap::new(10, 10);
        let mut attacker = unit(1, UnitKind::Recon, "Polska", HexCoord::new(0, 0));
        let mut defender = unit(2, UnitKind::Armor, "Niemcy", HexCoord::new(1, 0));
        // Recon 3 attack vs armor 6 defense: 3 - 3 = 0, floored to 1
        let report = resolve_attack(&mut attacker, &mut defender, &map);
        assert_eq!(report.damage, 1);
    }
}
