//! Movement mode and bounded moves

use serde::Serialize;

use crate::board::hex::HexCoord;
use crate::board::map::{Board, HexMap};
use crate::board::pathfinding::FUEL_PER_HEX;
use crate::core::config::TacticsConfig;
use crate::core::types::UnitId;
use crate::units::{MovementMode, Unit};

/// Posture from the distance to the nearest visible enemy
pub fn select_mode(nearest_enemy: Option<u32>, config: &TacticsConfig) -> MovementMode {
    match nearest_enemy {
        Some(d) if d <= config.recon_distance => MovementMode::Recon,
        Some(d) if d <= config.combat_distance => MovementMode::Combat,
        _ => MovementMode::March,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveReport {
    pub unit: UnitId,
    pub from: HexCoord,
    pub to: HexCoord,
    pub hexes: u32,
    pub mp_spent: u32,
    pub fuel_spent: u32,
}

/// Walk `unit` toward `target` as far as its movement points and fuel allow
///
/// Returns `None` when there is no route or the unit cannot take a step.
pub fn move_toward(unit: &mut Unit, target: HexCoord, map: &mut HexMap) -> Option<MoveReport> {
    if unit.position == target || unit.movement_points == 0 || unit.fuel < FUEL_PER_HEX {
        return None;
    }
    let path = map.find_path(unit.position, target, unit.movement_points, unit.fuel)?;
    if path.len() < 2 {
        return None;
    }

    let mut mp_spent = 0;
    for coord in path.iter().skip(1) {
        mp_spent += map
            .get_tile(*coord)
            .and_then(|t| t.terrain.movement_cost())
            .unwrap_or(0);
    }
    let hexes = (path.len() - 1) as u32;
    let fuel_spent = hexes * FUEL_PER_HEX;

    let from = unit.position;
    let to = *path.last()?;
    map.vacate(from, unit.id);
    if !map.place(to, unit.id) {
        // Destination got taken; stay put
        map.place(from, unit.id);
        return None;
    }

    unit.position = to;
    unit.movement_points = unit.movement_points.saturating_sub(mp_spent);
    unit.burn_fuel(fuel_spent);

    Some(MoveReport {
        unit: unit.id,
        from,
        to,
        hexes,
        mp_spent,
        fuel_spent,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::terrain::Terrain;
    use crate::core::types::{Nation, Ownership, PlayerId};
    use crate::units::{catalog, UnitKind, UnitSize};

    fn infantry(pos: HexCoord) -> Unit {
        Unit::new(
            UnitId(1),
            UnitKind::Infantry,
            UnitSize::Platoon,
            Ownership::new(PlayerId(2), Nation::new("Polska")),
            pos,
            catalog::base_stats(UnitKind::Infantry, UnitSize::Platoon),
        )
    }

    #[test]
    fn test_mode_by_enemy_distance() {
        let config = TacticsConfig::default();
        assert_eq!(select_mode(Some(2), &config), MovementMode::Recon);
        assert_eq!(select_mode(Some(3), &config), MovementMode::Recon);
        assert_eq!(select_mode(Some(4), &config), MovementMode::Combat);
        assert_eq!(select_mode(Some(6), &config), MovementMode::Combat);
        assert_eq!(select_mode(Some(7), &config), MovementMode::March);
        assert_eq!(select_mode(None, &config), MovementMode::March);
    }

    #[test]
    fn test_move_pays_terrain_and_fuel() {
        let mut map = HexMap::new(10, 10);
        map.set_terrain(HexCoord::new(1, 0), Terrain::Forest);
        let mut unit = infantry(HexCoord::new(0, 0));
        map.place(unit.position, unit.id);

        // 3 MP straight east: forest (2) + plains (1)
        let report = move_toward(&mut unit, HexCoord::new(6, 0), &mut map).expect("moves");
        assert!(report.mp_spent <= 3);
        assert_eq!(unit.fuel, unit.stats.max_fuel - report.fuel_spent);
        assert_eq!(map.occupant(unit.position), Some(unit.id));
        assert!(!map.is_occupied(HexCoord::new(0, 0)));
    }

    #[test]
    fn test_no_fuel_no_move() {
        let mut map = HexMap::new(10, 10);
        let mut unit = infantry(HexCoord::new(0, 0));
        unit.fuel = 0;
        assert!(move_toward(&mut unit, HexCoord::new(5, 0), &mut map).is_none());
        assert_eq!(unit.position, HexCoord::new(0, 0));
    }

    #[test]
    fn test_fuel_limits_distance() {
        let mut map = HexMap::new(10, 10);
        let mut unit = infantry(HexCoord::new(0, 0));
        unit.fuel = 1;
        let report = move_toward(&mut unit, HexCoord::new(5, 0), &mut map).expect("one step");
        assert_eq!(report.hexes, 1);
        assert_eq!(unit.fuel, 0);
    }

    #[test]
    fn test_unreachable_target() {
        let mut map = HexMap::new(10, 10);
        map.set_terrain(HexCoord::new(5, 5), Terrain::Water);
        let mut unit = infantry(HexCoord::new(0, 0));
        assert!(move_toward(&mut unit, HexCoord::new(5, 5), &mut map).is_none());
    }
}
