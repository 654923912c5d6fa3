//! Tactical executor
//!
//! A Commander runs its own units for one sub-turn: refresh, resupply, then
//! each unit in ascending id either attacks at good odds or moves. Movement
//! targets come from the General's order when one is active, otherwise from
//! the defensive subsystem and the autonomous fallback.

pub mod combat;
pub mod context;
pub mod defense;
pub mod missions;
pub mod movement;
pub mod resupply;

use std::collections::BTreeMap;

use serde::Serialize;

use crate::board::hex::HexCoord;
use crate::board::map::HexMap;
use crate::board::visibility::PlayerVisibility;
use crate::core::config::TacticsConfig;
use crate::core::types::{Nation, PlayerId, UnitId};
use crate::economy::keypoints::KeyPoints;
use crate::economy::ledger::Ledger;
use crate::orders::order::StrategicOrder;
use crate::units::{MovementMode, Unit};

pub use combat::{attack_ratio, best_attack, execute_attack, AttackReport};
pub use context::TacticalView;
pub use defense::{autonomous_target, retreat_point, threat_level};
pub use missions::mission_destination;
pub use movement::{move_toward, select_mode, MoveReport};
pub use resupply::{resupply_units, ResupplyReport};

/// Why a unit headed where it did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MoveIntent {
    Retreat,
    Order,
    Grouping,
    Autonomous,
}

/// Everything a Commander did in one sub-turn
#[derive(Debug, Clone, Default, Serialize)]
pub struct CommanderReport {
    pub player: PlayerId,
    pub resupply: ResupplyReport,
    pub attacks: Vec<AttackReport>,
    pub moves: Vec<MoveReport>,
    pub retreats: u32,
    pub captures: Vec<HexCoord>,
    pub destroyed: Vec<UnitId>,
    /// Earned by kills this sub-turn
    pub victory_points: u32,
}

impl CommanderReport {
    fn new(player: PlayerId) -> Self {
        Self {
            player,
            ..Default::default()
        }
    }
}

/// Mutable world state a Commander acts on
pub struct Battlefield<'a> {
    pub map: &'a mut HexMap,
    pub units: &'a mut BTreeMap<UnitId, Unit>,
    pub key_points: &'a mut KeyPoints,
}

/// Tactical AI for one commander player
#[derive(Debug, Clone)]
pub struct Commander {
    pub player: PlayerId,
    pub nation: Nation,
    config: TacticsConfig,
}

impl Commander {
    pub fn new(player: PlayerId, nation: Nation, config: TacticsConfig) -> Self {
        Self {
            player,
            nation,
            config,
        }
    }

    pub fn config(&self) -> &TacticsConfig {
        &self.config
    }

    fn own_unit_ids(&self, units: &BTreeMap<UnitId, Unit>) -> Vec<UnitId> {
        units
            .values()
            .filter(|u| u.owner.player_id == self.player && !u.is_destroyed())
            .map(|u| u.id)
            .collect()
    }

    /// Run one sub-turn
    ///
    /// `order` must already be filtered to the active, non-expired order for
    /// this commander.
    pub fn run_turn(
        &self,
        field: Battlefield<'_>,
        visibility: &PlayerVisibility,
        order: Option<&StrategicOrder>,
        ledger: &mut impl Ledger,
    ) -> CommanderReport {
        let Battlefield {
            map,
            units,
            key_points,
        } = field;
        let mut report = CommanderReport::new(self.player);

        let ids = self.own_unit_ids(units);
        for id in &ids {
            if let Some(unit) = units.get_mut(id) {
                unit.refresh_movement();
            }
        }

        report.resupply = resupply_units(units, &ids, ledger, self.config.resupply_threshold);

        let spawn_points = map.spawn_points_for(&self.nation).to_vec();
        let force_centroid = HexCoord::centroid(
            ids.iter().filter_map(|id| units.get(id)).map(|u| &u.position),
        );

        for (index, id) in ids.iter().enumerate() {
            if !units.contains_key(id) {
                // Lost to counter fire earlier this turn
                continue;
            }

            if self.try_attack(*id, map, units, visibility, &mut report) {
                self.capture_if_standing(*id, units, key_points, &mut report);
                continue;
            }

            let plan = {
                let view = TacticalView {
                    player: self.player,
                    nation: &self.nation,
                    units: &*units,
                    visibility,
                    key_points: &*key_points,
                    spawn_points: &spawn_points,
                };
                units.get(id).and_then(|unit| {
                    self.plan_move(unit, index, &view, &*map, order, force_centroid)
                })
            };

            if let Some((mode, target, intent)) = plan {
                let Some(unit) = units.get_mut(id) else {
                    continue;
                };
                if unit.movement_mode != mode {
                    unit.set_mode(mode);
                }
                match move_toward(unit, target, map) {
                    Some(step) => {
                        if intent == MoveIntent::Retreat {
                            report.retreats += 1;
                        }
                        tracing::debug!(
                            unit = %id,
                            ?intent,
                            from = ?step.from,
                            to = ?step.to,
                            "Moved"
                        );
                        report.moves.push(step);
                    }
                    None => {
                        tracing::debug!(unit = %id, ?intent, ?target, "No move possible, holding");
                    }
                }
            }

            self.capture_if_standing(*id, units, key_points, &mut report);
        }

        tracing::info!(
            player = %self.player,
            nation = %self.nation,
            attacks = report.attacks.len(),
            moves = report.moves.len(),
            retreats = report.retreats,
            captures = report.captures.len(),
            resupplied = report.resupply.points_spent(),
            "Commander turn complete"
        );
        report
    }

    /// Attack the best visible target in range; true if an attack happened
    fn try_attack(
        &self,
        id: UnitId,
        map: &mut HexMap,
        units: &mut BTreeMap<UnitId, Unit>,
        visibility: &PlayerVisibility,
        report: &mut CommanderReport,
    ) -> bool {
        let choice = {
            let Some(attacker) = units.get(&id) else {
                return false;
            };
            let enemies = visibility
                .visible_enemies
                .iter()
                .filter_map(|eid| units.get(eid))
                .filter(|e| e.owner.nation != self.nation);
            best_attack(attacker, enemies, &*map, self.config.attack_ratio)
        };
        let Some((target, ratio)) = choice else {
            return false;
        };

        let Some(outcome) = execute_attack(units, map, id, target) else {
            tracing::warn!(attacker = %id, defender = %target, "Attack target vanished");
            return false;
        };
        tracing::debug!(attacker = %id, defender = %target, ratio, "Attacked");
        if outcome.defender_destroyed {
            report.destroyed.push(outcome.defender);
        }
        if outcome.attacker_destroyed {
            report.destroyed.push(outcome.attacker);
        }
        report.victory_points += outcome.victory_points;
        report.attacks.push(outcome);
        true
    }

    /// Pick the movement mode and destination for one unit
    fn plan_move(
        &self,
        unit: &Unit,
        index: usize,
        view: &TacticalView<'_>,
        map: &HexMap,
        order: Option<&StrategicOrder>,
        force_centroid: Option<HexCoord>,
    ) -> Option<(MovementMode, HexCoord, MoveIntent)> {
        if unit.fuel == 0 {
            return None;
        }
        let enemies = view.visible_enemies();
        let mode = select_mode(view.nearest_enemy_distance(unit.position), &self.config);

        let threat = threat_level(unit, &enemies, &self.config);
        if defense::should_retreat(threat, &self.config) {
            let safe = view.safe_points();
            if let Some(point) = view
                .enemy_centroid()
                .and_then(|centroid| retreat_point(unit.position, centroid, &safe))
            {
                tracing::debug!(unit = %unit.id, threat, ?point, "Retreating");
                return Some((mode, point, MoveIntent::Retreat));
            }
        }

        if let Some(order) = order {
            let centroid = force_centroid.unwrap_or(unit.position);
            let spot = mission_destination(
                order.mission_type,
                order.target_hex,
                index,
                unit,
                centroid,
                &self.config,
            );
            let spot = if map.get_tile(spot).is_some_and(|t| t.terrain.is_passable()) {
                spot
            } else {
                order.target_hex
            };
            return Some((mode, spot, MoveIntent::Order));
        }

        if !enemies.is_empty() {
            let friendly = view.friendly_key_points();
            if let Some(spot) = defense::grouping_point(unit.position, &friendly, index) {
                return Some((mode, spot, MoveIntent::Grouping));
            }
        }

        autonomous_target(unit.position, view.key_points, view.nation)
            .map(|target| (mode, target, MoveIntent::Autonomous))
    }

    fn capture_if_standing(
        &self,
        id: UnitId,
        units: &BTreeMap<UnitId, Unit>,
        key_points: &mut KeyPoints,
        report: &mut CommanderReport,
    ) {
        let Some(unit) = units.get(&id) else {
            return;
        };
        if key_points.capture(unit.position, &unit.owner.nation) {
            tracing::info!(
                unit = %id,
                hex = ?unit.position,
                nation = %unit.owner.nation,
                "Key point captured"
            );
            report.captures.push(unit.position);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Ownership;
    use crate::economy::keypoints::{KeyPoint, KeyPointKind};
    use crate::economy::ledger::PointLedger;
    use crate::orders::order::{MissionType, Priority};
    use crate::units::{catalog, UnitKind, UnitSize};

    fn polska() -> Nation {
        Nation::new("Polska")
    }

    fn niemcy() -> Nation {
        Nation::new("Niemcy")
    }

    fn spawn(
        map: &mut HexMap,
        units: &mut BTreeMap<UnitId, Unit>,
        id: u32,
        kind: UnitKind,
        player: u32,
        nation: Nation,
        pos: HexCoord,
    ) {
        let unit = Unit::new(
            UnitId(id),
            kind,
            UnitSize::Platoon,
            Ownership::new(PlayerId(player), nation),
            pos,
            catalog::base_stats(kind, UnitSize::Platoon),
        );
        assert!(map.place(pos, unit.id));
        units.insert(unit.id, unit);
    }

    fn seen(units: &BTreeMap<UnitId, Unit>, enemy_nation: &Nation) -> PlayerVisibility {
        let mut vis = PlayerVisibility::new();
        vis.visible_enemies = units
            .values()
            .filter(|u| &u.owner.nation == enemy_nation)
            .map(|u| u.id)
            .collect();
        vis
    }

    #[test]
    fn test_attacks_at_good_odds() {
        let mut map = HexMap::new(12, 12);
        let mut units = BTreeMap::new();
        let mut kps = KeyPoints::new();
        spawn(&mut map, &mut units, 1, UnitKind::Armor, 2, polska(), HexCoord::new(3, 3));
        spawn(&mut map, &mut units, 5, UnitKind::Infantry, 9, niemcy(), HexCoord::new(4, 3));
        let vis = seen(&units, &niemcy());
        let mut ledger = PointLedger::new(0);

        let commander = Commander::new(PlayerId(2), polska(), TacticsConfig::default());
        let report = commander.run_turn(
            Battlefield {
                map: &mut map,
                units: &mut units,
                key_points: &mut kps,
            },
            &vis,
            None,
            &mut ledger,
        );

        assert_eq!(report.attacks.len(), 1);
        assert!(report.moves.is_empty());
        assert_eq!(units[&UnitId(1)].movement_points, 0);
        assert_eq!(units[&UnitId(1)].position, HexCoord::new(3, 3));
    }

    #[test]
    fn test_bad_odds_no_attack() {
        let mut map = HexMap::new(12, 12);
        let mut units = BTreeMap::new();
        let mut kps = KeyPoints::new();
        spawn(&mut map, &mut units, 1, UnitKind::Infantry, 2, polska(), HexCoord::new(3, 3));
        spawn(&mut map, &mut units, 5, UnitKind::Armor, 9, niemcy(), HexCoord::new(4, 3));
        let vis = seen(&units, &niemcy());
        let mut ledger = PointLedger::new(0);

        let commander = Commander::new(PlayerId(2), polska(), TacticsConfig::default());
        let report = commander.run_turn(
            Battlefield {
                map: &mut map,
                units: &mut units,
                key_points: &mut kps,
            },
            &vis,
            None,
            &mut ledger,
        );
        assert!(report.attacks.is_empty());
        assert_eq!(units[&UnitId(5)].combat, units[&UnitId(5)].stats.max_combat);
    }

    #[test]
    fn test_follows_order_and_captures() {
        let mut map = HexMap::new(12, 12);
        let mut units = BTreeMap::new();
        let target = HexCoord::new(4, 2);
        let mut kps: KeyPoints = vec![KeyPoint::new(target, KeyPointKind::Village, 20)]
            .into_iter()
            .collect();
        spawn(&mut map, &mut units, 1, UnitKind::Armor, 2, polska(), HexCoord::new(2, 2));
        let vis = PlayerVisibility::new();
        let mut ledger = PointLedger::new(0);
        let order = StrategicOrder::new(
            PlayerId(2),
            MissionType::SecureKeypoint,
            target,
            Priority::Medium,
            1,
        );

        let commander = Commander::new(PlayerId(2), polska(), TacticsConfig::default());
        let report = commander.run_turn(
            Battlefield {
                map: &mut map,
                units: &mut units,
                key_points: &mut kps,
            },
            &vis,
            Some(&order),
            &mut ledger,
        );

        assert_eq!(units[&UnitId(1)].position, target);
        assert_eq!(report.captures, vec![target]);
        assert!(kps.get(target).is_some_and(|kp| kp.is_held_by(&polska())));
    }

    #[test]
    fn test_autonomous_fallback_without_order() {
        let mut map = HexMap::new(12, 12);
        let mut units = BTreeMap::new();
        let mut kps: KeyPoints = vec![
            KeyPoint::new(HexCoord::new(8, 2), KeyPointKind::Village, 20),
            KeyPoint::new(HexCoord::new(2, 9), KeyPointKind::Village, 0),
        ]
        .into_iter()
        .collect();
        spawn(&mut map, &mut units, 1, UnitKind::Infantry, 2, polska(), HexCoord::new(2, 2));
        let vis = PlayerVisibility::new();
        let mut ledger = PointLedger::new(0);

        let commander = Commander::new(PlayerId(2), polska(), TacticsConfig::default());
        let report = commander.run_turn(
            Battlefield {
                map: &mut map,
                units: &mut units,
                key_points: &mut kps,
            },
            &vis,
            None,
            &mut ledger,
        );

        assert_eq!(report.moves.len(), 1);
        let after = units[&UnitId(1)].position;
        assert!(after.distance(&HexCoord::new(8, 2)) < 6);
    }

    #[test]
    fn test_threatened_unit_retreats() {
        let mut map = HexMap::new(16, 16);
        let mut units = BTreeMap::new();
        let mut kps = KeyPoints::new();
        map.add_spawn_point(polska(), HexCoord::new(0, 5));
        // Supply truck can't attack and sits next to two armor platoons
        spawn(&mut map, &mut units, 1, UnitKind::Supply, 2, polska(), HexCoord::new(5, 5));
        spawn(&mut map, &mut units, 7, UnitKind::Armor, 9, niemcy(), HexCoord::new(6, 5));
        spawn(&mut map, &mut units, 8, UnitKind::Armor, 9, niemcy(), HexCoord::new(6, 4));
        let vis = seen(&units, &niemcy());
        let mut ledger = PointLedger::new(0);
        let order = StrategicOrder::new(
            PlayerId(2),
            MissionType::AttackEnemyVP,
            HexCoord::new(12, 5),
            Priority::High,
            1,
        );

        let commander = Commander::new(PlayerId(2), polska(), TacticsConfig::default());
        let report = commander.run_turn(
            Battlefield {
                map: &mut map,
                units: &mut units,
                key_points: &mut kps,
            },
            &vis,
            Some(&order),
            &mut ledger,
        );

        assert_eq!(report.retreats, 1);
        assert!(units[&UnitId(1)].position.distance(&HexCoord::new(6, 5)) > 1);
    }

    #[test]
    fn test_resupply_spends_commander_points() {
        let mut map = HexMap::new(8, 8);
        let mut units = BTreeMap::new();
        let mut kps = KeyPoints::new();
        spawn(&mut map, &mut units, 1, UnitKind::Infantry, 2, polska(), HexCoord::new(1, 1));
        if let Some(u) = units.get_mut(&UnitId(1)) {
            u.fuel = 1;
        }
        let vis = PlayerVisibility::new();
        let mut ledger = PointLedger::new(10);

        let commander = Commander::new(PlayerId(2), polska(), TacticsConfig::default());
        let report = commander.run_turn(
            Battlefield {
                map: &mut map,
                units: &mut units,
                key_points: &mut kps,
            },
            &vis,
            None,
            &mut ledger,
        );
        assert_eq!(report.resupply.fuel_added, 4);
        assert_eq!(ledger.points().economic, 6);
    }
}
