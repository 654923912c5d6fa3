//! World state shared by every player's sub-turn

use std::collections::{BTreeMap, BTreeSet};

use ahash::AHashSet;
use serde::Serialize;

use crate::board::hex::HexCoord;
use crate::board::map::HexMap;
use crate::board::visibility::{calculate_visibility, PlayerVisibility};
use crate::core::config::AiConfig;
use crate::core::error::{CommandError, Result};
use crate::core::types::{Nation, Ownership, Player, PlayerId, Role, Turn, UnitId};
use crate::deployment::DeploymentQueue;
use crate::economy::keypoints::{KeyPoint, KeyPoints};
use crate::economy::ledger::PointLedger;
use crate::orders::mailbox::OrderChannel;
use crate::units::{catalog, Unit, UnitKind, UnitRecord, UnitSize};

/// How the game ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum GameOutcome {
    InProgress,
    Victory(Nation),
    Draw,
}

pub struct World {
    pub map: HexMap,
    pub units: BTreeMap<UnitId, Unit>,
    pub key_points: KeyPoints,
    pub players: BTreeMap<PlayerId, Player>,
    pub ledgers: BTreeMap<PlayerId, PointLedger>,
    pub orders: OrderChannel,
    pub deployments: DeploymentQueue,
    pub visibility: BTreeMap<PlayerId, PlayerVisibility>,
    pub victory_points: BTreeMap<Nation, u32>,
    pub current_turn: Turn,
    pub max_turns: Turn,
    pub next_unit_id: u32,
    pub config: AiConfig,
}

impl World {
    pub fn new(map: HexMap, config: AiConfig, max_turns: Turn) -> Self {
        Self {
            map,
            units: BTreeMap::new(),
            key_points: KeyPoints::new(),
            players: BTreeMap::new(),
            ledgers: BTreeMap::new(),
            orders: OrderChannel::new(),
            deployments: DeploymentQueue::new(),
            visibility: BTreeMap::new(),
            victory_points: BTreeMap::new(),
            current_turn: 1,
            max_turns,
            next_unit_id: 1,
            config,
        }
    }

    /// Seat a player with a starting balance
    pub fn add_player(&mut self, player: Player, starting_points: u32) {
        self.victory_points.entry(player.nation.clone()).or_insert(0);
        self.ledgers.insert(player.id, PointLedger::new(starting_points));
        self.visibility.insert(player.id, PlayerVisibility::new());
        self.players.insert(player.id, player);
    }

    pub fn player(&self, id: PlayerId) -> Result<&Player> {
        self.players.get(&id).ok_or(CommandError::PlayerNotFound(id))
    }

    pub fn ledger(&self, id: PlayerId) -> Result<&PointLedger> {
        self.ledgers.get(&id).ok_or(CommandError::PlayerNotFound(id))
    }

    pub fn ledger_mut(&mut self, id: PlayerId) -> Result<&mut PointLedger> {
        self.ledgers.get_mut(&id).ok_or(CommandError::PlayerNotFound(id))
    }

    pub fn unit(&self, id: UnitId) -> Result<&Unit> {
        self.units.get(&id).ok_or(CommandError::UnitNotFound(id))
    }

    /// Nations in a stable order
    pub fn nations(&self) -> Vec<Nation> {
        self.players
            .values()
            .map(|p| p.nation.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn general_of(&self, nation: &Nation) -> Option<PlayerId> {
        self.players
            .values()
            .find(|p| p.role == Role::General && &p.nation == nation)
            .map(|p| p.id)
    }

    /// Commanders of a nation, ascending id
    pub fn commanders_of(&self, nation: &Nation) -> Vec<PlayerId> {
        self.players
            .values()
            .filter(|p| p.role == Role::Commander && &p.nation == nation)
            .map(|p| p.id)
            .collect()
    }

    pub fn units_of(&self, player: PlayerId) -> impl Iterator<Item = &Unit> {
        self.units
            .values()
            .filter(move |u| u.owner.player_id == player && !u.is_destroyed())
    }

    pub fn victory_points_of(&self, nation: &Nation) -> u32 {
        self.victory_points.get(nation).copied().unwrap_or(0)
    }

    pub fn add_victory_points(&mut self, nation: &Nation, points: u32) {
        *self.victory_points.entry(nation.clone()).or_insert(0) += points;
    }

    pub fn add_key_point(&mut self, key_point: KeyPoint) {
        self.key_points.insert(key_point);
    }

    /// Put a fresh catalog unit on the map
    pub fn spawn_unit(
        &mut self,
        owner: PlayerId,
        kind: UnitKind,
        size: UnitSize,
        position: HexCoord,
    ) -> Result<UnitId> {
        let nation = self.player(owner)?.nation.clone();
        let id = UnitId(self.next_unit_id);
        let unit = Unit::new(
            id,
            kind,
            size,
            Ownership::new(owner, nation),
            position,
            catalog::base_stats(kind, size),
        );
        self.insert_unit(unit)
    }

    /// Import a unit from a loose record
    pub fn add_unit_record(&mut self, record: UnitRecord) -> Result<UnitId> {
        let unit = Unit::from_record(record)?;
        self.player(unit.owner.player_id)?;
        if self.units.contains_key(&unit.id) {
            return Err(CommandError::InvalidUnitRecord(format!(
                "unit {} already exists",
                unit.id
            )));
        }
        self.insert_unit(unit)
    }

    fn insert_unit(&mut self, unit: Unit) -> Result<UnitId> {
        let id = unit.id;
        if !self.map.place(unit.position, id) {
            return Err(CommandError::InvalidUnitRecord(format!(
                "unit {} cannot stand on {:?}",
                id, unit.position
            )));
        }
        self.next_unit_id = self.next_unit_id.max(id.0 + 1);
        self.units.insert(id, unit);
        Ok(id)
    }

    /// Recompute what `player` can see
    ///
    /// A General has no units of its own and sees what its commanders see.
    pub fn refresh_visibility(&mut self, player: PlayerId) -> Result<()> {
        let seat = self.player(player)?.clone();
        let viewers = match seat.role {
            Role::General => self.commanders_of(&seat.nation),
            Role::Commander => vec![player],
        };
        let viewer = Ownership::new(player, seat.nation.clone());

        let mut hexes = AHashSet::new();
        let mut enemies = BTreeSet::new();
        for id in viewers {
            let (seen, spotted) = calculate_visibility(&self.map, id, &viewer, self.units.values());
            hexes.extend(seen);
            enemies.extend(spotted);
        }
        self.visibility
            .entry(player)
            .or_default()
            .update(hexes, enemies);
        Ok(())
    }

    /// Outcome once the last turn has been played; higher VP wins
    pub fn outcome(&self) -> GameOutcome {
        if self.current_turn <= self.max_turns {
            return GameOutcome::InProgress;
        }
        let mut standings: Vec<(&Nation, u32)> =
            self.victory_points.iter().map(|(n, vp)| (n, *vp)).collect();
        standings.sort_by(|a, b| b.1.cmp(&a.1));
        match standings.as_slice() {
            [(leader, top), (_, second), ..] if top > second => {
                GameOutcome::Victory((*leader).clone())
            }
            [(leader, _)] => GameOutcome::Victory((*leader).clone()),
            _ => GameOutcome::Draw,
        }
    }
}
