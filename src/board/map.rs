//! Hex map with terrain, occupancy, spawn points and line of sight

use std::collections::BTreeMap;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::board::hex::HexCoord;
use crate::board::pathfinding;
use crate::board::terrain::Terrain;
use crate::core::types::{Nation, UnitId};

/// A single hex on the map
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tile {
    pub coord: HexCoord,
    pub terrain: Terrain,
    pub occupant: Option<UnitId>,
}

impl Tile {
    pub fn new(coord: HexCoord, terrain: Terrain) -> Self {
        Self {
            coord,
            terrain,
            occupant: None,
        }
    }

    pub fn defense_mod(&self) -> u32 {
        self.terrain.defense_mod()
    }
}

/// Board queries the AI relies on
///
/// The engine that owns the map implements this; the AI never touches tile
/// storage directly.
pub trait Board {
    fn hex_distance(&self, a: HexCoord, b: HexCoord) -> u32 {
        a.distance(&b)
    }

    /// Path from `start` toward `goal`, cut to what `max_mp` and `max_fuel` allow
    ///
    /// The returned path starts at `start`. `None` means no route exists.
    fn find_path(
        &self,
        start: HexCoord,
        goal: HexCoord,
        max_mp: u32,
        max_fuel: u32,
    ) -> Option<Vec<HexCoord>>;

    fn is_occupied(&self, hex: HexCoord) -> bool;

    fn neighbors(&self, hex: HexCoord) -> [HexCoord; 6] {
        hex.neighbors()
    }

    fn tile(&self, hex: HexCoord) -> Option<&Tile>;
}

/// The full map
#[derive(Debug, Clone)]
pub struct HexMap {
    pub tiles: AHashMap<HexCoord, Tile>,
    pub width: u32,
    pub height: u32,
    pub spawn_points: BTreeMap<Nation, Vec<HexCoord>>,
}

impl HexMap {
    /// Create a new map covered in plains
    pub fn new(width: u32, height: u32) -> Self {
        let mut tiles = AHashMap::new();

        for q in 0..width as i32 {
            for r in 0..height as i32 {
                let coord = HexCoord::new(q, r);
                tiles.insert(coord, Tile::new(coord, Terrain::Plains));
            }
        }

        Self {
            tiles,
            width,
            height,
            spawn_points: BTreeMap::new(),
        }
    }

    pub fn get_tile(&self, coord: HexCoord) -> Option<&Tile> {
        self.tiles.get(&coord)
    }

    pub fn get_tile_mut(&mut self, coord: HexCoord) -> Option<&mut Tile> {
        self.tiles.get_mut(&coord)
    }

    /// Check if coordinate is within map bounds
    pub fn in_bounds(&self, coord: HexCoord) -> bool {
        coord.q >= 0 && coord.r >= 0 && coord.q < self.width as i32 && coord.r < self.height as i32
    }

    pub fn set_terrain(&mut self, coord: HexCoord, terrain: Terrain) {
        if let Some(tile) = self.get_tile_mut(coord) {
            tile.terrain = terrain;
        }
    }

    pub fn add_spawn_point(&mut self, nation: Nation, coord: HexCoord) {
        let points = self.spawn_points.entry(nation).or_default();
        if !points.contains(&coord) {
            points.push(coord);
        }
    }

    pub fn spawn_points_for(&self, nation: &Nation) -> &[HexCoord] {
        self.spawn_points
            .get(nation)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Can a unit stand here right now?
    pub fn is_free(&self, coord: HexCoord) -> bool {
        self.get_tile(coord)
            .map(|t| t.terrain.is_passable() && t.occupant.is_none())
            .unwrap_or(false)
    }

    pub fn occupant(&self, coord: HexCoord) -> Option<UnitId> {
        self.get_tile(coord).and_then(|t| t.occupant)
    }

    /// Mark a unit as standing on `coord`; fails if the hex is taken or invalid
    pub fn place(&mut self, coord: HexCoord, unit: UnitId) -> bool {
        match self.get_tile_mut(coord) {
            Some(tile) if tile.terrain.is_passable() && tile.occupant.is_none() => {
                tile.occupant = Some(unit);
                true
            }
            _ => false,
        }
    }

    /// Clear the hex if `unit` is standing there
    pub fn vacate(&mut self, coord: HexCoord, unit: UnitId) {
        if let Some(tile) = self.get_tile_mut(coord) {
            if tile.occupant == Some(unit) {
                tile.occupant = None;
            }
        }
    }

    /// Check line of sight between two hexes
    pub fn has_line_of_sight(&self, from: HexCoord, to: HexCoord) -> bool {
        let line = from.line_to(&to);

        // Check all hexes except start and end
        for coord in line.iter().skip(1).take(line.len().saturating_sub(2)) {
            if let Some(tile) = self.get_tile(*coord) {
                if tile.terrain.blocks_los() {
                    return false;
                }
            }
        }

        true
    }

    /// Get all hexes visible from a position with given range
    pub fn visible_hexes(&self, from: HexCoord, range: u32) -> Vec<HexCoord> {
        from.hexes_in_range(range)
            .into_iter()
            .filter(|coord| self.in_bounds(*coord) && self.has_line_of_sight(from, *coord))
            .collect()
    }
}

impl Board for HexMap {
    fn find_path(
        &self,
        start: HexCoord,
        goal: HexCoord,
        max_mp: u32,
        max_fuel: u32,
    ) -> Option<Vec<HexCoord>> {
        let full = pathfinding::find_path(self, start, goal)?;
        Some(pathfinding::truncate_to_budget(self, &full, max_mp, max_fuel))
    }

    fn is_occupied(&self, hex: HexCoord) -> bool {
        self.occupant(hex).is_some()
    }

    fn tile(&self, hex: HexCoord) -> Option<&Tile> {
        self.get_tile(hex)
    }
}
