//! Board: hex geometry, terrain, occupancy, pathfinding and fog of war
//!
//! The AI consumes the board through the `Board` trait and per-player
//! `PlayerVisibility`; it never mutates terrain.

pub mod hex;
pub mod map;
pub mod pathfinding;
pub mod terrain;
pub mod visibility;

pub use hex::{HexCoord, HexDirection};
pub use map::{Board, HexMap, Tile};
pub use pathfinding::path_cost;
pub use terrain::Terrain;
pub use visibility::{calculate_visibility, update_player_visibility, PlayerVisibility};
