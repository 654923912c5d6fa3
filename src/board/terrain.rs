//! Terrain types and their effects on movement, defense and sight

use serde::{Deserialize, Serialize};

/// Primary terrain type for a hex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Terrain {
    #[default]
    Plains,
    Road,
    Forest,
    Hills,
    Swamp,
    Urban,
    Mountains,
    Water,
}

impl Terrain {
    /// Movement points needed to enter; `None` when impassable
    pub fn movement_cost(&self) -> Option<u32> {
        match self {
            Terrain::Plains => Some(1),
            Terrain::Road => Some(1),
            Terrain::Urban => Some(1),
            Terrain::Forest => Some(2),
            Terrain::Hills => Some(2),
            Terrain::Swamp => Some(3),
            Terrain::Mountains => Some(3),
            Terrain::Water => None,
        }
    }

    /// Added to a defender's defense value (additive, never a multiplier)
    pub fn defense_mod(&self) -> u32 {
        match self {
            Terrain::Plains | Terrain::Road | Terrain::Water => 0,
            Terrain::Swamp => 1,
            Terrain::Forest | Terrain::Hills => 2,
            Terrain::Urban => 3,
            Terrain::Mountains => 4,
        }
    }

    /// Does this terrain block line of sight?
    pub fn blocks_los(&self) -> bool {
        matches!(self, Terrain::Forest | Terrain::Urban | Terrain::Mountains)
    }

    pub fn is_passable(&self) -> bool {
        self.movement_cost().is_some()
    }
}
