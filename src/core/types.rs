//! Core type definitions used throughout the codebase

use std::fmt;

use serde::{Deserialize, Serialize};

/// Game turn counter
pub type Turn = u32;

/// Unique identifier for players (Generals and Commanders alike)
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct PlayerId(pub u32);

impl PlayerId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for units
///
/// Ordered so that every per-unit loop and tie-break is stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnitId(pub u32);

impl UnitId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A faction on the map
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Nation(pub String);

impl Nation {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Nation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Role a player takes in its nation's chain of command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    General,
    Commander,
}

/// Who owns a unit
///
/// Set once when the unit is created; never parsed back out of display text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ownership {
    pub player_id: PlayerId,
    pub nation: Nation,
}

impl Ownership {
    pub fn new(player_id: PlayerId, nation: Nation) -> Self {
        Self { player_id, nation }
    }

    /// Parse the legacy `"2 (Polska)"` owner label
    pub fn parse_legacy(label: &str) -> Option<Self> {
        let (id, rest) = label.trim().split_once(' ')?;
        let player_id = id.trim().parse::<u32>().ok()?;
        let nation = rest.trim().strip_prefix('(')?.strip_suffix(')')?.trim();
        if nation.is_empty() {
            return None;
        }
        Some(Self::new(PlayerId(player_id), Nation::new(nation)))
    }

    pub fn is_ally_of(&self, other: &Ownership) -> bool {
        self.nation == other.nation
    }
}

impl fmt::Display for Ownership {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.player_id, self.nation)
    }
}

/// A player seated at the table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub nation: Nation,
    pub role: Role,
}

impl Player {
    pub fn general(id: PlayerId, nation: Nation) -> Self {
        Self { id, nation, role: Role::General }
    }

    pub fn commander(id: PlayerId, nation: Nation) -> Self {
        Self { id, nation, role: Role::Commander }
    }

    pub fn is_general(&self) -> bool {
        self.role == Role::General
    }
}
