//! Hex coordinate system (axial coordinates)
//!
//! Uses axial coordinates (q, r) for easy neighbor calculation.

use serde::{Deserialize, Serialize};

/// Axial hex coordinate
///
/// Serializes as a `[q, r]` pair, the shape used by order records.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(from = "[i32; 2]", into = "[i32; 2]")]
pub struct HexCoord {
    pub q: i32,
    pub r: i32,
}

impl From<[i32; 2]> for HexCoord {
    fn from([q, r]: [i32; 2]) -> Self {
        Self { q, r }
    }
}

impl From<HexCoord> for [i32; 2] {
    fn from(coord: HexCoord) -> Self {
        [coord.q, coord.r]
    }
}

impl HexCoord {
    pub fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Cube coordinate S (derived from q and r)
    pub fn s(&self) -> i32 {
        -self.q - self.r
    }

    /// Manhattan distance in hex space
    pub fn distance(&self, other: &Self) -> u32 {
        let dq = (self.q - other.q).abs();
        let dr = (self.r - other.r).abs();
        let ds = (self.s() - other.s()).abs();
        ((dq + dr + ds) / 2) as u32
    }

    /// Get all 6 neighboring hex coordinates
    pub fn neighbors(&self) -> [HexCoord; 6] {
        HexDirection::all().map(|d| self.offset(d, 1))
    }

    /// The hex `steps` away in `direction`
    pub fn offset(&self, direction: HexDirection, steps: i32) -> HexCoord {
        let delta = direction.delta();
        HexCoord::new(self.q + delta.q * steps, self.r + delta.r * steps)
    }

    /// Hexes exactly `radius` away, starting east and walking counter-clockwise
    pub fn ring(&self, radius: u32) -> Vec<HexCoord> {
        if radius == 0 {
            return vec![*self];
        }
        let radius = radius as i32;
        let mut results = Vec::with_capacity(6 * radius as usize);
        // Start on the south-west corner so the walk begins heading east
        let mut current = self.offset(HexDirection::SouthWest, radius);
        for direction in HexDirection::all() {
            for _ in 0..radius {
                results.push(current);
                current = current.offset(direction, 1);
            }
        }
        results
    }

    /// Get all hexes within range (inclusive)
    pub fn hexes_in_range(&self, range: u32) -> Vec<HexCoord> {
        let range = range as i32;
        let mut results = Vec::new();
        for q in -range..=range {
            for r in (-range).max(-q - range)..=range.min(-q + range) {
                results.push(HexCoord::new(self.q + q, self.r + r));
            }
        }
        results
    }

    /// Get hex coordinates in a line from self to other (inclusive)
    pub fn line_to(&self, other: &Self) -> Vec<HexCoord> {
        let n = self.distance(other) as i32;
        if n == 0 {
            return vec![*self];
        }

        let mut results = Vec::with_capacity((n + 1) as usize);
        for i in 0..=n {
            let t = i as f32 / n as f32;
            let q = self.q as f32 + (other.q - self.q) as f32 * t;
            let r = self.r as f32 + (other.r - self.r) as f32 * t;
            results.push(Self::round(q, r));
        }
        results
    }

    /// Walk `steps` hexes from self toward `target`, stopping on it
    pub fn toward(&self, target: &HexCoord, steps: u32) -> HexCoord {
        let n = self.distance(target);
        if n == 0 || steps >= n {
            return *target;
        }
        let t = steps as f32 / n as f32;
        let q = self.q as f32 + (target.q - self.q) as f32 * t;
        let r = self.r as f32 + (target.r - self.r) as f32 * t;
        Self::round(q, r)
    }

    /// Average position of a set of hexes
    pub fn centroid<'a>(coords: impl IntoIterator<Item = &'a HexCoord>) -> Option<HexCoord> {
        let (mut sum_q, mut sum_r, mut count) = (0i64, 0i64, 0i64);
        for c in coords {
            sum_q += c.q as i64;
            sum_r += c.r as i64;
            count += 1;
        }
        if count == 0 {
            return None;
        }
        Some(Self::round(
            sum_q as f32 / count as f32,
            sum_r as f32 / count as f32,
        ))
    }

    /// Round floating point hex to nearest integer hex
    fn round(q: f32, r: f32) -> Self {
        let s = -q - r;
        let mut rq = q.round();
        let mut rr = r.round();
        let rs = s.round();

        let q_diff = (rq - q).abs();
        let r_diff = (rr - r).abs();
        let s_diff = (rs - s).abs();

        if q_diff > r_diff && q_diff > s_diff {
            rq = -rr - rs;
        } else if r_diff > s_diff {
            rr = -rq - rs;
        }

        Self::new(rq as i32, rr as i32)
    }
}

/// Direction enum for hex headings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum HexDirection {
    #[default]
    East,
    NorthEast,
    NorthWest,
    West,
    SouthWest,
    SouthEast,
}

impl HexDirection {
    /// Get the hex offset for this direction
    pub fn delta(&self) -> HexCoord {
        match self {
            HexDirection::East => HexCoord::new(1, 0),
            HexDirection::NorthEast => HexCoord::new(1, -1),
            HexDirection::NorthWest => HexCoord::new(0, -1),
            HexDirection::West => HexCoord::new(-1, 0),
            HexDirection::SouthWest => HexCoord::new(-1, 1),
            HexDirection::SouthEast => HexCoord::new(0, 1),
        }
    }

    /// Get opposite direction
    pub fn opposite(&self) -> Self {
        match self {
            HexDirection::East => HexDirection::West,
            HexDirection::NorthEast => HexDirection::SouthWest,
            HexDirection::NorthWest => HexDirection::SouthEast,
            HexDirection::West => HexDirection::East,
            HexDirection::SouthWest => HexDirection::NorthEast,
            HexDirection::SouthEast => HexDirection::NorthWest,
        }
    }

    /// All directions, counter-clockwise from east
    pub fn all() -> [HexDirection; 6] {
        [
            HexDirection::East,
            HexDirection::NorthEast,
            HexDirection::NorthWest,
            HexDirection::West,
            HexDirection::SouthWest,
            HexDirection::SouthEast,
        ]
    }

    /// Direction for slot `index`, wrapping every six
    pub fn from_index(index: usize) -> Self {
        Self::all()[index % 6]
    }
}
