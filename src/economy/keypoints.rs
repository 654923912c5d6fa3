//! Key points: objectives that pay income while held
//!
//! Each payout drains the key point's value; an exhausted key point leaves
//! the map.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::board::hex::HexCoord;
use crate::core::types::Nation;

/// Kind of objective
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyPointKind {
    City,
    Fortress,
    Depot,
    Bridge,
    Village,
}

impl KeyPointKind {
    /// Extra worth when scoring a key point as a target
    pub fn fortification_bonus(&self) -> f64 {
        match self {
            KeyPointKind::Fortress => 30.0,
            KeyPointKind::City => 15.0,
            KeyPointKind::Bridge => 10.0,
            KeyPointKind::Depot => 5.0,
            KeyPointKind::Village => 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyPoint {
    pub hex: HexCoord,
    pub kind: KeyPointKind,
    pub value: u32,
    #[serde(default)]
    pub controller: Option<Nation>,
}

impl KeyPoint {
    pub fn new(hex: HexCoord, kind: KeyPointKind, value: u32) -> Self {
        Self {
            hex,
            kind,
            value,
            controller: None,
        }
    }

    pub fn controlled_by(mut self, nation: Nation) -> Self {
        self.controller = Some(nation);
        self
    }

    pub fn is_held_by(&self, nation: &Nation) -> bool {
        self.controller.as_ref() == Some(nation)
    }

    pub fn is_neutral(&self) -> bool {
        self.controller.is_none()
    }

    /// Held by someone other than `nation`
    pub fn is_enemy_of(&self, nation: &Nation) -> bool {
        matches!(&self.controller, Some(c) if c != nation)
    }

    /// Target score as seen from `from`: `(value + bonus) / max(distance, 1)`
    pub fn score_from(&self, from: HexCoord) -> f64 {
        let distance = from.distance(&self.hex).max(1) as f64;
        (self.value as f64 + self.kind.fortification_bonus()) / distance
    }

    /// Income this key point pays this turn
    pub fn income(&self, rate: f64) -> u32 {
        if self.value == 0 {
            return 0;
        }
        // Nudge down so 30 * 0.1 does not round up to 4
        (((self.value as f64 * rate) - 1e-9).ceil() as u32).clamp(1, self.value)
    }
}

/// All key points on the map, keyed by hex
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<KeyPoint>", into = "Vec<KeyPoint>")]
pub struct KeyPoints {
    points: BTreeMap<HexCoord, KeyPoint>,
}

impl KeyPoints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key_point: KeyPoint) {
        self.points.insert(key_point.hex, key_point);
    }

    pub fn get(&self, hex: HexCoord) -> Option<&KeyPoint> {
        self.points.get(&hex)
    }

    pub fn contains(&self, hex: HexCoord) -> bool {
        self.points.contains_key(&hex)
    }

    pub fn iter(&self) -> impl Iterator<Item = &KeyPoint> {
        self.points.values()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Take control of the key point at `hex`; returns true on a change of hands
    pub fn capture(&mut self, hex: HexCoord, nation: &Nation) -> bool {
        match self.points.get_mut(&hex) {
            Some(kp) if !kp.is_held_by(nation) => {
                kp.controller = Some(nation.clone());
                true
            }
            _ => false,
        }
    }

    /// Pay out income for every key point `nation` holds
    ///
    /// Returns the total paid; depleted key points are removed.
    pub fn collect_income(&mut self, nation: &Nation, rate: f64) -> u32 {
        let mut total = 0;
        for kp in self.points.values_mut().filter(|kp| kp.is_held_by(nation)) {
            let payout = kp.income(rate);
            kp.value -= payout;
            total += payout;
        }
        self.points.retain(|_, kp| kp.value > 0);
        total
    }
}

impl<'a> IntoIterator for &'a KeyPoints {
    type Item = &'a KeyPoint;
    type IntoIter = std::collections::btree_map::Values<'a, HexCoord, KeyPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.values()
    }
}

impl From<Vec<KeyPoint>> for KeyPoints {
    fn from(points: Vec<KeyPoint>) -> Self {
        points.into_iter().collect()
    }
}

impl From<KeyPoints> for Vec<KeyPoint> {
    fn from(points: KeyPoints) -> Self {
        points.points.into_values().collect()
    }
}

impl FromIterator<KeyPoint> for KeyPoints {
    fn from_iter<I: IntoIterator<Item = KeyPoint>>(iter: I) -> Self {
        let mut points = KeyPoints::new();
        for kp in iter {
            points.insert(kp);
        }
        points
    }
}
