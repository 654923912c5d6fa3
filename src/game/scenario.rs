//! Seeded random skirmish setup
//!
//! Two nations on opposite edges of a random map, each with a General and
//! two Commanders holding a small starting force. The same seed always
//! builds the same world.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::board::hex::HexCoord;
use crate::board::map::HexMap;
use crate::board::terrain::Terrain;
use crate::core::config::AiConfig;
use crate::core::error::Result;
use crate::core::types::{Nation, Player, PlayerId, Turn};
use crate::economy::keypoints::{KeyPoint, KeyPointKind};
use crate::game::world::World;
use crate::units::{UnitKind, UnitSize};

pub const STARTING_POINTS: u32 = 120;

/// Starting force for each commander
const STARTING_FORCE: [UnitKind; 3] = [UnitKind::Infantry, UnitKind::Armor, UnitKind::Supply];

#[derive(Debug, Clone)]
pub struct ScenarioSettings {
    pub seed: u64,
    pub width: u32,
    pub height: u32,
    pub max_turns: Turn,
    pub key_points: usize,
}

impl Default for ScenarioSettings {
    fn default() -> Self {
        Self {
            seed: 42,
            width: 24,
            height: 16,
            max_turns: 20,
            key_points: 7,
        }
    }
}

/// The two sides: nation name, general id, first commander id
pub fn sides() -> [(Nation, u32, u32); 2] {
    [
        (Nation::new("Polska"), 1, 2),
        (Nation::new("Niemcy"), 11, 12),
    ]
}

fn random_terrain(rng: &mut ChaCha8Rng) -> Terrain {
    match rng.gen_range(0..100) {
        0..=59 => Terrain::Plains,
        60..=71 => Terrain::Forest,
        72..=81 => Terrain::Hills,
        82..=86 => Terrain::Road,
        87..=90 => Terrain::Swamp,
        91..=93 => Terrain::Urban,
        94..=96 => Terrain::Mountains,
        _ => Terrain::Water,
    }
}

fn random_kind(rng: &mut ChaCha8Rng) -> KeyPointKind {
    match rng.gen_range(0..5) {
        0 => KeyPointKind::Village,
        1 => KeyPointKind::Depot,
        2 => KeyPointKind::Bridge,
        3 => KeyPointKind::City,
        _ => KeyPointKind::Fortress,
    }
}

/// Build a ready-to-play world
pub fn build_world(settings: &ScenarioSettings, config: AiConfig) -> Result<World> {
    let mut rng = ChaCha8Rng::seed_from_u64(settings.seed);
    let width = settings.width.max(8);
    let height = settings.height.max(6);

    let mut map = HexMap::new(width, height);
    for q in 0..width as i32 {
        for r in 0..height as i32 {
            map.set_terrain(HexCoord::new(q, r), random_terrain(&mut rng));
        }
    }

    let mid = height as i32 / 2;
    let [(west, ..), (east, ..)] = sides();
    let east_q = width as i32 - 2;
    let spawns = [
        (west, [HexCoord::new(1, mid - 2), HexCoord::new(1, mid + 2)]),
        (east, [HexCoord::new(east_q, mid - 2), HexCoord::new(east_q, mid + 2)]),
    ];
    // Spawn areas are always open ground
    for (nation, points) in &spawns {
        for point in points {
            for hex in std::iter::once(*point).chain(point.neighbors()) {
                map.set_terrain(hex, Terrain::Plains);
            }
            map.add_spawn_point(nation.clone(), *point);
        }
    }

    let mut world = World::new(map, config, settings.max_turns);

    for (nation, general, first_commander) in sides() {
        world.add_player(Player::general(PlayerId(general), nation.clone()), STARTING_POINTS);
        for offset in 0..2 {
            let commander = PlayerId(first_commander + offset);
            world.add_player(Player::commander(commander, nation.clone()), 0);

            let spawn = world.map.spawn_points_for(&nation)[offset as usize % 2];
            let mut slots = std::iter::once(spawn).chain(spawn.neighbors());
            for kind in STARTING_FORCE {
                let Some(hex) = slots.find(|h| world.map.is_free(*h)) else {
                    break;
                };
                world.spawn_unit(commander, kind, UnitSize::Platoon, hex)?;
            }
        }
    }

    let mut placed = 0;
    let mut attempts = 0;
    while placed < settings.key_points && attempts < settings.key_points * 50 {
        attempts += 1;
        let hex = HexCoord::new(
            rng.gen_range(3..width as i32 - 3),
            rng.gen_range(0..height as i32),
        );
        let open = world
            .map
            .get_tile(hex)
            .is_some_and(|t| t.terrain.is_passable());
        if !open || world.key_points.contains(hex) {
            continue;
        }
        let value = rng.gen_range(2..=8) * 5;
        world.add_key_point(KeyPoint::new(hex, random_kind(&mut rng), value));
        placed += 1;
    }

    tracing::info!(
        seed = settings.seed,
        width,
        height,
        units = world.units.len(),
        key_points = world.key_points.len(),
        "Scenario ready"
    );
    Ok(world)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_world() {
        let settings = ScenarioSettings::default();
        let a = build_world(&settings, AiConfig::default()).expect("builds");
        let b = build_world(&settings, AiConfig::default()).expect("builds");
        assert_eq!(a.units, b.units);
        let kps_a: Vec<_> = a.key_points.iter().cloned().collect();
        let kps_b: Vec<_> = b.key_points.iter().cloned().collect();
        assert_eq!(kps_a, kps_b);
    }

    #[test]
    fn test_both_sides_seated() {
        let world = build_world(&ScenarioSettings::default(), AiConfig::default()).expect("builds");
        for (nation, general, _) in sides() {
            assert_eq!(world.general_of(&nation), Some(PlayerId(general)));
            assert_eq!(world.commanders_of(&nation).len(), 2);
            for commander in world.commanders_of(&nation) {
                assert_eq!(world.units_of(commander).count(), STARTING_FORCE.len());
            }
        }
        assert_eq!(world.key_points.len(), ScenarioSettings::default().key_points);
    }
}
