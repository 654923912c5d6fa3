//! A* pathfinding for hex maps
//!
//! Respects terrain costs and occupancy; budget limits are applied afterwards
//! by cutting the path to the affordable prefix.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use ahash::AHashMap;

use crate::board::hex::HexCoord;
use crate::board::map::HexMap;

/// Fuel burned per hex entered
pub const FUEL_PER_HEX: u32 = 1;

/// Node in the A* open set
#[derive(Debug, Clone, PartialEq, Eq)]
struct PathNode {
    coord: HexCoord,
    f_cost: u32, // g_cost + heuristic
}

impl Ord for PathNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap on f, ties broken by coordinate so results are reproducible
        Reverse((self.f_cost, self.coord)).cmp(&Reverse((other.f_cost, other.coord)))
    }
}

impl PartialOrd for PathNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Find the cheapest full path using A*
///
/// Occupied hexes are blocked except the goal itself, so a path can end next
/// to a unit standing on the target. Returns `None` if no path exists.
pub fn find_path(map: &HexMap, start: HexCoord, goal: HexCoord) -> Option<Vec<HexCoord>> {
    if start == goal {
        return Some(vec![start]);
    }
    if !map.get_tile(goal).map(|t| t.terrain.is_passable()).unwrap_or(false) {
        return None;
    }

    let mut open_set = BinaryHeap::new();
    let mut came_from: AHashMap<HexCoord, HexCoord> = AHashMap::new();
    let mut g_scores: AHashMap<HexCoord, u32> = AHashMap::new();

    g_scores.insert(start, 0);
    open_set.push(PathNode {
        coord: start,
        f_cost: start.distance(&goal),
    });

    while let Some(current) = open_set.pop() {
        if current.coord == goal {
            return Some(reconstruct_path(&came_from, current.coord));
        }

        let current_g = *g_scores.get(&current.coord).unwrap_or(&u32::MAX);

        for neighbor in current.coord.neighbors() {
            let Some(tile) = map.get_tile(neighbor) else {
                continue;
            };
            let Some(move_cost) = tile.terrain.movement_cost() else {
                continue;
            };
            if tile.occupant.is_some() && neighbor != goal {
                continue;
            }

            let tentative_g = current_g.saturating_add(move_cost);
            let neighbor_g = *g_scores.get(&neighbor).unwrap_or(&u32::MAX);

            if tentative_g < neighbor_g {
                came_from.insert(neighbor, current.coord);
                g_scores.insert(neighbor, tentative_g);
                open_set.push(PathNode {
                    coord: neighbor,
                    f_cost: tentative_g + neighbor.distance(&goal),
                });
            }
        }
    }

    None // No path found
}

/// Reconstruct path from came_from map
fn reconstruct_path(
    came_from: &AHashMap<HexCoord, HexCoord>,
    mut current: HexCoord,
) -> Vec<HexCoord> {
    let mut path = vec![current];
    while let Some(&prev) = came_from.get(&current) {
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}

/// Cut a path to the prefix affordable with `max_mp` and `max_fuel`
///
/// The start hex is free. The path never ends on an occupied hex other than
/// the start.
pub fn truncate_to_budget(
    map: &HexMap,
    path: &[HexCoord],
    max_mp: u32,
    max_fuel: u32,
) -> Vec<HexCoord> {
    let Some(&start) = path.first() else {
        return Vec::new();
    };

    let mut result = vec![start];
    let (mut spent_mp, mut spent_fuel) = (0u32, 0u32);
    for coord in path.iter().skip(1) {
        let Some(cost) = map.get_tile(*coord).and_then(|t| t.terrain.movement_cost()) else {
            break;
        };
        if spent_mp + cost > max_mp || spent_fuel + FUEL_PER_HEX > max_fuel {
            break;
        }
        spent_mp += cost;
        spent_fuel += FUEL_PER_HEX;
        result.push(*coord);
    }

    while result.len() > 1 && result.last().map(|c| map.occupant(*c).is_some()).unwrap_or(false) {
        result.pop();
    }
    result
}

/// Movement points needed to walk a path (start hex excluded)
pub fn path_cost(map: &HexMap, path: &[HexCoord]) -> u32 {
    path.iter()
        .skip(1)
        .filter_map(|coord| map.get_tile(*coord))
        .filter_map(|tile| tile.terrain.movement_cost())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::map::Board;
    use crate::board::terrain::Terrain;
    use crate::core::types::UnitId;

    #[test]
    fn test_pathfind_straight_line() {
        let map = HexMap::new(10, 10);
        let start = HexCoord::new(0, 0);
        let goal = HexCoord::new(5, 0);

        let path = find_path(&map, start, goal).expect("open map");
        assert_eq!(path.first(), Some(&start));
        assert_eq!(path.last(), Some(&goal));
        assert_eq!(path.len(), 6);
    }

    #[test]
    fn test_pathfind_around_water() {
        let mut map = HexMap::new(10, 10);
        map.set_terrain(HexCoord::new(2, 0), Terrain::Water);
        map.set_terrain(HexCoord::new(3, 0), Terrain::Water);

        let path = find_path(&map, HexCoord::new(0, 0), HexCoord::new(5, 0)).expect("detour");
        assert!(!path.contains(&HexCoord::new(2, 0)));
        assert!(!path.contains(&HexCoord::new(3, 0)));
    }

    #[test]
    fn test_pathfind_around_occupied_hex() {
        let mut map = HexMap::new(10, 10);
        map.place(HexCoord::new(2, 0), UnitId(9));

        let path = find_path(&map, HexCoord::new(0, 0), HexCoord::new(4, 0)).expect("detour");
        assert!(!path.contains(&HexCoord::new(2, 0)));
    }

    #[test]
    fn test_pathfind_no_path() {
        let mut map = HexMap::new(10, 10);
        let goal = HexCoord::new(5, 5);
        for neighbor in goal.neighbors() {
            map.set_terrain(neighbor, Terrain::Water);
        }
        assert!(find_path(&map, HexCoord::new(0, 0), goal).is_none());
    }

    #[test]
    fn test_pathfind_same_start_goal() {
        let map = HexMap::new(10, 10);
        let start = HexCoord::new(5, 5);
        assert_eq!(find_path(&map, start, start), Some(vec![start]));
    }

    #[test]
    fn test_truncate_to_movement_points() {
        let mut map = HexMap::new(10, 10);
        map.set_terrain(HexCoord::new(2, 0), Terrain::Forest);
        let path: Vec<HexCoord> = (0..6).map(|q| HexCoord::new(q, 0)).collect();

        // 1 (plains) + 2 (forest) = 3 MP reaches (2,0); the next hex would cost 4
        let cut = truncate_to_budget(&map, &path, 3, 10);
        assert_eq!(cut.last(), Some(&HexCoord::new(2, 0)));
        assert!(path_cost(&map, &cut) <= 3);
    }

    #[test]
    fn test_truncate_to_fuel() {
        let map = HexMap::new(10, 10);
        let path: Vec<HexCoord> = (0..6).map(|q| HexCoord::new(q, 0)).collect();
        let cut = truncate_to_budget(&map, &path, 10, 2);
        assert_eq!(cut.len(), 3);
    }

    #[test]
    fn test_truncate_never_ends_on_occupied_hex() {
        let mut map = HexMap::new(10, 10);
        map.place(HexCoord::new(3, 0), UnitId(4));
        let path: Vec<HexCoord> = (0..4).map(|q| HexCoord::new(q, 0)).collect();
        let cut = truncate_to_budget(&map, &path, 10, 10);
        assert_eq!(cut.last(), Some(&HexCoord::new(2, 0)));
    }

    #[test]
    fn test_board_find_path_is_bounded() {
        let map = HexMap::new(20, 20);
        let path = map
            .find_path(HexCoord::new(0, 0), HexCoord::new(15, 0), 4, 10)
            .expect("route exists");
        assert_eq!(path.len(), 5);
        assert_eq!(path[0], HexCoord::new(0, 0));
    }

    #[test]
    fn test_board_find_path_to_occupied_goal_stops_adjacent() {
        let mut map = HexMap::new(10, 10);
        map.place(HexCoord::new(4, 0), UnitId(1));
        let path = map
            .find_path(HexCoord::new(0, 0), HexCoord::new(4, 0), 10, 10)
            .expect("route exists");
        assert_eq!(path.last().map(|c| c.distance(&HexCoord::new(4, 0))), Some(1));
    }
}
