//! Grid-based pathfinding: A* shortest path and cost-limited flood fill.
//!
//! All calculations use fixed-point math for deterministic results
//! across different platforms and clients. Movement is 4-directional;
//! cost and passability are supplied by the caller, so the same search
//! serves every unit type (each brings its own terrain rules).
//!
//! Tie-breaking among equally cheap open nodes prefers the tile closest
//! to the straight line between start and goal (then lowest y, then
//! lowest x), which produces natural diagonal-looking staircases on a
//! square grid instead of L-shaped detours.

use std::collections::{HashMap, HashSet};

use crate::geometry::{squared_segment_distance, Fixed, TilePos};
use crate::grid::TileGrid;
use crate::queue::SearchQueue;

/// Manhattan-distance heuristic, the default for [`find_path`].
///
/// Admissible here because movement is 4-directional and every cost
/// function is expected to return at least 1.
#[must_use]
pub fn manhattan_heuristic(a: TilePos, b: TilePos) -> Fixed {
    Fixed::from_num(a.manhattan_distance(b))
}

/// Pick the preferred of two equally cheap tiles.
///
/// The tile nearer the start-goal segment wins; remaining ties go to the
/// lowest y, then the lowest x. This is a strict total order on distinct
/// tiles, so expansion order is independent of queue insertion order.
fn prefer_tile(a: TilePos, b: TilePos, start: TilePos, goal: TilePos) -> bool {
    let dist_a = squared_segment_distance(a, start, goal);
    let dist_b = squared_segment_distance(b, start, goal);

    if dist_a != dist_b {
        return dist_a < dist_b;
    }
    if a.y != b.y {
        return a.y < b.y;
    }
    a.x < b.x
}

/// Find the cheapest path between two tiles using A*.
///
/// Returns the ordered positions from `start` to `goal` inclusive, or an
/// empty vector if the goal is unreachable.
///
/// `cost` is the price of *leaving* a tile and must return at least 1,
/// or the result is not guaranteed shortest; this is a documented caller
/// contract, not enforced. `passable` gates which tiles may be entered.
/// Uses the Manhattan heuristic; see [`find_path_with_heuristic`] to
/// substitute another.
pub fn find_path(
    grid: &TileGrid,
    start: TilePos,
    goal: TilePos,
    cost: impl Fn(TilePos) -> Fixed,
    passable: impl Fn(TilePos) -> bool,
) -> Vec<TilePos> {
    find_path_with_heuristic(grid, start, goal, cost, passable, manhattan_heuristic)
}

/// [`find_path`] with an explicit heuristic.
///
/// The heuristic must not overestimate the true remaining cost or the
/// path may not be optimal.
pub fn find_path_with_heuristic(
    grid: &TileGrid,
    start: TilePos,
    goal: TilePos,
    cost: impl Fn(TilePos) -> Fixed,
    passable: impl Fn(TilePos) -> bool,
    heuristic: impl Fn(TilePos, TilePos) -> Fixed,
) -> Vec<TilePos> {
    let mut open: SearchQueue<TilePos> = SearchQueue::new();
    open.set_tie_breaker(move |a, b| prefer_tile(*a, *b, start, goal));
    open.update(start, Fixed::ZERO);

    let mut visited: HashSet<TilePos> = HashSet::new();

    // Known (g, h) per tile.
    let mut costs: HashMap<TilePos, (Fixed, Fixed)> = HashMap::new();
    costs.insert(start, (Fixed::ZERO, heuristic(start, goal)));

    let mut parents: HashMap<TilePos, TilePos> = HashMap::new();

    while !visited.contains(&goal) {
        let Ok((current, _)) = open.pop_smallest() else {
            // Open set exhausted without reaching the goal.
            break;
        };
        visited.insert(current);

        let leave_cost = cost(current);
        let current_g = costs[&current].0;

        for neighbour in grid.neighbours(current) {
            if visited.contains(&neighbour) || !passable(neighbour) {
                continue;
            }

            let tentative_g = current_g + leave_cost;

            if !open.contains(&neighbour) {
                let h = heuristic(neighbour, goal);
                costs.insert(neighbour, (tentative_g, h));
                parents.insert(neighbour, current);
                open.update(neighbour, tentative_g + h);
            } else {
                let (g, h) = costs[&neighbour];
                if tentative_g < g {
                    open.update(neighbour, tentative_g + h);
                    costs.insert(neighbour, (tentative_g, h));
                    parents.insert(neighbour, current);
                }
            }
        }
    }

    if !visited.contains(&goal) {
        return Vec::new();
    }

    // Walk the parent chain backward from the goal.
    let mut path = Vec::new();
    let mut current = goal;
    while current != start {
        path.push(current);
        current = parents[&current];
    }
    path.push(start);
    path.reverse();

    path
}

/// All tiles reachable from `start` within a total cost of `max_cost`.
///
/// Dijkstra-style flood fill; the result always contains `start`.
/// Whether a unit may also *stop* on a reachable tile is a separate
/// question answered by the caller.
pub fn reachable_tiles(
    grid: &TileGrid,
    start: TilePos,
    max_cost: Fixed,
    cost: impl Fn(TilePos) -> Fixed,
    passable: impl Fn(TilePos) -> bool,
) -> HashSet<TilePos> {
    let mut open: SearchQueue<TilePos> = SearchQueue::new();
    open.update(start, Fixed::ZERO);

    let mut visited: HashSet<TilePos> = HashSet::new();

    let mut reachable = HashSet::new();
    reachable.insert(start);

    while let Ok((current, current_cost)) = open.pop_smallest() {
        visited.insert(current);

        // Too expensive to get here, so nothing beyond is affordable.
        if current_cost > max_cost {
            continue;
        }

        let leave_cost = cost(current);
        for neighbour in grid.neighbours(current) {
            if visited.contains(&neighbour) || !passable(neighbour) {
                continue;
            }

            let new_cost = current_cost + leave_cost;
            if open.update(neighbour, new_cost) && new_cost <= max_cost {
                reachable.insert(neighbour);
            }
        }
    }

    reachable
}
