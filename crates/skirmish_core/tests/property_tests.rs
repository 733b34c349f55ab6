//! Property-based checks of the rules engine's load-bearing
//! guarantees: shortest paths, reachability monotonicity, damage
//! bounds, and probability-curve shape.

use std::collections::{HashMap, HashSet};

use proptest::prelude::*;

use skirmish_core::catalog::UNIT_SPECS;
use skirmish_core::grid::DEFAULT_TERRAIN;
use skirmish_core::prelude::*;
use skirmish_test_utils::fixtures::{open_grid, pos, unit};
use skirmish_test_utils::fixtures::strategies::{arb_tile_pos, arb_unit_class};

/// Plain breadth-first hop count over passable tiles, the reference
/// for A* optimality on unit costs.
fn bfs_hops(grid: &TileGrid, blocked: &HashSet<TilePos>, start: TilePos, goal: TilePos) -> Option<usize> {
    let mut depth: HashMap<TilePos, usize> = HashMap::new();
    depth.insert(start, 0);
    let mut frontier = vec![start];

    while !frontier.is_empty() {
        let mut next = Vec::new();
        for p in frontier {
            for n in grid.neighbours(p) {
                if !blocked.contains(&n) && !depth.contains_key(&n) {
                    depth.insert(n, depth[&p] + 1);
                    next.push(n);
                }
            }
        }
        frontier = next;
    }

    depth.get(&goal).copied()
}

proptest! {
    /// On unit costs, A* path length equals the BFS shortest hop count,
    /// and unreachable goals yield an empty path.
    #[test]
    fn prop_astar_matches_bfs(
        start in arb_tile_pos(8),
        goal in arb_tile_pos(8),
        obstacles in proptest::collection::hash_set(arb_tile_pos(8), 0..20),
    ) {
        let grid = open_grid(8, 8);
        let mut blocked = obstacles;
        blocked.remove(&start);
        blocked.remove(&goal);

        let path = find_path(
            &grid,
            start,
            goal,
            |_| Fixed::ONE,
            |p| !blocked.contains(&p),
        );

        match bfs_hops(&grid, &blocked, start, goal) {
            Some(hops) => {
                prop_assert_eq!(path.len() - 1, hops);
                prop_assert_eq!(*path.first().unwrap(), start);
                prop_assert_eq!(*path.last().unwrap(), goal);
                for p in &path {
                    prop_assert!(!blocked.contains(p));
                }
            }
            None => prop_assert!(path.is_empty()),
        }
    }

    /// A bigger movement budget never shrinks the reachable set.
    #[test]
    fn prop_reachability_is_monotonic(
        start in arb_tile_pos(8),
        obstacles in proptest::collection::hash_set(arb_tile_pos(8), 0..16),
        small in 0i32..6,
        extra in 0i32..6,
    ) {
        let grid = open_grid(8, 8);
        let mut blocked = obstacles;
        blocked.remove(&start);

        let near = reachable_tiles(
            &grid,
            start,
            Fixed::from_num(small),
            |_| Fixed::ONE,
            |p| !blocked.contains(&p),
        );
        let far = reachable_tiles(
            &grid,
            start,
            Fixed::from_num(small + extra),
            |_| Fixed::ONE,
            |p| !blocked.contains(&p),
        );

        prop_assert!(near.is_subset(&far));
        prop_assert!(near.contains(&start));
    }

    /// Damage is never negative for any attacker/defender/terrain
    /// combination in the full catalog.
    #[test]
    fn prop_damage_is_never_negative(
        attacker_class in arb_unit_class(),
        defender_class in arb_unit_class(),
        terrain in 0usize..7,
    ) {
        let attacker = unit(UnitCatalog::new().spec(attacker_class).name, 0, pos(0, 0));
        let defender = unit(UnitCatalog::new().spec(defender_class).name, 1, pos(1, 0));
        let tile = &DEFAULT_TERRAIN[terrain];

        prop_assert!(attacker.get_damage(&defender, Some(tile)) >= 0);
        prop_assert!(attacker.get_damage(&defender, None) >= 0);
    }

    /// Destruction curves start at zero, never decrease, and stay
    /// within [0, 1] for every matchup.
    #[test]
    fn prop_curves_are_monotonic_and_bounded(
        attacker_class in arb_unit_class(),
        defender_class in arb_unit_class(),
        turns in 1u32..12,
    ) {
        let attacker = unit(UnitCatalog::new().spec(attacker_class).name, 0, pos(0, 0));
        let defender = unit(UnitCatalog::new().spec(defender_class).name, 1, pos(1, 0));

        let curve = destroy_probability_curve(&attacker, &defender, None, turns);

        prop_assert_eq!(curve.len(), turns as usize + 1);
        prop_assert!(curve[0].abs() < 1e-12);
        for window in curve.windows(2) {
            prop_assert!(window[0] <= window[1] + 1e-12);
        }
        for p in &curve {
            prop_assert!((0.0..=1.0).contains(p));
        }
    }

    /// A matchup that deals real damage always converges to certain
    /// destruction given enough turns.
    #[test]
    fn prop_positive_damage_converges_to_one(
        attacker_class in arb_unit_class(),
        defender_class in arb_unit_class(),
    ) {
        let attacker = unit(UnitCatalog::new().spec(attacker_class).name, 0, pos(0, 0));
        let defender = unit(UnitCatalog::new().spec(defender_class).name, 1, pos(1, 0));

        let base = attacker.get_damage(&defender, None);
        // Worst crit still damages: destruction is a certainty with one
        // turn per point of health.
        prop_assume!(base - 1 > 0);

        let turns = u32::try_from(UNIT_SPECS
            .iter()
            .map(|s| s.max_health)
            .max()
            .unwrap_or(15)).unwrap();
        let curve = destroy_probability_curve(&attacker, &defender, None, turns);

        prop_assert!((curve[turns as usize] - 1.0).abs() < 1e-9);
    }
}
