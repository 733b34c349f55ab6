//! Test fixtures and helpers.
//!
//! Pre-built grids, units, and battle setups for consistent testing,
//! plus proptest strategies for property-based tests.

use skirmish_core::catalog::UnitCatalog;
use skirmish_core::geometry::{Fixed, TilePos};
use skirmish_core::grid::{TerrainId, TileCatalog, TileGrid};
use skirmish_core::units::{Facing, Roster, Team, Unit};

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> Fixed {
    Fixed::from_num(n)
}

/// Shorthand for a tile position.
#[must_use]
pub fn pos(x: i32, y: i32) -> TilePos {
    TilePos::new(x, y)
}

/// An all-plains grid with the standard terrain catalog.
#[must_use]
pub fn open_grid(width: u32, height: u32) -> TileGrid {
    TileGrid::new(width, height, TileCatalog::default())
}

/// A grid split by a full-height wall at column `wall_x`.
#[must_use]
pub fn walled_grid(width: u32, height: u32, wall_x: i32) -> TileGrid {
    let mut grid = open_grid(width, height);
    for y in 0..height as i32 {
        grid.set_terrain(pos(wall_x, y), TerrainId(1));
    }
    grid
}

/// Instantiate a unit by catalog name.
///
/// # Panics
///
/// Panics if the name is not in the catalog; fixtures only use
/// well-known names.
#[must_use]
pub fn unit(name: &str, team: u8, at: TilePos) -> Unit {
    let spec = UnitCatalog::new()
        .find(name)
        .unwrap_or_else(|| panic!("no unit named {name}"));
    Unit::new(spec, Team(team), at, Facing::East)
}

/// A roster holding the given units.
#[must_use]
pub fn roster(units: Vec<Unit>) -> Roster {
    let mut roster = Roster::new();
    for u in units {
        roster.spawn(u);
    }
    roster
}

/// Proptest strategies for rules-engine property tests.
pub mod strategies {
    use proptest::prelude::*;
    use skirmish_core::catalog::{UnitClass, UNIT_SPECS};
    use skirmish_core::geometry::TilePos;

    /// Generate a tile position within a `size` x `size` grid.
    pub fn arb_tile_pos(size: i32) -> impl Strategy<Value = TilePos> {
        (0..size, 0..size).prop_map(|(x, y)| TilePos::new(x, y))
    }

    /// Generate any concrete unit class.
    pub fn arb_unit_class() -> impl Strategy<Value = UnitClass> {
        (0..UNIT_SPECS.len()).prop_map(|i| UNIT_SPECS[i].class)
    }

    /// Generate a movement budget in a sensible range.
    pub fn arb_speed() -> impl Strategy<Value = i32> {
        1i32..20i32
    }

    /// Generate a turn horizon for probability curves.
    pub fn arb_turn_horizon() -> impl Strategy<Value = u32> {
        1u32..12u32
    }
}
