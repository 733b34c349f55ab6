//! # Skirmish Core
//!
//! Deterministic rules engine for a turn-based grid tactics game.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No IO
//! - No system randomness
//! - Fixed-point math wherever results feed back into game state
//!
//! This separation keeps the rules testable headless and lets any
//! front end (sprites, terminal, none at all) drive a battle through
//! the same small surface: pathfinding queries, unit rule queries,
//! attack resolution, and outcome prediction.
//!
//! ## Crate Structure
//!
//! - [`geometry`] - Tile and fixed-point positions, distance functions
//! - [`queue`] - Updatable min-priority queue for grid search
//! - [`grid`] - Terrain catalog, tile grid, highlight layers
//! - [`pathfinding`] - A* shortest path and reachability flood fill
//! - [`catalog`] - Data-driven unit type definitions
//! - [`units`] - Unit state, rule queries, the roster
//! - [`combat`] - Single-attack resolution with critical hits
//! - [`analysis`] - Multi-turn destruction probability curves
//! - [`scenario`] - Battle definitions handed over by the level parser
//! - [`session`] - The owner of one running battle

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod analysis;
pub mod catalog;
pub mod combat;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod pathfinding;
pub mod queue;
pub mod scenario;
pub mod session;
pub mod units;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::analysis::destroy_probability_curve;
    pub use crate::catalog::{Domain, UnitCatalog, UnitClass, UnitSpec};
    pub use crate::combat::{resolve_attack, AttackOutcome, CritRng, CRIT_TABLE};
    pub use crate::error::{GameError, Result};
    pub use crate::geometry::{Fixed, MapPos, TilePos};
    pub use crate::grid::{TerrainId, TileCatalog, TileGrid, TileType};
    pub use crate::pathfinding::{find_path, reachable_tiles};
    pub use crate::scenario::{ScenarioData, UnitPlacement};
    pub use crate::session::Session;
    pub use crate::units::{Facing, Roster, Team, Unit, UnitId};
}
