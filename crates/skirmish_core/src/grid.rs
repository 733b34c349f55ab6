//! Tile grid and terrain catalog.
//!
//! The grid stores one [`TerrainId`] per cell in row-major order plus a
//! set of named highlight layers. Highlights are purely presentational
//! state written by external callers (the UI pulses them between two
//! colors); pathfinding never touches them.
//!
//! The grid works in tile-index space only. Conversion to or from any
//! pixel space is the renderer's business.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::geometry::TilePos;

/// Immutable terrain properties shared by every cell of that terrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileType {
    /// Terrain name, the key unit move-cost tables use.
    pub name: &'static str,
    /// Base passability flag for terrain-agnostic callers.
    pub passable: bool,
    /// Added to the defense of a unit standing here.
    pub defense_bonus: i32,
    /// Added to the attack range of a unit firing from here.
    pub range_bonus: i32,
}

impl TileType {
    /// Create a terrain record.
    #[must_use]
    pub const fn new(
        name: &'static str,
        passable: bool,
        defense_bonus: i32,
        range_bonus: i32,
    ) -> Self {
        Self {
            name,
            passable,
            defense_bonus,
            range_bonus,
        }
    }
}

/// Numeric identifier into the terrain catalog.
///
/// Level data references terrain by this id; every id stored in a grid
/// cell is validated against the catalog at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TerrainId(pub u8);

/// The standard terrain set.
///
/// Index in this slice is the terrain's [`TerrainId`].
pub const DEFAULT_TERRAIN: &[TileType] = &[
    TileType::new("plains", true, 0, 0),
    TileType::new("wall", false, 0, 0),
    TileType::new("water", false, 0, 0),
    TileType::new("sand", true, 0, 0),
    TileType::new("road", true, 0, 0),
    TileType::new("mountain", false, 1, 2),
    TileType::new("forest", true, 2, 0),
];

/// Terrain lookup table.
#[derive(Debug, Clone)]
pub struct TileCatalog {
    types: Vec<TileType>,
}

impl TileCatalog {
    /// Build a catalog from an explicit terrain list.
    #[must_use]
    pub fn new(types: Vec<TileType>) -> Self {
        Self { types }
    }

    /// Look up a terrain record.
    #[must_use]
    pub fn get(&self, id: TerrainId) -> Option<&TileType> {
        self.types.get(id.0 as usize)
    }

    /// Number of terrain types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// True if the catalog has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Default for TileCatalog {
    /// The standard terrain set ([`DEFAULT_TERRAIN`]).
    fn default() -> Self {
        Self::new(DEFAULT_TERRAIN.to_vec())
    }
}

/// RGBA color used by highlight layers.
pub type Color = [u8; 4];

/// A named set of highlighted tiles.
///
/// The presentation layer pulses each tile between the two colors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlight {
    /// Highlighted tile positions.
    pub tiles: HashSet<TilePos>,
    /// First endpoint of the pulse.
    pub color_a: Color,
    /// Second endpoint of the pulse.
    pub color_b: Color,
}

/// A rectangular grid of terrain cells.
#[derive(Debug, Clone)]
pub struct TileGrid {
    /// Grid width in tiles.
    width: u32,
    /// Grid height in tiles.
    height: u32,
    /// Cell terrain ids in row-major order.
    cells: Vec<TerrainId>,
    /// Terrain lookup.
    catalog: TileCatalog,
    /// Transient highlight layers, keyed by name.
    highlights: HashMap<String, Highlight>,
}

impl TileGrid {
    /// Create a grid with every cell set to the catalog's first terrain.
    ///
    /// # Panics
    ///
    /// Panics if `width` or `height` is zero, or the catalog is empty.
    #[must_use]
    pub fn new(width: u32, height: u32, catalog: TileCatalog) -> Self {
        assert!(width > 0, "TileGrid width must be positive");
        assert!(height > 0, "TileGrid height must be positive");
        assert!(!catalog.is_empty(), "TileGrid catalog must not be empty");

        let cell_count = (width as usize) * (height as usize);
        Self {
            width,
            height,
            cells: vec![TerrainId(0); cell_count],
            catalog,
            highlights: HashMap::new(),
        }
    }

    /// Build a grid from row-major terrain ids, as produced by an
    /// external level parser.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidState`] if the cell count does not
    /// match the dimensions, or [`GameError::UnknownTerrain`] if any id
    /// has no catalog entry.
    pub fn from_cells(
        width: u32,
        height: u32,
        cells: Vec<u8>,
        catalog: TileCatalog,
    ) -> Result<Self> {
        let expected = (width as usize) * (height as usize);
        if cells.len() != expected {
            return Err(GameError::InvalidState(format!(
                "Expected {expected} cells for a {width}x{height} grid, got {}",
                cells.len()
            )));
        }

        let cells: Vec<TerrainId> = cells.into_iter().map(TerrainId).collect();
        for id in &cells {
            if catalog.get(*id).is_none() {
                return Err(GameError::UnknownTerrain(id.0));
            }
        }

        Ok(Self {
            width,
            height,
            cells,
            catalog,
            highlights: HashMap::new(),
        })
    }

    /// Grid width in tiles.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Grid height in tiles.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// The terrain catalog backing this grid.
    #[must_use]
    pub fn catalog(&self) -> &TileCatalog {
        &self.catalog
    }

    /// Check if a position lies within the grid.
    #[must_use]
    pub fn in_bounds(&self, pos: TilePos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.width && (pos.y as u32) < self.height
    }

    /// Convert a position to its row-major cell index.
    #[inline]
    fn cell_index(&self, pos: TilePos) -> usize {
        (pos.y as usize) * (self.width as usize) + (pos.x as usize)
    }

    /// Terrain id at a position. Returns `None` if out of bounds.
    #[must_use]
    pub fn terrain_at(&self, pos: TilePos) -> Option<TerrainId> {
        self.in_bounds(pos).then(|| self.cells[self.cell_index(pos)])
    }

    /// Terrain record at a position.
    ///
    /// `None` is the "no tile" sentinel for out-of-bounds queries;
    /// callers must check rather than expect an error.
    #[must_use]
    pub fn tile_at(&self, pos: TilePos) -> Option<&TileType> {
        let id = self.terrain_at(pos)?;
        self.catalog.get(id)
    }

    /// Set the terrain at a position. Returns `false` if out of bounds
    /// or the id has no catalog entry.
    pub fn set_terrain(&mut self, pos: TilePos, id: TerrainId) -> bool {
        if !self.in_bounds(pos) || self.catalog.get(id).is_none() {
            return false;
        }
        let index = self.cell_index(pos);
        self.cells[index] = id;
        true
    }

    /// The in-bounds orthogonal neighbours of a position.
    ///
    /// Probes north, east, west, south; out-of-grid candidates are
    /// dropped, so corners get two entries and edges three.
    #[must_use]
    pub fn neighbours(&self, pos: TilePos) -> Vec<TilePos> {
        let candidates = [
            TilePos::new(pos.x, pos.y - 1),
            TilePos::new(pos.x + 1, pos.y),
            TilePos::new(pos.x - 1, pos.y),
            TilePos::new(pos.x, pos.y + 1),
        ];

        candidates
            .into_iter()
            .filter(|n| self.in_bounds(*n))
            .collect()
    }

    /// Set (or replace) a named highlight layer.
    pub fn set_highlight(
        &mut self,
        name: &str,
        color_a: Color,
        color_b: Color,
        tiles: HashSet<TilePos>,
    ) {
        self.highlights.insert(
            name.to_string(),
            Highlight {
                tiles,
                color_a,
                color_b,
            },
        );
    }

    /// Remove a highlight layer. Missing names are ignored.
    pub fn remove_highlight(&mut self, name: &str) {
        self.highlights.remove(name);
    }

    /// Remove every highlight layer.
    pub fn clear_highlights(&mut self) {
        self.highlights.clear();
    }

    /// Look up a highlight layer by name.
    #[must_use]
    pub fn highlight(&self, name: &str) -> Option<&Highlight> {
        self.highlights.get(name)
    }
}
