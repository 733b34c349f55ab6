//! Scenario data as handed over by the external level parser.
//!
//! The engine does not read map image files or level text itself; the
//! loader outside this crate turns those into one [`ScenarioData`]
//! record - grid dimensions, row-major terrain ids, and unit placements
//! - and the session builds a battle from it. RON is the interchange
//! format for tooling and fixtures.
//!
//! # Example RON
//!
//! ```ron
//! ScenarioData(
//!     name: "crossing",
//!     teams: 2,
//!     width: 3,
//!     height: 2,
//!     tiles: [0, 4, 0, 0, 4, 0],
//!     units: [
//!         UnitPlacement(kind: "Tank", team: 0, x: 0, y: 0, angle: 0),
//!         UnitPlacement(kind: "Jeep", team: 1, x: 2, y: 1, angle: 180),
//!     ],
//! )
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};

/// One unit to place at battle start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitPlacement {
    /// Unit type name, resolved against the unit catalog.
    pub kind: String,
    /// Owning team index.
    pub team: u8,
    /// Starting column.
    pub x: i32,
    /// Starting row.
    pub y: i32,
    /// Starting sprite angle; one of 0, 90, 180, 270.
    #[serde(default)]
    pub angle: u16,
}

/// A complete battle definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioData {
    /// Scenario name for display.
    pub name: String,
    /// Number of teams taking turns.
    pub teams: u8,
    /// Grid width in tiles.
    pub width: u32,
    /// Grid height in tiles.
    pub height: u32,
    /// Row-major terrain ids, one per cell.
    pub tiles: Vec<u8>,
    /// Seed for the critical-hit generator; fixed in tests, arbitrary
    /// in real play.
    #[serde(default)]
    pub seed: u64,
    /// Units on the board at battle start.
    pub units: Vec<UnitPlacement>,
}

impl ScenarioData {
    /// Parse a scenario from RON text.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::ScenarioParse`] when the text is not a
    /// valid scenario record.
    pub fn from_ron(source: &str) -> Result<Self> {
        ron::from_str(source).map_err(|e| GameError::ScenarioParse(e.to_string()))
    }

    /// Serialize the scenario to RON text.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::ScenarioParse`] if serialization fails.
    pub fn to_ron(&self) -> Result<String> {
        ron::to_string(self).map_err(|e| GameError::ScenarioParse(e.to_string()))
    }
}
