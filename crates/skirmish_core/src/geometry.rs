//! Fixed-point geometry for deterministic simulation.
//!
//! All rules-engine math uses fixed-point arithmetic to ensure
//! deterministic behavior across platforms. Floating-point
//! operations can produce different results on different CPUs.
//!
//! Two position spaces exist:
//! - [`TilePos`]: integer tile coordinates, the space pathfinding and
//!   combat queries work in.
//! - [`MapPos`]: fixed-point coordinates, fractional while a unit is
//!   partway between tiles during movement animation.

use fixed::types::I32F32;
use serde::{Deserialize, Serialize};

/// Fixed-point number type for all simulation math.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
pub type Fixed = I32F32;

/// Serde support for fixed-point numbers.
///
/// Serializes fixed-point numbers as their raw bit representation (i64)
/// to preserve exact precision across serialization boundaries.
pub mod fixed_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a fixed-point number as its raw bit representation.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.to_bits().serialize(serializer)
    }

    /// Deserialize a fixed-point number from its raw bit representation.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = i64::deserialize(deserializer)?;
        Ok(Fixed::from_bits(bits))
    }
}

/// Integer tile coordinates.
///
/// Validity against a particular grid is the grid's business; the type
/// itself allows negative values so range scans can probe off-map cells
/// and get a clean "no tile" answer back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TilePos {
    /// Column index.
    pub x: i32,
    /// Row index.
    pub y: i32,
}

impl TilePos {
    /// Create a new tile position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance to another tile.
    #[must_use]
    pub const fn manhattan_distance(self, other: Self) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// Squared straight-line distance to another tile (avoids sqrt).
    #[must_use]
    pub const fn squared_distance(self, other: Self) -> i64 {
        let dx = (other.x - self.x) as i64;
        let dy = (other.y - self.y) as i64;
        dx * dx + dy * dy
    }
}

/// Squared distance between point `p` and the line segment `a`-`b`.
///
/// Used as a pathfinding tie-breaker: among equally cheap tiles, the one
/// hugging the straight line between start and goal wins, which produces
/// natural-looking diagonal staircases on a square grid.
#[must_use]
pub fn squared_segment_distance(p: TilePos, a: TilePos, b: TilePos) -> Fixed {
    let len2 = a.squared_distance(b);
    // The segment is a single point.
    if len2 == 0 {
        return Fixed::from_num(p.squared_distance(a));
    }

    // The segment is a + t * (b - a); p is closest where the vector (a, p)
    // projects onto (a, b).
    let dot = ((p.x - a.x) as i64) * ((b.x - a.x) as i64)
        + ((p.y - a.y) as i64) * ((b.y - a.y) as i64);
    let t = Fixed::from_num(dot) / Fixed::from_num(len2);

    if t < Fixed::ZERO {
        // Beyond point a
        return Fixed::from_num(p.squared_distance(a));
    }
    if t > Fixed::ONE {
        // Beyond point b
        return Fixed::from_num(p.squared_distance(b));
    }

    let cx = Fixed::from_num(a.x) + t * Fixed::from_num(b.x - a.x);
    let cy = Fixed::from_num(a.y) + t * Fixed::from_num(b.y - a.y);
    let dx = Fixed::from_num(p.x) - cx;
    let dy = Fixed::from_num(p.y) - cy;
    dx * dx + dy * dy
}

/// Fixed-point map position.
///
/// Equal to a [`TilePos`] whenever the unit is at rest; fractional only
/// while movement animation is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct MapPos {
    /// X coordinate in tile units.
    #[serde(with = "fixed_serde")]
    pub x: Fixed,
    /// Y coordinate in tile units.
    #[serde(with = "fixed_serde")]
    pub y: Fixed,
}

impl MapPos {
    /// Create a new map position.
    #[must_use]
    pub const fn new(x: Fixed, y: Fixed) -> Self {
        Self { x, y }
    }

    /// Manhattan distance to another position.
    #[must_use]
    pub fn manhattan_distance(self, other: Self) -> Fixed {
        let dx = if self.x > other.x {
            self.x - other.x
        } else {
            other.x - self.x
        };
        let dy = if self.y > other.y {
            self.y - other.y
        } else {
            other.y - self.y
        };
        dx + dy
    }

    /// True if this position sits exactly on the given tile.
    #[must_use]
    pub fn is_at(self, tile: TilePos) -> bool {
        self.x == Fixed::from_num(tile.x) && self.y == Fixed::from_num(tile.y)
    }

    /// The tile this position occupies, if it is exactly tile-aligned.
    ///
    /// Returns `None` mid-animation; callers that need a tile for an
    /// in-transit unit should wait for movement to finish.
    #[must_use]
    pub fn tile(self) -> Option<TilePos> {
        let x: i32 = self.x.to_num();
        let y: i32 = self.y.to_num();
        let pos = TilePos::new(x, y);
        self.is_at(pos).then_some(pos)
    }
}

impl From<TilePos> for MapPos {
    fn from(pos: TilePos) -> Self {
        Self::new(Fixed::from_num(pos.x), Fixed::from_num(pos.y))
    }
}
