//! Error types for the rules engine.

use thiserror::Error;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for all rules-engine errors.
#[derive(Debug, Error)]
pub enum GameError {
    /// Popped from an empty search queue. The search algorithms never do
    /// this on valid inputs, so it signals a logic defect in the caller.
    #[error("Popped from an empty search queue")]
    EmptyQueue,

    /// A unit type name did not resolve during scenario loading.
    #[error("No unit of name {0} found")]
    UnknownUnitType(String),

    /// A grid cell referenced a terrain id with no catalog entry.
    #[error("Terrain id {0} has no catalog entry")]
    UnknownTerrain(u8),

    /// Invalid unit identifier.
    #[error("Invalid unit ID: {0}")]
    InvalidUnitId(u32),

    /// Scenario data failed to parse.
    #[error("Failed to parse scenario data: {0}")]
    ScenarioParse(String),

    /// Invalid game state.
    #[error("Invalid game state: {0}")]
    InvalidState(String),
}
