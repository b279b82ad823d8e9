//! Error types for matchgame-core.
//!
//! Only misconfigured game templates are errors; invalid in-play operations
//! (flipping a locked board, advancing outside `LevelComplete`, ...) are
//! benign UI races and degrade to no-ops instead.

use thiserror::Error;

/// Result type alias using ConfigError.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that make a game template unplayable.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("game has no levels")]
    EmptyGame,

    #[error("level {level} has no pairs")]
    EmptyLevel { level: u32 },

    #[error("expected level {expected}, found level {found}")]
    NonSequentialLevel { expected: u32, found: u32 },

    #[error("duplicate pair id {id} in level {level}")]
    DuplicatePairId { level: u32, id: u32 },
}
