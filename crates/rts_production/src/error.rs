//! Error types for the production core.
//!
//! Player orders never fail: a rejected order is a silent no-op so that every
//! replica of the simulation takes the same path. These errors cover the
//! surfaces around the simulation instead (data loading, world setup,
//! snapshots).

use thiserror::Error;

use crate::components::{ActorId, PlayerId};

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for the production core.
#[derive(Debug, Error)]
pub enum GameError {
    /// Data file parsing error.
    #[error("Failed to parse data file '{path}': {message}")]
    DataParseError {
        /// Path to the file that failed to parse.
        path: String,
        /// Error message.
        message: String,
    },

    /// Rules parsed but reference unknown items or carry invalid constants.
    #[error("Invalid rules: {0}")]
    InvalidRules(String),

    /// Invalid actor reference.
    #[error("Actor not found: {0}")]
    ActorNotFound(ActorId),

    /// Invalid player reference.
    #[error("Player not found: {0}")]
    PlayerNotFound(PlayerId),

    /// The actor exists but owns no production queue.
    #[error("Actor {0} has no production queue")]
    NoProductionQueue(ActorId),

    /// Snapshot encoding or decoding failed.
    #[error("Snapshot serialization failed: {0}")]
    Serialization(String),
}

impl From<bincode::Error> for GameError {
    fn from(err: bincode::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
