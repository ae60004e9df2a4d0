//! Shared identifiers and grid coordinates.
//!
//! Components are pure data with no behavior.

use serde::{Deserialize, Serialize};

/// Unique identifier for actors (structures and units).
pub type ActorId = u64;

/// Unique identifier for players.
pub type PlayerId = u32;

/// A map cell in integer grid coordinates.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Cell {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl Cell {
    /// Create a new cell.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The origin cell.
    pub const ZERO: Self = Self { x: 0, y: 0 };

    /// Offset this cell by another cell treated as a delta.
    #[must_use]
    pub const fn offset(self, delta: Self) -> Self {
        Self {
            x: self.x + delta.x,
            y: self.y + delta.y,
        }
    }
}

impl From<(i32, i32)> for Cell {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}
