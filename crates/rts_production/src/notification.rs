//! Player-facing notifications emitted by production.
//!
//! The simulation never plays sounds itself. It emits these and lets the
//! presentation layer decide what to play.

use serde::{Deserialize, Serialize};

use crate::components::{ActorId, Cell, PlayerId};

/// Something a player should be told about.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Notification {
    /// A unit finished building ("unit ready").
    UnitReady {
        /// Item type.
        item: String,
    },
    /// A structure finished building and is ready to place ("construction complete").
    StructureComplete {
        /// Item type.
        item: String,
    },
    /// A producer placed a new actor in the world.
    UnitSpawned {
        /// New actor.
        actor: ActorId,
        /// Item type.
        item: String,
        /// Actor that produced it.
        producer: ActorId,
        /// Spawn cell.
        cell: Cell,
    },
}

impl Notification {
    /// The completion announcement for an item.
    #[must_use]
    pub fn completed(item: impl Into<String>, is_structure: bool) -> Self {
        let item = item.into();
        if is_structure {
            Self::StructureComplete { item }
        } else {
            Self::UnitReady { item }
        }
    }
}

/// A notification addressed to one player, stamped with the tick it happened on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerNotification {
    /// Simulation tick.
    pub tick: u64,
    /// Recipient.
    pub player: PlayerId,
    /// Payload.
    pub notification: Notification,
}
