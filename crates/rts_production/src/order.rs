//! Player production orders.
//!
//! Orders arrive already deserialized. On the wire they are a string opcode,
//! a target item name and an integer payload; [`Order::from_wire`] maps that
//! triple onto the typed enum and drops anything it does not recognise.

use serde::{Deserialize, Serialize};

/// A production command issued to a queue owner.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Order {
    /// Append one `item` to its category queue.
    StartProduction {
        /// Item type to build.
        item: String,
    },
    /// Pause or resume the head of the item's category.
    PauseProduction {
        /// Item type expected at the head.
        item: String,
        /// New paused flag.
        paused: bool,
    },
    /// Remove one `item` from its category queue.
    CancelProduction {
        /// Item type to remove.
        item: String,
    },
}

impl Order {
    /// Opcode for [`Order::StartProduction`].
    pub const START_PRODUCTION: &'static str = "StartProduction";
    /// Opcode for [`Order::PauseProduction`].
    pub const PAUSE_PRODUCTION: &'static str = "PauseProduction";
    /// Opcode for [`Order::CancelProduction`].
    pub const CANCEL_PRODUCTION: &'static str = "CancelProduction";

    /// Start producing `item`.
    pub fn start(item: impl Into<String>) -> Self {
        Self::StartProduction { item: item.into() }
    }

    /// Pause (`true`) or resume (`false`) `item`.
    pub fn pause(item: impl Into<String>, paused: bool) -> Self {
        Self::PauseProduction {
            item: item.into(),
            paused,
        }
    }

    /// Cancel one `item`.
    pub fn cancel(item: impl Into<String>) -> Self {
        Self::CancelProduction { item: item.into() }
    }

    /// Decode the wire form. The pause flag is any non-zero payload.
    ///
    /// Unknown opcodes yield `None`.
    #[must_use]
    pub fn from_wire(opcode: &str, target: &str, payload: i32) -> Option<Self> {
        match opcode {
            Self::START_PRODUCTION => Some(Self::start(target)),
            Self::PAUSE_PRODUCTION => Some(Self::pause(target, payload != 0)),
            Self::CANCEL_PRODUCTION => Some(Self::cancel(target)),
            _ => None,
        }
    }

    /// Wire opcode of this order.
    #[must_use]
    pub fn opcode(&self) -> &'static str {
        match self {
            Self::StartProduction { .. } => Self::START_PRODUCTION,
            Self::PauseProduction { .. } => Self::PAUSE_PRODUCTION,
            Self::CancelProduction { .. } => Self::CANCEL_PRODUCTION,
        }
    }

    /// Target item of this order.
    #[must_use]
    pub fn item(&self) -> &str {
        match self {
            Self::StartProduction { item }
            | Self::PauseProduction { item, .. }
            | Self::CancelProduction { item } => item,
        }
    }
}
