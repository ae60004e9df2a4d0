//! # RTS Production
//!
//! Deterministic production scheduling core for a classic RTS.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No audio (completion announcements are [`notification::Notification`]s)
//! - No system randomness
//! - Integer cost and time arithmetic (fixed-point only for progress ratios)
//!
//! Every replica fed the same rules and the same orders reaches the same
//! state on every tick, which is what lockstep multiplayer and replays need.
//!
//! ## Crate Structure
//!
//! - [`data`] - RON-loadable item and constant definitions
//! - [`rules`] - Validated rules provider and build-time formula
//! - [`economy`] - Cash and power port
//! - [`order`] - Player production orders
//! - [`item`] - A single build job with amortized cost
//! - [`queue`] - Per-owner, per-category FIFO queues
//! - [`producer`] - Producer capabilities and producer selection
//! - [`frame_end`] - Deferred world mutations
//! - [`roster`] - Live actors, producer directory and tech tree
//! - [`world`] - The tick driver tying it all together

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod components;
pub mod data;
pub mod economy;
pub mod error;
pub mod frame_end;
pub mod item;
pub mod math;
pub mod notification;
pub mod order;
pub mod producer;
pub mod queue;
pub mod roster;
pub mod rules;
pub mod world;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::components::*;
    pub use crate::data::{GeneralData, ItemData, RulesData};
    pub use crate::economy::{Economy, PlayerEconomy, PowerState};
    pub use crate::error::{GameError, Result};
    pub use crate::frame_end::FrameEndTasks;
    pub use crate::item::{ItemSnapshot, ItemTick, ProductionItem};
    pub use crate::math::Fixed;
    pub use crate::notification::{Notification, PlayerNotification};
    pub use crate::order::Order;
    pub use crate::producer::{
        select_producer, ExitProduction, Producer, ProducerCandidate, ProducerDirectory,
        SurroundProduction,
    };
    pub use crate::queue::{ProductionHost, ProductionQueue, QueueSnapshot};
    pub use crate::roster::{Actor, ActorSpawnParams, Roster};
    pub use crate::rules::{Rules, TechTree};
    pub use crate::world::{TickEvents, World, WorldSnapshot};
}
