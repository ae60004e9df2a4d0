//! Data structures for production rules.
//!
//! This module contains pure data structures that define buildable items and
//! the global production constants. All structs are designed to be
//! deserialized from RON files.
//!
//! **Note:** This module contains no validation - [`crate::rules::Rules`]
//! checks cross references when the data is turned into a provider.

mod general_data;
mod item_data;

pub use general_data::GeneralData;
pub use item_data::ItemData;

use serde::{Deserialize, Serialize};

/// Complete rules file: global constants plus every buildable item.
///
/// # Example RON
///
/// ```ron
/// RulesData(
///     general: GeneralData(
///         build_speed_percent: 80,
///         low_power_slowdown: 3,
///     ),
///     items: [
///         ItemData(name: "barracks", category: "Building", cost: 300, is_structure: true,
///                  built_at: ["construction_yard"]),
///         ItemData(name: "rifleman", category: "Infantry", cost: 100, built_at: ["barracks"]),
///     ],
/// )
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RulesData {
    /// Global production constants.
    #[serde(default)]
    pub general: GeneralData,

    /// All item definitions, in declaration order.
    #[serde(default)]
    pub items: Vec<ItemData>,
}
