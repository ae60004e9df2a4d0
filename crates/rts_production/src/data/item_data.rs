//! Buildable item definitions.

use serde::{Deserialize, Serialize};

/// Data-driven definition of a unit or structure that can be queued.
///
/// # Example RON
///
/// ```ron
/// ItemData(
///     name: "light_tank",
///     category: "Vehicle",
///     cost: 700,
///     built_at: ["war_factory"],
///     prerequisites: ["war_factory"],
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemData {
    /// Unique type key, also used as the actor kind once built.
    pub name: String,

    /// Queue category this item is built under.
    pub category: String,

    /// Total build cost.
    pub cost: i32,

    /// Structures are placed by the player, so completion does not spawn them.
    #[serde(default)]
    pub is_structure: bool,

    /// Actor kinds that can produce this item.
    #[serde(default)]
    pub built_at: Vec<String>,

    /// Actor kinds the player must own before this item is buildable.
    #[serde(default)]
    pub prerequisites: Vec<String>,

    /// Power provided (positive) or drained (negative) once built.
    #[serde(default)]
    pub power: i32,
}

impl ItemData {
    /// Create an item with no production sites, prerequisites or power.
    #[must_use]
    pub fn new(name: impl Into<String>, category: impl Into<String>, cost: i32) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            cost,
            is_structure: false,
            built_at: Vec::new(),
            prerequisites: Vec::new(),
            power: 0,
        }
    }

    /// Mark this item as a structure.
    #[must_use]
    pub fn structure(mut self) -> Self {
        self.is_structure = true;
        self
    }

    /// Set the actor kinds that can produce this item.
    #[must_use]
    pub fn with_built_at(mut self, kinds: &[&str]) -> Self {
        self.built_at = kinds.iter().map(|k| (*k).to_string()).collect();
        self
    }

    /// Set the actor kinds required before this item is buildable.
    #[must_use]
    pub fn with_prerequisites(mut self, kinds: &[&str]) -> Self {
        self.prerequisites = kinds.iter().map(|k| (*k).to_string()).collect();
        self
    }

    /// Set the power contribution.
    #[must_use]
    pub fn with_power(mut self, power: i32) -> Self {
        self.power = power;
        self
    }
}
