//! Read-only rules provider.
//!
//! [`Rules`] is built once from [`RulesData`] and shared with every queue
//! (behind an `Arc`). Queues never reach for global state: cost, category,
//! build speed and the low-power slowdown all come from here.

use std::collections::BTreeMap;
use std::path::Path;

use crate::components::PlayerId;
use crate::data::{GeneralData, ItemData, RulesData};
use crate::error::{GameError, Result};

/// Tech-tree gate: is `item` currently buildable for `player`?
pub trait TechTree {
    /// Whether `player` may start production of `item` right now.
    fn can_build(&self, player: PlayerId, item: &ItemData) -> bool;
}

/// Registry of every buildable item plus the global constants.
#[derive(Debug, Clone, Default)]
pub struct Rules {
    general: GeneralData,
    items: BTreeMap<String, ItemData>,
}

impl Rules {
    /// Build a provider from parsed data, validating cross references.
    pub fn new(data: RulesData) -> Result<Self> {
        let mut items = BTreeMap::new();
        for item in data.items {
            if items.contains_key(&item.name) {
                return Err(GameError::InvalidRules(format!(
                    "duplicate item '{}'",
                    item.name
                )));
            }
            items.insert(item.name.clone(), item);
        }
        let rules = Self {
            general: data.general,
            items,
        };
        rules.validate()?;
        Ok(rules)
    }

    /// Parse rules from a RON string.
    pub fn from_ron(source: &str) -> Result<Self> {
        Self::from_ron_named(source, "<inline>")
    }

    /// Load rules from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| GameError::DataParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_ron_named(&contents, &path.display().to_string())
    }

    fn from_ron_named(source: &str, path: &str) -> Result<Self> {
        let data: RulesData = ron::from_str(source).map_err(|e| GameError::DataParseError {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        Self::new(data)
    }

    /// Check constants and that every `built_at`/`prerequisites` entry names a known item.
    pub fn validate(&self) -> Result<()> {
        let general = &self.general;
        if general.low_power_slowdown <= 0 {
            return Err(GameError::InvalidRules(
                "low_power_slowdown must be positive".to_string(),
            ));
        }
        if general.ticks_per_minute <= 0 {
            return Err(GameError::InvalidRules(
                "ticks_per_minute must be positive".to_string(),
            ));
        }
        if general.build_speed_percent < 0 || general.build_time_scale_percent < 0 {
            return Err(GameError::InvalidRules(
                "build speed percentages must not be negative".to_string(),
            ));
        }

        for item in self.items.values() {
            if item.cost < 0 {
                return Err(GameError::InvalidRules(format!(
                    "item '{}' has negative cost {}",
                    item.name, item.cost
                )));
            }
            let references = item.built_at.iter().chain(item.prerequisites.iter());
            for kind in references {
                if !self.items.contains_key(kind) {
                    return Err(GameError::InvalidRules(format!(
                        "item '{}' references unknown item '{kind}'",
                        item.name
                    )));
                }
            }
        }
        Ok(())
    }

    /// Global production constants.
    #[must_use]
    pub fn general(&self) -> &GeneralData {
        &self.general
    }

    /// Look up an item by name.
    #[must_use]
    pub fn item(&self, name: &str) -> Option<&ItemData> {
        self.items.get(name)
    }

    /// All items, sorted by name.
    pub fn items(&self) -> impl Iterator<Item = &ItemData> {
        self.items.values()
    }

    /// Category an item is queued under.
    #[must_use]
    pub fn category_of(&self, name: &str) -> Option<&str> {
        self.items.get(name).map(|item| item.category.as_str())
    }

    /// Build time in ticks for an item.
    ///
    /// `cost * build_speed * ticks_per_minute / 1000`, then scaled by the
    /// build-mode percentage. Computed in 64 bits with a single floor
    /// division; items clamp the result to at least one tick.
    #[must_use]
    pub fn build_time(&self, item: &ItemData) -> i32 {
        let general = &self.general;
        let numerator = i64::from(item.cost)
            * i64::from(general.build_speed_percent)
            * i64::from(general.ticks_per_minute)
            * i64::from(general.build_time_scale_percent);
        let time = numerator / (100 * 1000 * 100);
        i32::try_from(time).unwrap_or(i32::MAX)
    }
}
