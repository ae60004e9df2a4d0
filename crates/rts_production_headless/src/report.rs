//! Run reports.
//!
//! A report is the JSON summary of a finished headless run. The state hash
//! lets CI compare runs across machines without diffing full snapshots.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use rts_production::components::PlayerId;
use rts_production::economy::{Economy, PowerState};
use rts_production::notification::{Notification, PlayerNotification};
use rts_production::world::World;

use crate::scenario::ScenarioError;

/// Final state of one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerReport {
    /// Cash at the end of the run.
    pub cash: i32,
    /// Power generated.
    pub power_provided: i32,
    /// Power consumed.
    pub power_drained: i32,
    /// Resulting power state.
    pub power_state: PowerState,
    /// Owned actors by kind.
    pub actors: BTreeMap<String, u32>,
}

/// Summary of a headless run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Scenario name.
    pub scenario: String,
    /// Tick the run stopped at.
    pub final_tick: u64,
    /// World state hash at the end of the run.
    pub state_hash: u64,
    /// Per-player results.
    pub players: BTreeMap<PlayerId, PlayerReport>,
    /// Units handed out by producers, by kind.
    pub spawned: BTreeMap<String, u32>,
    /// Every notification, oldest first.
    pub notifications: Vec<PlayerNotification>,
}

impl RunReport {
    /// Summarize `world`.
    #[must_use]
    pub fn from_world(scenario: &str, world: &World) -> Self {
        let mut players: BTreeMap<PlayerId, PlayerReport> = BTreeMap::new();
        let snapshot = world.snapshot();
        for (player, economy) in &snapshot.players {
            players.insert(
                *player,
                PlayerReport {
                    cash: economy.cash,
                    power_provided: economy.power_provided,
                    power_drained: economy.power_drained,
                    power_state: economy.power_state(),
                    actors: BTreeMap::new(),
                },
            );
        }
        for actor in &snapshot.actors {
            if let Some(report) = players.get_mut(&actor.owner) {
                *report.actors.entry(actor.kind.clone()).or_default() += 1;
            }
        }

        let mut spawned: BTreeMap<String, u32> = BTreeMap::new();
        for entry in world.notifications() {
            if let Notification::UnitSpawned { item, .. } = &entry.notification {
                *spawned.entry(item.clone()).or_default() += 1;
            }
        }

        Self {
            scenario: scenario.to_string(),
            final_tick: world.get_tick(),
            state_hash: snapshot.state_hash(),
            players,
            spawned,
            notifications: world.notifications().to_vec(),
        }
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ScenarioError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the report as JSON to `path`.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<(), ScenarioError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
