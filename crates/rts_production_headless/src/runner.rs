//! Scenario runner.
//!
//! Builds a [`World`] from a [`Scenario`] and steps it, applying scripted
//! actions before the tick they are stamped with.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use rts_production::components::ActorId;
use rts_production::error::{GameError, Result as GameResult};
use rts_production::order::Order;
use rts_production::rules::Rules;
use rts_production::world::{TickEvents, World};

use crate::report::RunReport;
use crate::scenario::{Action, Scenario, ScenarioError, ScriptedAction};

/// Drives one scenario.
#[derive(Debug)]
pub struct ScenarioRunner {
    name: String,
    world: World,
    labels: BTreeMap<String, ActorId>,
    script: Vec<ScriptedAction>,
    cursor: usize,
    default_ticks: u64,
}

impl ScenarioRunner {
    /// Build the starting world for `scenario` with `rules`.
    pub fn new(scenario: Scenario, rules: Arc<Rules>) -> Result<Self, ScenarioError> {
        scenario.validate_labels()?;

        let mut world = World::new(rules);
        let mut labels = BTreeMap::new();
        for player in &scenario.players {
            world.add_player(player.id, player.cash);
            for placement in &player.actors {
                let id = world.spawn_actor(placement.spawn_params(player.id))?;
                if let Some(label) = &placement.label {
                    labels.insert(label.clone(), id);
                }
            }
        }

        // Stable sort keeps file order within a tick
        let mut script = scenario.script;
        script.sort_by_key(|step| step.tick);

        tracing::info!(
            scenario = %scenario.name,
            players = scenario.players.len(),
            actors = world.roster().len(),
            actions = script.len(),
            "Scenario loaded"
        );

        Ok(Self {
            name: scenario.name,
            world,
            labels,
            script,
            cursor: 0,
            default_ticks: scenario.ticks,
        })
    }

    /// Load a scenario file and the rules it names.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        let scenario = Scenario::load(path)?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        let rules = scenario.load_rules(base_dir)?;
        Self::new(scenario, Arc::new(rules))
    }

    /// The world being driven.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Actor id behind a label.
    #[must_use]
    pub fn actor(&self, label: &str) -> Option<ActorId> {
        self.labels.get(label).copied()
    }

    /// Run length the scenario asks for.
    #[must_use]
    pub const fn default_ticks(&self) -> u64 {
        self.default_ticks
    }

    /// Apply this tick's actions, then step the world once.
    pub fn step(&mut self) -> TickEvents {
        let now = self.world.get_tick();
        while let Some(step) = self.script.get(self.cursor) {
            if step.tick > now {
                break;
            }
            let action = step.action.clone();
            self.cursor += 1;
            if step.tick < now {
                tracing::warn!(
                    tick = now,
                    stamped = step.tick,
                    actor = action.target(),
                    "Scripted action skipped, tick already passed"
                );
                continue;
            }
            if let Err(err) = self.apply(&action) {
                tracing::warn!(tick = now, actor = action.target(), %err, "Scripted action failed");
            }
        }
        self.world.tick()
    }

    /// Step `ticks` times and summarize.
    pub fn run(&mut self, ticks: u64) -> RunReport {
        for _ in 0..ticks {
            self.step();
        }
        tracing::info!(
            scenario = %self.name,
            tick = self.world.get_tick(),
            state_hash = self.world.state_hash(),
            "Run finished"
        );
        self.report()
    }

    /// Summary of the current world.
    #[must_use]
    pub fn report(&self) -> RunReport {
        RunReport::from_world(&self.name, &self.world)
    }

    fn resolve(&self, label: &str) -> Result<ActorId, ScenarioError> {
        self.actor(label)
            .ok_or_else(|| ScenarioError::UnknownLabel(label.to_string()))
    }

    fn apply(&mut self, action: &Action) -> Result<(), ScenarioError> {
        let target = self.resolve(action.target())?;
        let outcome: GameResult<()> = match action {
            Action::Order { order, .. } => self.world.issue_order(target, order.clone()),
            Action::Command {
                opcode,
                item,
                payload,
                ..
            } => {
                let Some(order) = Order::from_wire(opcode, item, *payload) else {
                    return Err(ScenarioError::UnknownOpcode(opcode.clone()));
                };
                self.world.issue_order(target, order)
            }
            Action::SetPrimary { .. } => self.world.set_primary(target),
            Action::SetDisabled { disabled, .. } => self.world.set_disabled(target, *disabled),
            Action::Remove { .. } => self.world.remove_actor(target),
            Action::Place { actor, .. } => {
                let Some(owner) = self.world.queue(target).map(|q| q.player()) else {
                    return Err(GameError::NoProductionQueue(target).into());
                };
                match self.world.place_structure(target, actor.spawn_params(owner))? {
                    Some(id) => {
                        if let Some(label) = &actor.label {
                            self.labels.insert(label.clone(), id);
                        }
                    }
                    None => tracing::warn!(
                        queue = target,
                        kind = %actor.kind,
                        "Structure not ready to place"
                    ),
                }
                Ok(())
            }
        };
        Ok(outcome?)
    }
}
