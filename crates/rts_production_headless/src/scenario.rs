//! Scenario loading and configuration.
//!
//! Scenarios define the initial world for headless runs: the rules to use,
//! each player's starting cash and actors, and a script of timed actions.
//! Actors are referred to by label because their ids are only known once
//! the world has spawned them.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use rts_production::components::{Cell, PlayerId};
use rts_production::data::RulesData;
use rts_production::error::GameError;
use rts_production::order::Order;
use rts_production::producer::{ExitProduction, SurroundProduction};
use rts_production::roster::ActorSpawnParams;
use rts_production::rules::Rules;

/// Error type for scenario operations.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// File not found.
    #[error("Scenario file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read scenario file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse scenario: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// Rules failed to load or the world rejected the setup.
    #[error(transparent)]
    Game(#[from] GameError),
    /// Neither a rules file nor inline rules were given.
    #[error("Scenario '{0}' names no rules")]
    MissingRules(String),
    /// A script step refers to a label no actor carries.
    #[error("Unknown actor label: {0}")]
    UnknownLabel(String),
    /// Two actors share a label.
    #[error("Duplicate actor label: {0}")]
    DuplicateLabel(String),
    /// A wire command names an opcode no order uses.
    #[error("Unknown order opcode: {0}")]
    UnknownOpcode(String),
    /// Report encoding failed.
    #[error("Failed to encode report: {0}")]
    Report(#[from] serde_json::Error),
}

/// A complete scenario configuration.
///
/// # Example RON
///
/// ```ron
/// Scenario(
///     name: "Rifle rush",
///     rules: Some("../data/rules.ron"),
///     ticks: 600,
///     players: [
///         PlayerSetup(id: 1, cash: 1000, actors: [
///             ActorPlacement(label: Some("yard"), kind: "construction_yard", position: (0, 0), queue: true),
///             ActorPlacement(kind: "barracks", position: (8, 0), producers: [Exit([(0, 2)])]),
///         ]),
///     ],
///     script: [
///         ScriptedAction(tick: 0, action: Order(actor: "yard", order: StartProduction(item: "rifleman"))),
///     ],
/// )
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Rules file, relative to the scenario file.
    #[serde(default)]
    pub rules: Option<String>,
    /// Rules given directly in the scenario. Wins over `rules`.
    #[serde(default)]
    pub inline_rules: Option<RulesData>,
    /// Default run length in ticks.
    #[serde(default = "default_ticks")]
    pub ticks: u64,
    /// Players and their starting actors.
    #[serde(default)]
    pub players: Vec<PlayerSetup>,
    /// Timed actions.
    #[serde(default)]
    pub script: Vec<ScriptedAction>,
}

fn default_ticks() -> u64 {
    1500
}

impl Scenario {
    /// Load a scenario from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        let scenario: Scenario = ron::from_str(&contents)?;
        Ok(scenario)
    }

    /// Load from a RON string (useful for embedded scenarios).
    pub fn from_ron_str(ron: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = ron::from_str(ron)?;
        Ok(scenario)
    }

    /// Resolve the rules, reading the rules file relative to `base_dir`.
    pub fn load_rules(&self, base_dir: &Path) -> Result<Rules, ScenarioError> {
        if let Some(data) = &self.inline_rules {
            return Ok(Rules::new(data.clone())?);
        }
        let Some(file) = &self.rules else {
            return Err(ScenarioError::MissingRules(self.name.clone()));
        };
        let path: PathBuf = base_dir.join(file);
        tracing::debug!(path = %path.display(), "Loading rules");
        Ok(Rules::load(path)?)
    }

    /// Check that labels are unique, every script reference resolves and
    /// every wire command decodes.
    pub fn validate_labels(&self) -> Result<(), ScenarioError> {
        let mut labels = BTreeSet::new();
        let declared = self
            .players
            .iter()
            .flat_map(|p| p.actors.iter())
            .chain(self.script.iter().filter_map(|s| match &s.action {
                Action::Place { actor, .. } => Some(actor),
                _ => None,
            }))
            .filter_map(|a| a.label.as_deref());
        for label in declared {
            if !labels.insert(label) {
                return Err(ScenarioError::DuplicateLabel(label.to_string()));
            }
        }

        for step in &self.script {
            let referenced = step.action.target();
            if !labels.contains(referenced) {
                return Err(ScenarioError::UnknownLabel(referenced.to_string()));
            }
            if let Action::Command { opcode, .. } = &step.action {
                if Order::from_wire(opcode, "", 0).is_none() {
                    return Err(ScenarioError::UnknownOpcode(opcode.clone()));
                }
            }
        }
        Ok(())
    }
}

/// One player's starting state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerSetup {
    /// Player id.
    pub id: PlayerId,
    /// Starting cash.
    #[serde(default)]
    pub cash: i32,
    /// Actors present at tick 0.
    #[serde(default)]
    pub actors: Vec<ActorPlacement>,
}

/// An actor to spawn.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActorPlacement {
    /// Name used by script steps.
    #[serde(default)]
    pub label: Option<String>,
    /// Item type.
    pub kind: String,
    /// Anchor cell.
    #[serde(default)]
    pub position: (i32, i32),
    /// Start as primary producer.
    #[serde(default)]
    pub primary: bool,
    /// Start disabled.
    #[serde(default)]
    pub disabled: bool,
    /// Give the actor a production queue.
    #[serde(default)]
    pub queue: bool,
    /// Production capabilities, tried in order.
    #[serde(default)]
    pub producers: Vec<ProducerSpec>,
}

impl ActorPlacement {
    /// Create a placement of `kind` at `(x, y)`.
    #[must_use]
    pub fn new(kind: impl Into<String>, x: i32, y: i32) -> Self {
        Self {
            kind: kind.into(),
            position: (x, y),
            ..Default::default()
        }
    }

    /// Spawn parameters for `owner`.
    #[must_use]
    pub fn spawn_params(&self, owner: PlayerId) -> ActorSpawnParams {
        let mut params = ActorSpawnParams::new(owner, self.kind.as_str(), Cell::from(self.position));
        params.is_primary = self.primary;
        params.disabled = self.disabled;
        params.production_queue = self.queue;
        for spec in &self.producers {
            params = match spec {
                ProducerSpec::Exit(exits) => params.with_producer(ExitProduction::new(
                    exits.iter().copied().map(Cell::from).collect(),
                )),
                ProducerSpec::Surround(width, height) => {
                    params.with_producer(SurroundProduction::new(*width, *height))
                }
            };
        }
        params
    }
}

/// Production capability of a scenario actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProducerSpec {
    /// Ordered exit offsets.
    Exit(Vec<(i32, i32)>),
    /// Ring around a `width` x `height` footprint.
    Surround(i32, i32),
}

/// An action applied before the world steps tick `tick`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptedAction {
    /// Tick the action applies to.
    pub tick: u64,
    /// What to do.
    pub action: Action,
}

/// A scripted world mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Action {
    /// Issue a production order to a queue owner.
    Order {
        /// Queue owner label.
        actor: String,
        /// The order.
        order: Order,
    },
    /// Issue an order in its wire form: string opcode, target item and an
    /// integer payload (non-zero pauses).
    Command {
        /// Queue owner label.
        actor: String,
        /// `StartProduction`, `PauseProduction` or `CancelProduction`.
        opcode: String,
        /// Target item.
        item: String,
        /// Secondary payload.
        #[serde(default)]
        payload: i32,
    },
    /// Place a finished structure from a queue.
    Place {
        /// Queue owner label.
        queue: String,
        /// The structure to place. Its owner is the queue's player.
        actor: ActorPlacement,
    },
    /// Make an actor the primary producer of its kind.
    SetPrimary {
        /// Actor label.
        actor: String,
    },
    /// Enable or disable an actor.
    SetDisabled {
        /// Actor label.
        actor: String,
        /// New flag.
        disabled: bool,
    },
    /// Remove an actor.
    Remove {
        /// Actor label.
        actor: String,
    },
}

impl Action {
    /// Label of the actor this action addresses.
    #[must_use]
    pub fn target(&self) -> &str {
        match self {
            Self::Order { actor, .. }
            | Self::Command { actor, .. }
            | Self::SetPrimary { actor }
            | Self::SetDisabled { actor, .. }
            | Self::Remove { actor } => actor,
            Self::Place { queue, .. } => queue,
        }
    }
}
