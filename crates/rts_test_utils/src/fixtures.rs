//! Test fixtures and helpers.
//!
//! A standard rules set and pre-built player bases for consistent testing.

use std::sync::Arc;

use fixed::types::I32F32;
use serde::{Deserialize, Serialize};

use rts_production::components::{ActorId, Cell, PlayerId};
use rts_production::data::RulesData;
use rts_production::error::Result;
use rts_production::order::Order;
use rts_production::producer::{ExitProduction, SurroundProduction};
use rts_production::roster::ActorSpawnParams;
use rts_production::rules::Rules;
use rts_production::world::World;

/// Standard rules used across tests.
///
/// Build times at the default constants:
///
/// | item        | cost | ticks |
/// |-------------|------|-------|
/// | rifleman    | 100  | 120   |
/// | engineer    | 500  | 600   |
/// | jeep        | 600  | 720   |
/// | light_tank  | 700  | 840   |
/// | power_plant | 300  | 360   |
/// | barracks    | 300  | 360   |
pub const STANDARD_RULES_RON: &str = r#"
RulesData(
    general: GeneralData(
        build_speed_percent: 80,
        build_time_scale_percent: 100,
        ticks_per_minute: 1500,
        low_power_slowdown: 3,
    ),
    items: [
        ItemData(name: "construction_yard", category: "Building", cost: 2500, is_structure: true),
        ItemData(name: "power_plant", category: "Building", cost: 300, is_structure: true,
                 built_at: ["construction_yard"], power: 100),
        ItemData(name: "barracks", category: "Building", cost: 300, is_structure: true,
                 built_at: ["construction_yard"], prerequisites: ["power_plant"], power: -20),
        ItemData(name: "war_factory", category: "Building", cost: 2000, is_structure: true,
                 built_at: ["construction_yard"], prerequisites: ["power_plant", "barracks"],
                 power: -30),
        ItemData(name: "rifleman", category: "Infantry", cost: 100, built_at: ["barracks"]),
        ItemData(name: "engineer", category: "Infantry", cost: 500, built_at: ["barracks"]),
        ItemData(name: "jeep", category: "Vehicle", cost: 600, built_at: ["war_factory"]),
        ItemData(name: "light_tank", category: "Vehicle", cost: 700, built_at: ["war_factory"],
                 prerequisites: ["war_factory"]),
    ],
)
"#;

/// Parse [`STANDARD_RULES_RON`].
///
/// # Panics
///
/// Panics if the embedded rules fail to parse or validate.
#[must_use]
pub fn standard_rules() -> Arc<Rules> {
    let data: RulesData = ron::from_str(STANDARD_RULES_RON).expect("standard rules parse");
    Arc::new(Rules::new(data).expect("standard rules validate"))
}

/// Create a fixed-point fraction (for comparing progress ratios).
#[must_use]
pub fn fraction(numerator: i32, denominator: i32) -> I32F32 {
    I32F32::from_num(numerator) / I32F32::from_num(denominator)
}

/// Actors of a base created by [`BasePlan::build`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Base {
    /// Owning player.
    pub player: PlayerId,
    /// Construction yard. Owns the production queue.
    pub yard: ActorId,
    /// Power plant, if built.
    pub power_plant: Option<ActorId>,
    /// Barracks, if built.
    pub barracks: Option<ActorId>,
    /// War factory, if built.
    pub war_factory: Option<ActorId>,
}

/// Recipe for a player base in a [`World`] using [`standard_rules`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasePlan {
    /// Owning player.
    pub player: PlayerId,
    /// Starting cash.
    pub cash: i32,
    /// Anchor of the yard; other buildings sit to its right.
    pub origin: Cell,
    /// Include a power plant.
    pub power_plant: bool,
    /// Include a barracks.
    pub barracks: bool,
    /// Include a war factory.
    pub war_factory: bool,
}

impl BasePlan {
    /// Full base with 10 000 cash, spaced out by player id.
    #[must_use]
    pub fn new(player: PlayerId) -> Self {
        let x = i32::try_from(player).unwrap_or(0) * 50;
        Self {
            player,
            cash: 10_000,
            origin: Cell::new(x, 0),
            power_plant: true,
            barracks: true,
            war_factory: true,
        }
    }

    /// Set starting cash.
    #[must_use]
    pub fn with_cash(mut self, cash: i32) -> Self {
        self.cash = cash;
        self
    }

    /// Leave out the power plant.
    #[must_use]
    pub fn without_power(mut self) -> Self {
        self.power_plant = false;
        self
    }

    /// Leave out the war factory.
    #[must_use]
    pub fn without_war_factory(mut self) -> Self {
        self.war_factory = false;
        self
    }

    /// Add the player and spawn the base.
    ///
    /// Barracks spawn through two exits, then anywhere around their 2x2
    /// footprint. War factories use a single exit, then their 3x3 ring.
    ///
    /// # Errors
    ///
    /// Returns an error if the world rejects a spawn.
    pub fn build(&self, world: &mut World) -> Result<Base> {
        let player = self.player;
        let at = |dx: i32| self.origin.offset(Cell::new(dx, 0));
        world.add_player(player, self.cash);

        let yard = world.spawn_actor(
            ActorSpawnParams::new(player, "construction_yard", self.origin).with_queue(),
        )?;

        let power_plant = if self.power_plant {
            Some(world.spawn_actor(ActorSpawnParams::new(player, "power_plant", at(4)))?)
        } else {
            None
        };

        let barracks = if self.barracks {
            Some(
                world.spawn_actor(
                    ActorSpawnParams::new(player, "barracks", at(8))
                        .with_producer(ExitProduction::new(vec![
                            Cell::new(0, 2),
                            Cell::new(1, 2),
                        ]))
                        .with_producer(SurroundProduction::new(2, 2)),
                )?,
            )
        } else {
            None
        };

        let war_factory = if self.war_factory {
            Some(
                world.spawn_actor(
                    ActorSpawnParams::new(player, "war_factory", at(12))
                        .with_producer(ExitProduction::new(vec![Cell::new(1, 3)]))
                        .with_producer(SurroundProduction::new(3, 3)),
                )?,
            )
        } else {
            None
        };

        tracing::debug!(player, yard, "Test base built");
        Ok(Base {
            player,
            yard,
            power_plant,
            barracks,
            war_factory,
        })
    }
}

/// An order issued before a given tick is stepped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptedOrder {
    /// Tick the order applies to.
    pub tick: u64,
    /// Queue owner the order is addressed to.
    pub owner: ActorId,
    /// The order.
    pub order: Order,
}

/// Run `world` for `ticks` ticks, issuing `script` along the way.
///
/// Orders addressed to missing actors are skipped.
pub fn run_script(world: &mut World, script: &[ScriptedOrder], ticks: u64) {
    for _ in 0..ticks {
        let now = world.get_tick();
        for scripted in script.iter().filter(|s| s.tick == now) {
            if let Err(err) = world.issue_order(scripted.owner, scripted.order.clone()) {
                tracing::debug!(%err, "Scripted order skipped");
            }
        }
        world.tick();
    }
}
