//! Deterministic production world.
//!
//! The world owns everything production touches: player economies, the
//! actor roster, one production queue per queue-owning actor and the
//! frame-end task buffer.
//!
//! # Tick order
//!
//! Each call to [`World::tick`] runs, in this order:
//! 1. **Power** - recompute every player's power balance from owned actors
//! 2. **Queues** - tick every queue in ascending owner id order
//! 3. **Frame end** - run deferred tasks in registration order
//! 4. **Advance** - increment the tick counter
//!
//! Unit spawning happens only in step 3, so the roster never changes while
//! queues are being ticked.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use rts_production::components::Cell;
//! use rts_production::data::{ItemData, RulesData};
//! use rts_production::order::Order;
//! use rts_production::producer::ExitProduction;
//! use rts_production::roster::ActorSpawnParams;
//! use rts_production::rules::Rules;
//! use rts_production::world::World;
//!
//! let rules = Rules::new(RulesData {
//!     items: vec![
//!         ItemData::new("barracks", "Building", 300).structure(),
//!         ItemData::new("rifleman", "Infantry", 100).with_built_at(&["barracks"]),
//!     ],
//!     ..Default::default()
//! })
//! .unwrap();
//!
//! let mut world = World::new(Arc::new(rules));
//! world.add_player(1, 1000);
//! let barracks = world
//!     .spawn_actor(
//!         ActorSpawnParams::new(1, "barracks", Cell::ZERO)
//!             .with_producer(ExitProduction::new(vec![Cell::new(0, 1)]))
//!             .with_queue(),
//!     )
//!     .unwrap();
//!
//! world.issue_order(barracks, Order::start("rifleman")).unwrap();
//! for _ in 0..121 {
//!     world.tick();
//! }
//! assert!(world.roster().owns_kind(1, "rifleman"));
//! ```

use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::components::{ActorId, Cell, PlayerId};
use crate::economy::PlayerEconomy;
use crate::error::{GameError, Result};
use crate::frame_end::FrameEndTasks;
use crate::notification::{Notification, PlayerNotification};
use crate::order::Order;
use crate::queue::{ProductionHost, ProductionQueue, QueueSnapshot};
use crate::roster::{ActorSpawnParams, Roster};
use crate::rules::Rules;

/// Events generated during a single tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickEvents {
    /// The tick these events belong to.
    pub tick: u64,
    /// Notifications emitted this tick.
    pub notifications: Vec<PlayerNotification>,
    /// Actors spawned by producers this tick.
    pub spawned: Vec<ActorId>,
    /// Number of frame-end tasks that ran.
    pub tasks_run: usize,
}

/// The production simulation.
#[derive(Debug)]
pub struct World {
    tick: u64,
    rules: Arc<Rules>,
    players: BTreeMap<PlayerId, PlayerEconomy>,
    roster: Roster,
    queues: BTreeMap<ActorId, ProductionQueue<World>>,
    frame_end: FrameEndTasks<World>,
    notifications: Vec<PlayerNotification>,
}

impl World {
    /// Create an empty world at tick 0.
    #[must_use]
    pub fn new(rules: Arc<Rules>) -> Self {
        Self {
            tick: 0,
            rules,
            players: BTreeMap::new(),
            roster: Roster::new(),
            queues: BTreeMap::new(),
            frame_end: FrameEndTasks::new(),
            notifications: Vec::new(),
        }
    }

    /// Current tick number.
    #[must_use]
    pub const fn get_tick(&self) -> u64 {
        self.tick
    }

    /// Shared rules.
    #[must_use]
    pub fn rules(&self) -> &Arc<Rules> {
        &self.rules
    }

    /// All live actors.
    #[must_use]
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Every notification emitted so far, oldest first.
    #[must_use]
    pub fn notifications(&self) -> &[PlayerNotification] {
        &self.notifications
    }

    /// Add a player with starting cash. Re-adding a player resets its economy.
    pub fn add_player(&mut self, player: PlayerId, cash: i32) {
        tracing::debug!(player, cash, "Player added");
        self.players.insert(player, PlayerEconomy::new(cash));
    }

    /// Economy of `player`.
    #[must_use]
    pub fn economy(&self, player: PlayerId) -> Option<&PlayerEconomy> {
        self.players.get(&player)
    }

    /// Mutable economy of `player`.
    pub fn economy_mut(&mut self, player: PlayerId) -> Option<&mut PlayerEconomy> {
        self.players.get_mut(&player)
    }

    /// Register a task to run at the end of the current tick.
    ///
    /// Tasks registered while the frame-end buffer is draining run at the
    /// end of the next tick.
    pub fn schedule<F>(&mut self, task: F)
    where
        F: FnOnce(&mut World) + 'static,
    {
        self.frame_end.schedule(task);
    }

    /// Production queue owned by `owner`.
    #[must_use]
    pub fn queue(&self, owner: ActorId) -> Option<&ProductionQueue<World>> {
        self.queues.get(&owner)
    }

    /// Spawn an actor, creating its production queue if requested.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::PlayerNotFound`] if the owner was never added.
    pub fn spawn_actor(&mut self, params: ActorSpawnParams) -> Result<ActorId> {
        let owner = params.owner;
        if !self.players.contains_key(&owner) {
            return Err(GameError::PlayerNotFound(owner));
        }

        let with_queue = params.production_queue;
        let kind = params.kind.clone();
        let id = self.roster.spawn(params);
        if with_queue {
            self.queues.insert(
                id,
                ProductionQueue::new(id, owner, Arc::clone(&self.rules)),
            );
        }

        tracing::debug!(actor = id, owner, kind = %kind, with_queue, "Actor spawned");
        Ok(id)
    }

    /// Remove an actor. Its production queue goes with it, unrefunded.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::ActorNotFound`] if the actor does not exist.
    pub fn remove_actor(&mut self, id: ActorId) -> Result<()> {
        self.roster.remove(id).ok_or(GameError::ActorNotFound(id))?;
        if let Some(queue) = self.queues.remove(&id) {
            tracing::debug!(actor = id, dropped = queue.len(), "Production queue dropped");
        }
        Ok(())
    }

    /// Make `id` the primary producer of its kind for its owner.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::ActorNotFound`] if the actor does not exist.
    pub fn set_primary(&mut self, id: ActorId) -> Result<()> {
        if self.roster.set_primary(id) {
            Ok(())
        } else {
            Err(GameError::ActorNotFound(id))
        }
    }

    /// Enable or disable an actor.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::ActorNotFound`] if the actor does not exist.
    pub fn set_disabled(&mut self, id: ActorId, disabled: bool) -> Result<()> {
        let actor = self
            .roster
            .get_mut(id)
            .ok_or(GameError::ActorNotFound(id))?;
        actor.disabled = disabled;
        Ok(())
    }

    /// Apply a player order to the queue owned by `owner`.
    ///
    /// Only addressing can fail. The order itself is resolved by the queue
    /// and silently ignored when it makes no sense.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor does not exist or owns no queue.
    pub fn issue_order(&mut self, owner: ActorId, order: Order) -> Result<()> {
        if !self.roster.contains(owner) {
            return Err(GameError::ActorNotFound(owner));
        }
        let queue = self
            .queues
            .get_mut(&owner)
            .ok_or(GameError::NoProductionQueue(owner))?;
        let player = queue.player();
        let economy = self
            .players
            .get_mut(&player)
            .ok_or(GameError::PlayerNotFound(player))?;

        tracing::debug!(
            tick = self.tick,
            owner,
            opcode = order.opcode(),
            item = order.item(),
            "Order issued"
        );
        queue.resolve_order(&order, &self.roster, economy);
        Ok(())
    }

    /// Place a finished structure from `queue_owner`'s queue.
    ///
    /// `params.kind` names the structure. Returns `None` when the head of
    /// its category is not a finished item of that kind.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor does not exist or owns no queue.
    pub fn place_structure(
        &mut self,
        queue_owner: ActorId,
        params: ActorSpawnParams,
    ) -> Result<Option<ActorId>> {
        let queue = self
            .queues
            .get_mut(&queue_owner)
            .ok_or(GameError::NoProductionQueue(queue_owner))?;
        if !queue.take_completed(&params.kind) {
            return Ok(None);
        }
        let location: Cell = params.location;
        let id = self.spawn_actor(params)?;
        tracing::info!(actor = id, queue_owner, x = location.x, y = location.y, "Structure placed");
        Ok(Some(id))
    }

    /// Advance the world by one tick.
    pub fn tick(&mut self) -> TickEvents {
        let first_notification = self.notifications.len();

        // 1. Power
        self.update_power();

        // 2. Queues
        for queue in self.queues.values_mut() {
            let Some(economy) = self.players.get_mut(&queue.player()) else {
                continue;
            };
            queue.tick(economy, &mut self.frame_end);
        }

        // 3. Frame end
        let tasks = self.frame_end.take();
        let tasks_run = tasks.len();
        for task in tasks {
            task(self);
        }
        if tasks_run > 0 {
            tracing::debug!(tick = self.tick, tasks = tasks_run, "Frame-end tasks drained");
        }

        let notifications = self.notifications[first_notification..].to_vec();
        let spawned = notifications
            .iter()
            .filter_map(|n| match n.notification {
                Notification::UnitSpawned { actor, .. } => Some(actor),
                _ => None,
            })
            .collect();
        let events = TickEvents {
            tick: self.tick,
            notifications,
            spawned,
            tasks_run,
        };

        #[cfg(feature = "debug-validation")]
        self.validate_invariants();

        // 4. Advance
        self.tick += 1;

        #[cfg(debug_assertions)]
        {
            let hash = self.state_hash();
            tracing::debug!(tick = self.tick, state_hash = hash, "World state hash");
        }

        events
    }

    /// Recompute every player's power balance.
    ///
    /// Disabled actors still drain power but provide none.
    fn update_power(&mut self) {
        let mut balance: BTreeMap<PlayerId, (i32, i32)> =
            self.players.keys().map(|player| (*player, (0, 0))).collect();

        for actor in self.roster.iter() {
            let Some(power) = self.rules.item(&actor.kind).map(|item| item.power) else {
                continue;
            };
            let Some((provided, drained)) = balance.get_mut(&actor.owner) else {
                continue;
            };
            if power > 0 && !actor.disabled {
                *provided += power;
            } else if power < 0 {
                *drained -= power;
            }
        }

        for (player, (provided, drained)) in balance {
            if let Some(economy) = self.players.get_mut(&player) {
                economy.set_power(provided, drained);
            }
        }
    }

    #[cfg(feature = "debug-validation")]
    fn validate_invariants(&self) {
        for (owner, queue) in &self.queues {
            debug_assert!(self.roster.contains(*owner), "queue without owner {owner}");
            for category in queue.categories() {
                for item in queue.all_items(category) {
                    debug_assert!((0..=item.total_time()).contains(&item.remaining_time()));
                    debug_assert!((0..=item.total_cost()).contains(&item.remaining_cost()));
                    debug_assert_eq!(item.is_done(), item.remaining_time() == 0);
                }
            }
        }
    }

    /// Capture the serializable world state.
    #[must_use]
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            tick: self.tick,
            players: self.players.clone(),
            actors: self
                .roster
                .iter()
                .map(|actor| ActorSnapshot {
                    id: actor.id,
                    owner: actor.owner,
                    kind: actor.kind.clone(),
                    location: actor.location,
                    is_primary: actor.is_primary,
                    disabled: actor.disabled,
                })
                .collect(),
            queues: self.queues.values().map(ProductionQueue::snapshot).collect(),
        }
    }

    /// Calculate a hash of the current world state.
    ///
    /// Two worlds fed the same rules and the same orders produce identical
    /// hashes on every tick.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        self.snapshot().state_hash()
    }
}

impl ProductionHost for World {
    fn notify(&mut self, player: PlayerId, notification: Notification) {
        tracing::info!(tick = self.tick, player, ?notification, "Notification");
        self.notifications.push(PlayerNotification {
            tick: self.tick,
            player,
            notification,
        });
    }

    fn build_unit(&mut self, queue_owner: ActorId, item: &str) {
        // The owner may have been removed earlier in this frame
        let Some(queue) = self.queues.get_mut(&queue_owner) else {
            return;
        };
        let player = queue.player();
        let Some(economy) = self.players.get_mut(&player) else {
            return;
        };
        queue.build_unit(item, &mut self.roster, economy);

        for spawned in self.roster.take_spawned() {
            self.notify(player, spawned);
        }
    }
}

/// Serializable state of one actor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorSnapshot {
    /// Actor id.
    pub id: ActorId,
    /// Owning player.
    pub owner: PlayerId,
    /// Item type.
    pub kind: String,
    /// Anchor cell.
    pub location: Cell,
    /// Primary flag.
    pub is_primary: bool,
    /// Disabled flag.
    pub disabled: bool,
}

/// Serializable state of a [`World`].
///
/// Completion hooks and producer capabilities are behavior, not state, and
/// are left out.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Tick the snapshot was taken at.
    pub tick: u64,
    /// Player economies.
    pub players: BTreeMap<PlayerId, PlayerEconomy>,
    /// Actors in id order.
    pub actors: Vec<ActorSnapshot>,
    /// Queues in owner order.
    pub queues: Vec<QueueSnapshot>,
}

impl WorldSnapshot {
    /// Hash of this snapshot.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }

    /// Encode with bincode.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// Decode from bincode.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a valid snapshot.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(data)?)
    }
}
