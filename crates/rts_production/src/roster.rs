//! Actor roster.
//!
//! The roster is the set of live actors (structures and units). It serves as
//! the producer directory and the tech tree for production queues, and it is
//! where produced units are materialized.
//!
//! Actors are stored in a `BTreeMap` so every enumeration runs in ascending
//! id order, which makes "first producer" well defined on every replica.

use std::collections::BTreeMap;
use std::fmt;

use crate::components::{ActorId, Cell, PlayerId};
use crate::data::ItemData;
use crate::notification::Notification;
use crate::producer::{
    OccupancyMap, Producer, ProducerCandidate, ProducerDirectory, ProducerSite,
};
use crate::rules::TechTree;

/// A live actor.
pub struct Actor {
    /// Unique identifier.
    pub id: ActorId,
    /// Owning player.
    pub owner: PlayerId,
    /// Item type this actor was built as.
    pub kind: String,
    /// Anchor cell.
    pub location: Cell,
    /// Preferred producer for its kind.
    pub is_primary: bool,
    /// Switched off (for example by low power).
    pub disabled: bool,
    producers: Vec<Box<dyn Producer>>,
}

impl fmt::Debug for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Actor")
            .field("id", &self.id)
            .field("owner", &self.owner)
            .field("kind", &self.kind)
            .field("location", &self.location)
            .field("is_primary", &self.is_primary)
            .field("disabled", &self.disabled)
            .field("producers", &self.producers)
            .finish()
    }
}

impl Actor {
    /// Whether this actor carries any production capability.
    #[must_use]
    pub fn has_production(&self) -> bool {
        !self.producers.is_empty()
    }

    fn site(&self) -> ProducerSite {
        ProducerSite {
            actor: self.id,
            owner: self.owner,
            location: self.location,
        }
    }
}

/// Parameters for spawning a new actor.
#[derive(Default)]
pub struct ActorSpawnParams {
    /// Owning player.
    pub owner: PlayerId,
    /// Item type.
    pub kind: String,
    /// Anchor cell.
    pub location: Cell,
    /// Start as the primary producer.
    pub is_primary: bool,
    /// Start disabled.
    pub disabled: bool,
    /// Production capabilities, tried in order.
    pub producers: Vec<Box<dyn Producer>>,
    /// Give the actor its own production queue.
    pub production_queue: bool,
}

impl ActorSpawnParams {
    /// Plain actor of `kind` owned by `owner` at `location`.
    #[must_use]
    pub fn new(owner: PlayerId, kind: impl Into<String>, location: Cell) -> Self {
        Self {
            owner,
            kind: kind.into(),
            location,
            ..Default::default()
        }
    }

    /// Add a production capability.
    #[must_use]
    pub fn with_producer(mut self, producer: impl Producer + 'static) -> Self {
        self.producers.push(Box::new(producer));
        self
    }

    /// Mark as primary producer.
    #[must_use]
    pub fn primary(mut self) -> Self {
        self.is_primary = true;
        self
    }

    /// Start disabled.
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// Attach a production queue when spawned into a world.
    #[must_use]
    pub fn with_queue(mut self) -> Self {
        self.production_queue = true;
        self
    }
}

/// All live actors.
#[derive(Debug)]
pub struct Roster {
    actors: BTreeMap<ActorId, Actor>,
    next_id: ActorId,
    spawned: Vec<Notification>,
}

impl Default for Roster {
    fn default() -> Self {
        Self::new()
    }
}

impl Roster {
    /// Create an empty roster.
    #[must_use]
    pub fn new() -> Self {
        Self {
            actors: BTreeMap::new(),
            next_id: 1,
            spawned: Vec::new(),
        }
    }

    /// Insert a new actor and return its ID.
    pub fn spawn(&mut self, params: ActorSpawnParams) -> ActorId {
        let id = self.next_id;
        self.next_id += 1;
        self.actors.insert(
            id,
            Actor {
                id,
                owner: params.owner,
                kind: params.kind,
                location: params.location,
                is_primary: params.is_primary,
                disabled: params.disabled,
                producers: params.producers,
            },
        );
        id
    }

    /// Remove an actor by ID.
    pub fn remove(&mut self, id: ActorId) -> Option<Actor> {
        self.actors.remove(&id)
    }

    /// Get an actor by ID.
    #[must_use]
    pub fn get(&self, id: ActorId) -> Option<&Actor> {
        self.actors.get(&id)
    }

    /// Get a mutable reference to an actor by ID.
    pub fn get_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.actors.get_mut(&id)
    }

    /// Check if an actor exists.
    #[must_use]
    pub fn contains(&self, id: ActorId) -> bool {
        self.actors.contains_key(&id)
    }

    /// Number of live actors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actors.len()
    }

    /// Whether the roster is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    /// Iterate over actors in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Actor> {
        self.actors.values()
    }

    /// Whether `player` owns at least one actor of `kind`.
    #[must_use]
    pub fn owns_kind(&self, player: PlayerId, kind: &str) -> bool {
        self.actors
            .values()
            .any(|actor| actor.owner == player && actor.kind == kind)
    }

    /// Make `id` the primary producer of its kind for its owner.
    ///
    /// Other actors of the same kind and owner lose the flag. Returns `false`
    /// if the actor does not exist.
    pub fn set_primary(&mut self, id: ActorId) -> bool {
        let Some((owner, kind)) = self.get(id).map(|a| (a.owner, a.kind.clone())) else {
            return false;
        };
        for actor in self.actors.values_mut() {
            if actor.owner == owner && actor.kind == kind {
                actor.is_primary = actor.id == id;
            }
        }
        true
    }

    /// Cells currently held by actors.
    #[must_use]
    pub fn occupancy(&self) -> OccupancyMap {
        self.actors.values().map(|actor| actor.location).collect()
    }

    /// Take the spawn notifications recorded since the last call.
    pub fn take_spawned(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.spawned)
    }
}

impl ProducerDirectory for Roster {
    fn candidates(&self, player: PlayerId, item: &ItemData) -> Vec<ProducerCandidate> {
        self.actors
            .values()
            .filter(|actor| actor.owner == player && item.built_at.contains(&actor.kind))
            .map(|actor| ProducerCandidate {
                actor: actor.id,
                is_primary: actor.is_primary,
                disabled: actor.disabled,
                has_production: actor.has_production(),
            })
            .collect()
    }

    fn try_produce(&mut self, producer: ActorId, item: &ItemData) -> bool {
        let occupancy = self.occupancy();
        let Some(actor) = self.actors.get_mut(&producer) else {
            return false;
        };

        let site = actor.site();
        let Some(cell) = actor
            .producers
            .iter_mut()
            .find_map(|capability| capability.produce(&site, item, &occupancy))
        else {
            return false;
        };

        let unit = self.spawn(ActorSpawnParams::new(site.owner, item.name.as_str(), cell));
        tracing::info!(
            actor = unit,
            item = %item.name,
            producer,
            x = cell.x,
            y = cell.y,
            "Unit spawned"
        );
        self.spawned.push(Notification::UnitSpawned {
            actor: unit,
            item: item.name.clone(),
            producer,
            cell,
        });
        true
    }
}

impl TechTree for Roster {
    fn can_build(&self, player: PlayerId, item: &ItemData) -> bool {
        item.prerequisites
            .iter()
            .all(|kind| self.owns_kind(player, kind))
            && item
                .built_at
                .iter()
                .any(|kind| self.owns_kind(player, kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::producer::{ExitProduction, Occupancy, SurroundProduction};

    fn rifleman() -> ItemData {
        ItemData::new("rifleman", "Infantry", 100)
            .with_built_at(&["barracks", "tent"])
            .with_prerequisites(&["barracks"])
    }

    fn barracks(owner: PlayerId, x: i32) -> ActorSpawnParams {
        ActorSpawnParams::new(owner, "barracks", Cell::new(x, 0))
            .with_producer(ExitProduction::new(vec![Cell::new(0, 1)]))
    }

    #[test]
    fn test_spawn_assigns_increasing_ids() {
        let mut roster = Roster::new();
        let a = roster.spawn(barracks(1, 0));
        let b = roster.spawn(barracks(1, 5));

        assert_eq!(a, 1);
        assert_eq!(b, 2);
        assert_eq!(roster.len(), 2);
        assert!(roster.get(a).unwrap().has_production());

        roster.remove(a);
        assert!(!roster.contains(a));
        assert_eq!(roster.spawn(barracks(1, 9)), 3);
    }

    #[test]
    fn test_candidates_filter_owner_and_kind() {
        let mut roster = Roster::new();
        let mine = roster.spawn(barracks(1, 0));
        roster.spawn(barracks(2, 5));
        roster.spawn(ActorSpawnParams::new(1, "power_plant", Cell::new(9, 9)));
        let tent = roster.spawn(ActorSpawnParams::new(1, "tent", Cell::new(12, 0)).disabled());

        let candidates = roster.candidates(1, &rifleman());
        let ids: Vec<ActorId> = candidates.iter().map(|c| c.actor).collect();
        assert_eq!(ids, vec![mine, tent]);
        assert!(candidates[1].disabled);
        assert!(!candidates[1].has_production);
    }

    #[test]
    fn test_set_primary_is_exclusive_per_kind() {
        let mut roster = Roster::new();
        let a = roster.spawn(barracks(1, 0).primary());
        let b = roster.spawn(barracks(1, 5));
        let other = roster.spawn(barracks(2, 9).primary());

        assert!(roster.set_primary(b));
        assert!(!roster.get(a).unwrap().is_primary);
        assert!(roster.get(b).unwrap().is_primary);
        assert!(roster.get(other).unwrap().is_primary);

        assert!(!roster.set_primary(99));
    }

    #[test]
    fn test_try_produce_spawns_unit() {
        let mut roster = Roster::new();
        let producer = roster.spawn(barracks(1, 4));

        assert!(roster.try_produce(producer, &rifleman()));
        let unit = roster.iter().find(|a| a.kind == "rifleman").unwrap();
        assert_eq!(unit.owner, 1);
        assert_eq!(unit.location, Cell::new(4, 1));
        assert!(!unit.has_production());

        let spawned = roster.take_spawned();
        assert_eq!(spawned.len(), 1);
        assert!(roster.take_spawned().is_empty());
    }

    #[test]
    fn test_try_produce_blocked_exit() {
        let mut roster = Roster::new();
        let producer = roster.spawn(barracks(1, 4));

        assert!(roster.try_produce(producer, &rifleman()));
        // The first unit still stands on the only exit
        assert!(!roster.try_produce(producer, &rifleman()));
        assert_eq!(roster.len(), 2);
    }

    #[test]
    fn test_try_produce_falls_through_capabilities() {
        let mut roster = Roster::new();
        let producer = roster.spawn(
            ActorSpawnParams::new(1, "barracks", Cell::new(0, 0))
                .with_producer(ExitProduction::new(Vec::new()))
                .with_producer(SurroundProduction::new(1, 1)),
        );

        assert!(roster.try_produce(producer, &rifleman()));
        let unit = roster.iter().find(|a| a.kind == "rifleman").unwrap();
        assert_eq!(unit.location, Cell::new(-1, -1));
    }

    #[test]
    fn test_try_produce_without_capability_fails() {
        let mut roster = Roster::new();
        let tent = roster.spawn(ActorSpawnParams::new(1, "tent", Cell::ZERO));
        assert!(!roster.try_produce(tent, &rifleman()));
        assert!(!roster.try_produce(42, &rifleman()));
    }

    #[test]
    fn test_tech_tree_requires_prerequisite_and_site() {
        let mut roster = Roster::new();
        assert!(!roster.can_build(1, &rifleman()));

        roster.spawn(ActorSpawnParams::new(1, "tent", Cell::ZERO));
        // Has a site but not the prerequisite
        assert!(!roster.can_build(1, &rifleman()));

        roster.spawn(barracks(1, 3));
        assert!(roster.can_build(1, &rifleman()));
        assert!(!roster.can_build(2, &rifleman()));
    }

    #[test]
    fn test_occupancy_snapshot() {
        let mut roster = Roster::new();
        roster.spawn(barracks(1, 3));
        let occupancy = roster.occupancy();
        assert!(occupancy.is_occupied(Cell::new(3, 0)));
        assert!(!occupancy.is_occupied(Cell::new(3, 1)));
    }
}
