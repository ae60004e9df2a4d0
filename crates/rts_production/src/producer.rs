//! Producer capabilities and producer selection.
//!
//! A finished item has to come out of some building. [`select_producer`]
//! picks that building from the owner's roster, and the chosen actor's
//! [`Producer`] capabilities decide whether the unit can actually be placed.
//!
//! Selection order:
//! 1. The first primary producer that is not disabled.
//! 2. Otherwise the first producer of a matching kind, disabled or not.
//!
//! The fallback intentionally skips the disabled check.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::components::{ActorId, Cell, PlayerId};
use crate::data::ItemData;

/// Read-only view of which cells are taken.
pub trait Occupancy {
    /// Whether something already stands on `cell`.
    fn is_occupied(&self, cell: Cell) -> bool;
}

/// Snapshot of occupied cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OccupancyMap {
    cells: BTreeSet<Cell>,
}

impl OccupancyMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a cell as occupied.
    pub fn insert(&mut self, cell: Cell) {
        self.cells.insert(cell);
    }
}

impl FromIterator<Cell> for OccupancyMap {
    fn from_iter<I: IntoIterator<Item = Cell>>(iter: I) -> Self {
        Self {
            cells: iter.into_iter().collect(),
        }
    }
}

impl Occupancy for OccupancyMap {
    fn is_occupied(&self, cell: Cell) -> bool {
        self.cells.contains(&cell)
    }
}

/// The producing actor as seen by a [`Producer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProducerSite {
    /// Producing actor.
    pub actor: ActorId,
    /// Owner of the producing actor.
    pub owner: PlayerId,
    /// Anchor cell of the producing actor.
    pub location: Cell,
}

/// A production capability attached to an actor.
///
/// Returns the cell where the new unit appears, or `None` when it cannot be
/// placed right now. A `None` leaves the finished item at the head of its
/// queue to be retried next tick.
pub trait Producer: fmt::Debug {
    /// Try to place one `item` produced at `site`.
    fn produce(
        &mut self,
        site: &ProducerSite,
        item: &ItemData,
        occupancy: &dyn Occupancy,
    ) -> Option<Cell>;
}

/// Spawns units through a fixed, ordered list of exit cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitProduction {
    /// Exit offsets relative to the producer's location, tried in order.
    pub exits: Vec<Cell>,
}

impl ExitProduction {
    /// Create an exit producer.
    #[must_use]
    pub fn new(exits: Vec<Cell>) -> Self {
        Self { exits }
    }
}

impl Producer for ExitProduction {
    fn produce(
        &mut self,
        site: &ProducerSite,
        _item: &ItemData,
        occupancy: &dyn Occupancy,
    ) -> Option<Cell> {
        self.exits
            .iter()
            .map(|exit| site.location.offset(*exit))
            .find(|cell| !occupancy.is_occupied(*cell))
    }
}

/// Spawns units on any free cell around a rectangular footprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurroundProduction {
    /// Footprint width in cells, anchored at the producer's location.
    pub width: i32,
    /// Footprint height in cells.
    pub height: i32,
}

impl SurroundProduction {
    /// Create a surround producer for a `width` x `height` footprint.
    #[must_use]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Cells bordering the footprint, clockwise from the top-left corner.
    #[must_use]
    pub fn ring(&self, origin: Cell) -> Vec<Cell> {
        let (left, top) = (origin.x - 1, origin.y - 1);
        let (right, bottom) = (origin.x + self.width.max(1), origin.y + self.height.max(1));

        let mut cells = Vec::new();
        cells.extend((left..=right).map(|x| Cell::new(x, top)));
        cells.extend((top + 1..=bottom).map(|y| Cell::new(right, y)));
        cells.extend((left..right).rev().map(|x| Cell::new(x, bottom)));
        cells.extend((top + 1..bottom).rev().map(|y| Cell::new(left, y)));
        cells
    }
}

impl Producer for SurroundProduction {
    fn produce(
        &mut self,
        site: &ProducerSite,
        _item: &ItemData,
        occupancy: &dyn Occupancy,
    ) -> Option<Cell> {
        self.ring(site.location)
            .into_iter()
            .find(|cell| !occupancy.is_occupied(*cell))
    }
}

/// A roster entry that could produce the requested item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProducerCandidate {
    /// Candidate actor.
    pub actor: ActorId,
    /// Flagged by the player as the preferred producer.
    pub is_primary: bool,
    /// Currently disabled (for example by low power).
    pub disabled: bool,
    /// Carries at least one [`Producer`] capability.
    pub has_production: bool,
}

/// Producer directory: who can build what, and the act of building it.
pub trait ProducerDirectory {
    /// Actors owned by `player` whose kind can produce `item`, in enumeration order.
    fn candidates(&self, player: PlayerId, item: &ItemData) -> Vec<ProducerCandidate>;

    /// Ask `producer` to materialize `item`. Returns `true` on success.
    fn try_produce(&mut self, producer: ActorId, item: &ItemData) -> bool;
}

/// Pick the producer for a completed item.
///
/// Usable primaries win; otherwise the first candidate is taken without
/// looking at its disabled flag.
#[must_use]
pub fn select_producer(candidates: &[ProducerCandidate]) -> Option<ActorId> {
    candidates
        .iter()
        .find(|c| c.has_production && c.is_primary && !c.disabled)
        .or_else(|| candidates.first())
        .map(|c| c.actor)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(actor: ActorId, is_primary: bool, disabled: bool) -> ProducerCandidate {
        ProducerCandidate {
            actor,
            is_primary,
            disabled,
            has_production: true,
        }
    }

    fn site() -> ProducerSite {
        ProducerSite {
            actor: 1,
            owner: 1,
            location: Cell::new(10, 10),
        }
    }

    fn rifleman() -> ItemData {
        ItemData::new("rifleman", "Infantry", 100)
    }

    #[test]
    fn test_select_prefers_primary() {
        let candidates = [
            candidate(1, false, false),
            candidate(2, true, false),
            candidate(3, true, false),
        ];
        assert_eq!(select_producer(&candidates), Some(2));
    }

    #[test]
    fn test_select_skips_disabled_primary() {
        let candidates = [
            candidate(1, false, false),
            candidate(2, true, true),
            candidate(3, true, false),
        ];
        assert_eq!(select_producer(&candidates), Some(3));
    }

    #[test]
    fn test_select_falls_back_ignoring_disabled() {
        // Only primary is disabled; first candidate wins even though it is disabled too
        let candidates = [candidate(4, false, true), candidate(5, true, true)];
        assert_eq!(select_producer(&candidates), Some(4));
    }

    #[test]
    fn test_select_fallback_takes_first_in_order() {
        let candidates = [candidate(7, false, false), candidate(8, false, false)];
        assert_eq!(select_producer(&candidates), Some(7));
    }

    #[test]
    fn test_select_primary_without_production_is_not_preferred() {
        let candidates = [
            candidate(1, false, false),
            ProducerCandidate {
                actor: 2,
                is_primary: true,
                disabled: false,
                has_production: false,
            },
        ];
        assert_eq!(select_producer(&candidates), Some(1));
    }

    #[test]
    fn test_select_none_without_candidates() {
        assert_eq!(select_producer(&[]), None);
    }

    #[test]
    fn test_exit_production_uses_first_free_exit() {
        let mut producer = ExitProduction::new(vec![Cell::new(0, 2), Cell::new(1, 2)]);
        let occupancy: OccupancyMap = [Cell::new(10, 12)].into_iter().collect();

        let cell = producer.produce(&site(), &rifleman(), &occupancy);
        assert_eq!(cell, Some(Cell::new(11, 12)));
    }

    #[test]
    fn test_exit_production_blocked() {
        let mut producer = ExitProduction::new(vec![Cell::new(0, 2)]);
        let occupancy: OccupancyMap = [Cell::new(10, 12)].into_iter().collect();

        assert_eq!(producer.produce(&site(), &rifleman(), &occupancy), None);
    }

    #[test]
    fn test_surround_ring_order() {
        let producer = SurroundProduction::new(1, 1);
        let ring = producer.ring(Cell::new(0, 0));

        assert_eq!(
            ring,
            vec![
                Cell::new(-1, -1),
                Cell::new(0, -1),
                Cell::new(1, -1),
                Cell::new(1, 0),
                Cell::new(1, 1),
                Cell::new(0, 1),
                Cell::new(-1, 1),
                Cell::new(-1, 0),
            ]
        );
    }

    #[test]
    fn test_surround_ring_size() {
        // 2x3 footprint has a 4x5 bounding box: 4*5 - 2*3 = 14 border cells
        let ring = SurroundProduction::new(2, 3).ring(Cell::ZERO);
        assert_eq!(ring.len(), 14);
        let unique: BTreeSet<Cell> = ring.iter().copied().collect();
        assert_eq!(unique.len(), 14);
    }

    #[test]
    fn test_surround_production_skips_occupied() {
        let mut producer = SurroundProduction::new(1, 1);
        let occupancy: OccupancyMap = [Cell::new(9, 9), Cell::new(10, 9)].into_iter().collect();

        let cell = producer.produce(&site(), &rifleman(), &occupancy);
        assert_eq!(cell, Some(Cell::new(11, 9)));
    }

    #[test]
    fn test_surround_production_fully_blocked() {
        let mut producer = SurroundProduction::new(1, 1);
        let occupancy: OccupancyMap = producer.ring(site().location).into_iter().collect();
        assert_eq!(producer.produce(&site(), &rifleman(), &occupancy), None);
    }
}
