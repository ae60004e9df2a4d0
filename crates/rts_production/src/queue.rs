//! Per-owner production queues.
//!
//! A [`ProductionQueue`] holds one FIFO list per category. Only the head of
//! each list is ever ticked, so production inside a category is strictly
//! serial while categories run side by side, all drawing on the owner's
//! economy.
//!
//! Orders are resolved synchronously and never fail: an order that makes no
//! sense right now (unbuildable item, pause of something that is not at the
//! head, cancel on an empty queue) is dropped without a trace in the
//! simulation state.

use std::cell::Cell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::components::{ActorId, PlayerId};
use crate::economy::Economy;
use crate::frame_end::FrameEndTasks;
use crate::item::{ItemSnapshot, ItemTick, ProductionItem};
use crate::notification::Notification;
use crate::order::Order;
use crate::producer::{select_producer, ProducerDirectory};
use crate::rules::{Rules, TechTree};

/// The world-side handle a completed item's deferred task works against.
pub trait ProductionHost: 'static {
    /// Deliver a notification to `player`.
    fn notify(&mut self, player: PlayerId, notification: Notification);

    /// Materialize one finished `item` from the queue owned by `queue_owner`.
    fn build_unit(&mut self, queue_owner: ActorId, item: &str);
}

/// Production queues of a single owner, keyed by category.
#[derive(Debug)]
pub struct ProductionQueue<W> {
    owner: ActorId,
    player: PlayerId,
    rules: Arc<Rules>,
    production: BTreeMap<String, Vec<ProductionItem<W>>>,
}

impl<W> ProductionQueue<W> {
    /// Create an empty queue set for `owner`, drawing on `player`'s economy.
    #[must_use]
    pub fn new(owner: ActorId, player: PlayerId, rules: Arc<Rules>) -> Self {
        Self {
            owner,
            player,
            rules,
            production: BTreeMap::new(),
        }
    }

    /// Actor owning this queue.
    #[must_use]
    pub const fn owner(&self) -> ActorId {
        self.owner
    }

    /// Player whose economy pays for this queue.
    #[must_use]
    pub const fn player(&self) -> PlayerId {
        self.player
    }

    /// Rules this queue was built with.
    #[must_use]
    pub fn rules(&self) -> &Arc<Rules> {
        &self.rules
    }

    /// Item currently being built in `category`.
    #[must_use]
    pub fn current_item(&self, category: &str) -> Option<&ProductionItem<W>> {
        self.production.get(category).and_then(|queue| queue.first())
    }

    /// Every item queued in `category`, head first.
    #[must_use]
    pub fn all_items(&self, category: &str) -> &[ProductionItem<W>] {
        self.production
            .get(category)
            .map_or(&[][..], |queue| queue.as_slice())
    }

    /// Categories with at least one queued item.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.production.keys().map(String::as_str)
    }

    /// Total number of queued items across all categories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.production.values().map(Vec::len).sum()
    }

    /// Whether nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.production.is_empty()
    }

    /// Advance the head item of every category by one tick.
    pub fn tick(&mut self, economy: &mut dyn Economy, tasks: &mut FrameEndTasks<W>) {
        let slowdown = self.rules.general().low_power_slowdown;
        for (category, queue) in &mut self.production {
            let Some(head) = queue.first_mut() else {
                continue;
            };
            if let ItemTick::Progressed { finished: true, .. } = head.tick(economy, slowdown, tasks)
            {
                tracing::info!(
                    owner = self.owner,
                    category = %category,
                    item = %head.item(),
                    "Production complete"
                );
            }
        }
    }

    /// Append an item to the end of `category`.
    pub fn begin_production(&mut self, category: &str, item: ProductionItem<W>) {
        self.production
            .entry(category.to_string())
            .or_default()
            .push(item);
    }

    /// Remove the head of `category`. No-op when the category is empty.
    pub fn finish_production(&mut self, category: &str) {
        let Some(queue) = self.production.get_mut(category) else {
            return;
        };
        if !queue.is_empty() {
            queue.remove(0);
        }
        if queue.is_empty() {
            self.production.remove(category);
        }
    }

    /// Pause or resume the head of `item`'s category, if the head is `item`.
    pub fn pause_production(&mut self, item: &str, paused: bool) {
        let Some(category) = self.rules.category_of(item) else {
            return;
        };
        if let Some(head) = self
            .production
            .get_mut(category)
            .and_then(|queue| queue.first_mut())
        {
            if head.item() == item {
                head.set_paused(paused);
            }
        }
    }

    /// Cancel one `item`.
    ///
    /// The last queued match is removed when it sits behind the head; it has
    /// not been paid for, so there is no refund. Otherwise the head of the
    /// category is dropped and everything paid for it is refunded.
    pub fn cancel_production(&mut self, item: &str, economy: &mut dyn Economy) {
        let rules = Arc::clone(&self.rules);
        let Some(category) = rules.category_of(item) else {
            return;
        };
        let Some(queue) = self.production.get_mut(category) else {
            return;
        };
        if queue.is_empty() {
            return;
        }

        match queue.iter().rposition(|queued| queued.item() == item) {
            Some(index) if index > 0 => {
                queue.remove(index);
                tracing::debug!(owner = self.owner, item, index, "Cancelled queued item");
            }
            _ => self.refund_head(category, economy),
        }
    }

    /// Refund what the head of `category` has cost so far and drop it.
    fn refund_head(&mut self, category: &str, economy: &mut dyn Economy) {
        let Some(head) = self.current_item(category) else {
            return;
        };
        let refund = head.amount_paid();
        tracing::debug!(
            owner = self.owner,
            category,
            item = %head.item(),
            refund,
            "Cancelled active item"
        );
        economy.give_cash(refund);
        self.finish_production(category);
    }

    /// Remove the head of `item`'s category if it is a finished `item`.
    ///
    /// Used when a completed structure is placed. Returns whether the head
    /// was removed.
    pub fn take_completed(&mut self, item: &str) -> bool {
        let rules = Arc::clone(&self.rules);
        let Some(category) = rules.category_of(item) else {
            return false;
        };
        let ready = self
            .current_item(category)
            .is_some_and(|head| head.is_done() && head.item() == item);
        if ready {
            self.finish_production(category);
        }
        ready
    }

    /// Hand a finished `item` to a producer.
    ///
    /// With no producer at all the item cannot ever be delivered, so the head
    /// of its category is cancelled with a refund. If the chosen producer
    /// cannot place the unit the item stays finished at the head and the next
    /// completion callback tries again.
    pub fn build_unit(
        &mut self,
        item: &str,
        directory: &mut dyn ProducerDirectory,
        economy: &mut dyn Economy,
    ) {
        let rules = Arc::clone(&self.rules);
        let Some(data) = rules.item(item) else {
            return;
        };

        let candidates = directory.candidates(self.player, data);
        let Some(producer) = select_producer(&candidates) else {
            tracing::warn!(
                owner = self.owner,
                item,
                "No producer for completed item, cancelling"
            );
            self.refund_head(&data.category, economy);
            return;
        };

        if directory.try_produce(producer, data) {
            self.finish_production(&data.category);
        } else {
            tracing::trace!(owner = self.owner, item, producer, "Producer blocked");
        }
    }

    /// Plain-data view of every category.
    #[must_use]
    pub fn snapshot(&self) -> QueueSnapshot {
        QueueSnapshot {
            owner: self.owner,
            player: self.player,
            categories: self
                .production
                .iter()
                .map(|(category, queue)| {
                    (
                        category.clone(),
                        queue.iter().map(ProductionItem::snapshot).collect(),
                    )
                })
                .collect(),
        }
    }
}

impl<W: ProductionHost> ProductionQueue<W> {
    /// Apply a player order. Invalid orders are silently ignored.
    pub fn resolve_order(
        &mut self,
        order: &Order,
        tech: &dyn TechTree,
        economy: &mut dyn Economy,
    ) {
        match order {
            Order::StartProduction { item } => self.start_production(item, tech),
            Order::PauseProduction { item, paused } => self.pause_production(item, *paused),
            Order::CancelProduction { item } => self.cancel_production(item, economy),
        }
    }

    /// Queue one `item` if the tech tree allows it.
    pub fn start_production(&mut self, item: &str, tech: &dyn TechTree) {
        let rules = Arc::clone(&self.rules);
        let Some(data) = rules.item(item) else {
            tracing::debug!(owner = self.owner, item, "Unknown item, order ignored");
            return;
        };
        if !tech.can_build(self.player, data) {
            tracing::debug!(owner = self.owner, item, "Item not buildable, order ignored");
            return;
        }

        let time = rules.build_time(data);
        let production = ProductionItem::new(item, time, data.cost)
            .with_on_complete(self.completion_callback(item, data.is_structure));
        tracing::debug!(
            owner = self.owner,
            category = %data.category,
            item,
            time,
            cost = data.cost,
            "Production queued"
        );
        self.begin_production(&data.category, production);
    }

    /// Deferred completion handling for one item.
    ///
    /// The announcement is guarded by a latch shared by every task this
    /// callback schedules, so it fires once even though the callback runs on
    /// every tick until the item leaves the queue.
    fn completion_callback(
        &self,
        item: &str,
        is_structure: bool,
    ) -> Box<dyn FnMut(&mut FrameEndTasks<W>)> {
        let owner = self.owner;
        let player = self.player;
        let item = item.to_string();
        let announced = Rc::new(Cell::new(false));

        Box::new(move |tasks: &mut FrameEndTasks<W>| {
            let announced = Rc::clone(&announced);
            let item = item.clone();
            tasks.schedule(move |host: &mut W| {
                if !announced.replace(true) {
                    host.notify(player, Notification::completed(item.as_str(), is_structure));
                }
                if !is_structure {
                    host.build_unit(owner, &item);
                }
            });
        })
    }
}

/// Serializable state of a [`ProductionQueue`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueueSnapshot {
    /// Queue owner.
    pub owner: ActorId,
    /// Paying player.
    pub player: PlayerId,
    /// Items per category, head first.
    pub categories: BTreeMap<String, Vec<ItemSnapshot>>,
}
