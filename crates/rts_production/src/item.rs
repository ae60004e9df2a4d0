//! A single queued build job.
//!
//! An item converts cash and ticks into a finished unit or structure. Its
//! cost is amortized over its build time with floor division:
//!
//! ```text
//! cost_this_tick = remaining_cost / remaining_time
//! ```
//!
//! so the amount collected never exceeds the total cost. The shortfall of the
//! early ticks is made up by the final ticks, where `remaining_time` is small
//! and the division picks up the rest. An unpaid tick makes no progress, and
//! a paused or power-starved item simply waits.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::economy::{Economy, PowerState};
use crate::frame_end::FrameEndTasks;
use crate::math::{self, Fixed};

/// Completion hook, invoked on every tick once the item is done.
pub type CompletionCallback<W> = Box<dyn FnMut(&mut FrameEndTasks<W>)>;

/// What a single [`ProductionItem::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemTick {
    /// The item was already done; the completion hook fired again.
    Completed,
    /// Paused; nothing happened.
    Paused,
    /// Low power skipped this tick.
    PowerStalled,
    /// The economy could not pay for this tick; nothing changed.
    Unpaid,
    /// One tick of progress was paid for and applied.
    Progressed {
        /// Cash withdrawn this tick (may be zero).
        paid: i32,
        /// Whether this tick finished the item.
        finished: bool,
    },
}

/// One in-flight build order.
pub struct ProductionItem<W> {
    item: String,
    total_time: i32,
    total_cost: i32,
    remaining_time: i32,
    remaining_cost: i32,
    paused: bool,
    done: bool,
    slowdown: i32,
    on_complete: Option<CompletionCallback<W>>,
}

impl<W> fmt::Debug for ProductionItem<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProductionItem")
            .field("item", &self.item)
            .field("total_time", &self.total_time)
            .field("total_cost", &self.total_cost)
            .field("remaining_time", &self.remaining_time)
            .field("remaining_cost", &self.remaining_cost)
            .field("paused", &self.paused)
            .field("done", &self.done)
            .field("has_on_complete", &self.on_complete.is_some())
            .finish()
    }
}

impl<W> ProductionItem<W> {
    /// Create a new item. Build times below one tick are clamped to one.
    #[must_use]
    pub fn new(item: impl Into<String>, time: i32, cost: i32) -> Self {
        let time = time.max(1);
        Self {
            item: item.into(),
            total_time: time,
            total_cost: cost,
            remaining_time: time,
            remaining_cost: cost,
            paused: false,
            done: false,
            slowdown: 0,
            on_complete: None,
        }
    }

    /// Attach the completion hook.
    #[must_use]
    pub fn with_on_complete(mut self, callback: CompletionCallback<W>) -> Self {
        self.on_complete = Some(callback);
        self
    }

    /// Item type being built.
    #[must_use]
    pub fn item(&self) -> &str {
        &self.item
    }

    /// Build time snapshot taken at enqueue, in ticks.
    #[must_use]
    pub const fn total_time(&self) -> i32 {
        self.total_time
    }

    /// Cost snapshot taken at enqueue.
    #[must_use]
    pub const fn total_cost(&self) -> i32 {
        self.total_cost
    }

    /// Ticks of paid progress still needed.
    #[must_use]
    pub const fn remaining_time(&self) -> i32 {
        self.remaining_time
    }

    /// Cash still to be collected.
    #[must_use]
    pub const fn remaining_cost(&self) -> i32 {
        self.remaining_cost
    }

    /// Cash collected so far; this is what a cancellation refunds.
    #[must_use]
    pub const fn amount_paid(&self) -> i32 {
        self.total_cost - self.remaining_cost
    }

    /// Whether the item is paused.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Pause or resume the item.
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Whether all build time has elapsed.
    #[must_use]
    pub const fn is_done(&self) -> bool {
        self.done
    }

    /// Fraction of build time elapsed, in `[0, 1]`.
    #[must_use]
    pub fn progress(&self) -> Fixed {
        math::ratio(self.total_time - self.remaining_time, self.total_time)
    }

    /// Progress as a percentage (0-100).
    #[must_use]
    pub fn percentage(&self) -> u32 {
        math::percentage(self.total_time - self.remaining_time, self.total_time)
    }

    /// Advance this item by one simulation tick.
    ///
    /// Once done, every call re-fires the completion hook until the item is
    /// removed from its queue; the hook must tolerate repeated calls.
    pub fn tick(
        &mut self,
        economy: &mut dyn Economy,
        low_power_slowdown: i32,
        tasks: &mut FrameEndTasks<W>,
    ) -> ItemTick {
        if self.done {
            if let Some(on_complete) = self.on_complete.as_mut() {
                on_complete(tasks);
            }
            return ItemTick::Completed;
        }

        if self.paused {
            return ItemTick::Paused;
        }

        if economy.power_state() != PowerState::Normal {
            self.slowdown -= 1;
            if self.slowdown <= 0 {
                self.slowdown = low_power_slowdown;
            } else {
                tracing::trace!(item = %self.item, slowdown = self.slowdown, "Low power stall");
                return ItemTick::PowerStalled;
            }
        }

        let cost_this_tick = self.remaining_cost / self.remaining_time;
        if cost_this_tick != 0 && !economy.take_cash(cost_this_tick) {
            tracing::trace!(item = %self.item, cost = cost_this_tick, "Insufficient funds");
            return ItemTick::Unpaid;
        }

        self.remaining_cost -= cost_this_tick;
        self.remaining_time -= 1;
        if self.remaining_time == 0 {
            self.done = true;
        }

        ItemTick::Progressed {
            paid: cost_this_tick,
            finished: self.done,
        }
    }

    /// Plain-data view of this item.
    #[must_use]
    pub fn snapshot(&self) -> ItemSnapshot {
        ItemSnapshot {
            item: self.item.clone(),
            total_time: self.total_time,
            total_cost: self.total_cost,
            remaining_time: self.remaining_time,
            remaining_cost: self.remaining_cost,
            paused: self.paused,
            done: self.done,
            slowdown: self.slowdown,
        }
    }
}

/// Serializable state of a [`ProductionItem`], without its hook.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemSnapshot {
    /// Item type.
    pub item: String,
    /// Build time at enqueue.
    pub total_time: i32,
    /// Cost at enqueue.
    pub total_cost: i32,
    /// Remaining ticks.
    pub remaining_time: i32,
    /// Remaining cost.
    pub remaining_cost: i32,
    /// Paused flag.
    pub paused: bool,
    /// Done flag.
    pub done: bool,
    /// Low-power slowdown counter.
    pub slowdown: i32,
}
