//! End-to-end production scenarios.
//!
//! These drive items, queues and whole worlds through the public API and
//! check the accounting and scheduling rules that must hold on every replica.

use proptest::prelude::*;
use rts_test_utils::determinism::strategies::{arb_build_time, arb_cost};
use rts_test_utils::fixtures::{fraction, run_script, standard_rules, BasePlan, ScriptedOrder};

use rts_production::components::Cell;
use rts_production::economy::{Economy, PlayerEconomy, PowerState};
use rts_production::frame_end::FrameEndTasks;
use rts_production::item::{ItemTick, ProductionItem};
use rts_production::notification::Notification;
use rts_production::order::Order;
use rts_production::roster::ActorSpawnParams;
use rts_production::world::World;

type Item = ProductionItem<()>;

/// Economy with a fixed power state.
struct FixedPower {
    cash: i32,
    power: PowerState,
}

impl Economy for FixedPower {
    fn take_cash(&mut self, amount: i32) -> bool {
        if self.cash >= amount {
            self.cash -= amount;
            true
        } else {
            false
        }
    }

    fn give_cash(&mut self, amount: i32) {
        self.cash += amount;
    }

    fn power_state(&self) -> PowerState {
        self.power
    }
}

fn tick_item(item: &mut Item, economy: &mut dyn Economy) -> ItemTick {
    let mut tasks = FrameEndTasks::new();
    item.tick(economy, 3, &mut tasks)
}

// =============================================================================
// Item accounting
// =============================================================================

#[test]
fn test_item_cost_1000_over_100_ticks() {
    let mut item = Item::new("heavy_tank", 100, 1000);
    let mut economy = PlayerEconomy::new(5000);

    for _ in 0..100 {
        tick_item(&mut item, &mut economy);
    }

    assert!(item.is_done());
    assert_eq!(item.remaining_cost(), 0);
    assert_eq!(economy.cash, 4000);
    assert_eq!(item.progress(), fraction(1, 1));
}

#[test]
fn test_item_insufficient_funds_is_retryable() {
    // 500 over 100 ticks is 5 per tick
    let mut item = Item::new("jeep", 100, 500);
    let mut economy = PlayerEconomy::new(4);

    assert_eq!(tick_item(&mut item, &mut economy), ItemTick::Unpaid);
    assert_eq!(item.remaining_time(), 100);
    assert_eq!(item.remaining_cost(), 500);
    assert_eq!(economy.cash, 4);

    economy.give_cash(1);
    assert_eq!(
        tick_item(&mut item, &mut economy),
        ItemTick::Progressed {
            paid: 5,
            finished: false
        }
    );
    assert_eq!(item.remaining_time(), 99);
    assert_eq!(economy.cash, 0);
}

#[test]
fn test_item_pause_and_resume_is_exact() {
    let mut item = Item::new("jeep", 100, 500);
    let mut economy = PlayerEconomy::new(10_000);

    for _ in 0..10 {
        tick_item(&mut item, &mut economy);
    }
    item.set_paused(true);
    for _ in 0..50 {
        assert_eq!(tick_item(&mut item, &mut economy), ItemTick::Paused);
    }
    assert_eq!(item.remaining_time(), 90);
    assert_eq!(economy.cash, 9950);

    item.set_paused(false);
    for _ in 0..90 {
        tick_item(&mut item, &mut economy);
    }
    assert!(item.is_done());
    assert_eq!(economy.cash, 9500);
}

#[test]
fn test_item_low_power_cadence() {
    let mut item = Item::new("jeep", 100, 0);
    let mut economy = FixedPower {
        cash: 0,
        power: PowerState::Low,
    };

    let progressed: Vec<bool> = (0..9)
        .map(|_| matches!(tick_item(&mut item, &mut economy), ItemTick::Progressed { .. }))
        .collect();
    assert_eq!(
        progressed,
        vec![true, false, false, true, false, false, true, false, false]
    );

    // Normal cadence resumes on the first tick that observes normal power
    economy.power = PowerState::Normal;
    let before = item.remaining_time();
    tick_item(&mut item, &mut economy);
    tick_item(&mut item, &mut economy);
    assert_eq!(item.remaining_time(), before - 2);
}

// =============================================================================
// Queue scenarios through the world
// =============================================================================

#[test]
fn test_cancel_duplicate_leaves_head_untouched() {
    let mut world = World::new(standard_rules());
    let base = BasePlan::new(1).build(&mut world).unwrap();

    world.issue_order(base.yard, Order::start("rifleman")).unwrap();
    world.issue_order(base.yard, Order::start("rifleman")).unwrap();
    for _ in 0..50 {
        world.tick();
    }
    let cash = world.economy(1).unwrap().cash;

    world.issue_order(base.yard, Order::cancel("rifleman")).unwrap();

    let queue = world.queue(base.yard).unwrap();
    assert_eq!(queue.all_items("Infantry").len(), 1);
    assert_eq!(queue.current_item("Infantry").unwrap().remaining_time(), 70);
    assert_eq!(world.economy(1).unwrap().cash, cash);
}

#[test]
fn test_cancel_head_refunds_everything_paid() {
    let mut world = World::new(standard_rules());
    let base = BasePlan::new(1).build(&mut world).unwrap();

    world.issue_order(base.yard, Order::start("jeep")).unwrap();
    for _ in 0..300 {
        world.tick();
    }
    assert!(world.economy(1).unwrap().cash < 10_000);

    world.issue_order(base.yard, Order::cancel("jeep")).unwrap();
    assert_eq!(world.economy(1).unwrap().cash, 10_000);
    assert!(world.queue(base.yard).unwrap().is_empty());
}

#[test]
fn test_categories_progress_in_parallel() {
    let mut world = World::new(standard_rules());
    let base = BasePlan::new(1).build(&mut world).unwrap();

    world.issue_order(base.yard, Order::start("rifleman")).unwrap();
    world.issue_order(base.yard, Order::start("jeep")).unwrap();
    for _ in 0..60 {
        world.tick();
    }

    let queue = world.queue(base.yard).unwrap();
    let categories: Vec<&str> = queue.categories().collect();
    assert_eq!(categories, vec!["Infantry", "Vehicle"]);
    assert_eq!(queue.current_item("Infantry").unwrap().percentage(), 50);
    assert_eq!(queue.current_item("Vehicle").unwrap().remaining_time(), 660);
}

#[test]
fn test_units_trickle_out_in_order() {
    let mut world = World::new(standard_rules());
    let base = BasePlan::new(1).build(&mut world).unwrap();

    for _ in 0..3 {
        world.issue_order(base.yard, Order::start("rifleman")).unwrap();
    }
    let spawned: Vec<_> = (0..400).flat_map(|_| world.tick().spawned).collect();

    assert_eq!(spawned.len(), 3);
    let cells: Vec<Cell> = spawned
        .iter()
        .map(|id| world.roster().get(*id).unwrap().location)
        .collect();
    // Two exits first, then the ring around the 2x2 barracks at (58, 0)
    assert_eq!(
        cells,
        vec![Cell::new(58, 2), Cell::new(59, 2), Cell::new(57, -1)]
    );
    assert_eq!(world.economy(1).unwrap().cash, 9700);
}

#[test]
fn test_disabled_primary_falls_back_to_first_producer() {
    let mut world = World::new(standard_rules());
    let base = BasePlan::new(1).build(&mut world).unwrap();
    let first = base.barracks.unwrap();

    let second = world
        .spawn_actor(
            ActorSpawnParams::new(1, "barracks", Cell::new(80, 0))
                .with_producer(rts_production::producer::SurroundProduction::new(2, 2)),
        )
        .unwrap();
    world.set_primary(second).unwrap();
    world.set_disabled(second, true).unwrap();
    world.set_disabled(first, true).unwrap();

    world.issue_order(base.yard, Order::start("rifleman")).unwrap();
    let spawned: Vec<_> = (0..121).flat_map(|_| world.tick().spawned).collect();

    assert_eq!(spawned.len(), 1);
    let producer = world
        .notifications()
        .iter()
        .find_map(|n| match n.notification {
            Notification::UnitSpawned { producer, .. } => Some(producer),
            _ => None,
        })
        .unwrap();
    assert_eq!(producer, first);
}

#[test]
fn test_enabled_primary_wins() {
    let mut world = World::new(standard_rules());
    let base = BasePlan::new(1).build(&mut world).unwrap();
    let second = world
        .spawn_actor(
            ActorSpawnParams::new(1, "barracks", Cell::new(80, 0))
                .with_producer(rts_production::producer::SurroundProduction::new(2, 2)),
        )
        .unwrap();
    world.set_primary(second).unwrap();

    world.issue_order(base.yard, Order::start("rifleman")).unwrap();
    let spawned: Vec<_> = (0..121).flat_map(|_| world.tick().spawned).collect();

    let unit = world.roster().get(spawned[0]).unwrap();
    assert_eq!(unit.location, Cell::new(79, -1));
}

#[test]
fn test_tech_tree_gates_orders() {
    let mut world = World::new(standard_rules());
    let base = BasePlan::new(1)
        .without_war_factory()
        .build(&mut world)
        .unwrap();

    world.issue_order(base.yard, Order::start("light_tank")).unwrap();
    world.issue_order(base.yard, Order::start("jeep")).unwrap();
    assert!(world.queue(base.yard).unwrap().is_empty());

    world.issue_order(base.yard, Order::start("war_factory")).unwrap();
    assert_eq!(
        world.queue(base.yard).unwrap().current_item("Building").unwrap().item(),
        "war_factory"
    );
}

#[test]
fn test_structure_lifecycle() {
    let mut world = World::new(standard_rules());
    let base = BasePlan::new(1)
        .without_war_factory()
        .build(&mut world)
        .unwrap();

    world.issue_order(base.yard, Order::start("power_plant")).unwrap();
    for _ in 0..400 {
        world.tick();
    }

    let announcements: Vec<_> = world
        .notifications()
        .iter()
        .filter(|n| matches!(n.notification, Notification::StructureComplete { .. }))
        .collect();
    assert_eq!(announcements.len(), 1);
    assert_eq!(announcements[0].tick, 360);

    let placed = world
        .place_structure(
            base.yard,
            ActorSpawnParams::new(1, "power_plant", Cell::new(60, 10)),
        )
        .unwrap();
    assert!(placed.is_some());

    world.tick();
    assert_eq!(world.economy(1).unwrap().power_provided, 200);
}

#[test]
fn test_low_power_world_is_three_times_slower() {
    let mut world = World::new(standard_rules());
    let base = BasePlan::new(1).without_power().build(&mut world).unwrap();

    world.issue_order(base.yard, Order::start("rifleman")).unwrap();
    let ticks = (1..)
        .find(|_| world.tick().spawned.len() == 1)
        .unwrap();

    // 120 progress ticks at one per 3, then one tick to hand it out
    assert_eq!(ticks, 359);
    assert_eq!(
        world.economy(1).unwrap().power_state(),
        PowerState::Critical
    );
}

#[test]
fn test_scripted_replay_matches() {
    let setup = || {
        let mut world = World::new(standard_rules());
        let base = BasePlan::new(1).build(&mut world).unwrap();
        (world, base.yard)
    };
    let (mut first, yard) = setup();
    let (mut second, _) = setup();

    let script = vec![
        ScriptedOrder {
            tick: 0,
            owner: yard,
            order: Order::start("jeep"),
        },
        ScriptedOrder {
            tick: 10,
            owner: yard,
            order: Order::pause("jeep", true),
        },
        ScriptedOrder {
            tick: 40,
            owner: yard,
            order: Order::pause("jeep", false),
        },
        ScriptedOrder {
            tick: 50,
            owner: yard,
            order: Order::start("rifleman"),
        },
    ];
    run_script(&mut first, &script, 800);
    run_script(&mut second, &script, 800);

    assert_eq!(first.state_hash(), second.state_hash());
    assert_eq!(first.notifications(), second.notifications());
    // 720 + 30 paused ticks, then handed out one tick later
    assert!(first
        .notifications()
        .iter()
        .any(|n| n.tick == 750 && matches!(n.notification, Notification::UnitReady { .. })));
}

// =============================================================================
// Item invariants
// =============================================================================

proptest! {
    /// Cost is fully collected exactly when the item finishes.
    #[test]
    fn prop_item_collects_total_cost(cost in arb_cost(), time in arb_build_time()) {
        let mut item = Item::new("item", time, cost);
        let mut economy = PlayerEconomy::new(i32::MAX);
        let mut last_cost = item.remaining_cost();

        for _ in 0..time {
            prop_assert!(!item.is_done());
            tick_item(&mut item, &mut economy);
            prop_assert!(item.remaining_cost() <= last_cost);
            last_cost = item.remaining_cost();
        }

        prop_assert!(item.is_done());
        prop_assert_eq!(item.remaining_time(), 0);
        prop_assert_eq!(item.remaining_cost(), 0);
        prop_assert_eq!(i32::MAX - economy.cash, cost);
    }

    /// Refund on cancel equals what was withdrawn, wherever the item stands.
    #[test]
    fn prop_amount_paid_matches_withdrawn(
        cost in arb_cost(),
        time in arb_build_time(),
        ticks in 0i32..2000,
    ) {
        let mut item = Item::new("item", time, cost);
        let mut economy = PlayerEconomy::new(1_000_000);

        for _ in 0..ticks.min(time) {
            tick_item(&mut item, &mut economy);
        }

        prop_assert_eq!(item.amount_paid(), 1_000_000 - economy.cash);
        prop_assert_eq!(item.is_done(), item.remaining_time() == 0);
    }
}
