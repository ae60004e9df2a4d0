//! Determinism testing utilities.
//!
//! Provides a harness for verifying that the production world
//! produces identical results given identical inputs.
//!
//! # Testing Strategy
//!
//! Production must be 100% deterministic for lockstep multiplayer.
//! Sources of non-determinism include:
//!
//! - **Floating-point math**: Costs and build times use integer arithmetic.
//!   Only progress ratios are fixed-point, via [`rts_production::math::Fixed`].
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   Queues, categories and actors live in `BTreeMap`s.
//!
//! - **Deferred work**: Frame-end tasks run strictly in registration order.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: Individual item and queue behavior
//! 2. **Property tests**: Random order scripts must still replay identically
//! 3. **Integration tests**: Full world scenarios are reproducible
//! 4. **Parallel tests**: Running N worlds on N threads all match

use std::thread;

use rts_production::world::{World, WorldSnapshot};

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of ticks simulated.
    pub ticks: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic world).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the world was deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "World is non-deterministic!\n\
                 Runs: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a simulation multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run the simulation
/// * `ticks` - Number of ticks to simulate per run
/// * `setup` - Function to create initial state
/// * `step` - Function to advance the state by one tick
/// * `hash` - Function to compute state hash
///
/// # Example
///
/// ```ignore
/// use rts_test_utils::determinism::verify_determinism;
///
/// let result = verify_determinism(
///     5,   // Run 5 times
///     100, // 100 ticks each
///     || setup_world(),
///     |world| { world.tick(); },
///     |world| world.state_hash(),
/// );
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    ticks: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..ticks {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        ticks,
    }
}

/// Simplified determinism verification for [`World`].
///
/// Runs the world twice with identical setup and verifies the final
/// state hashes match exactly.
pub fn verify_world_determinism<F>(setup_fn: F, num_ticks: u64) -> bool
where
    F: Fn() -> World,
{
    let result = verify_determinism(
        2,
        num_ticks,
        &setup_fn,
        |world| {
            world.tick();
        },
        World::state_hash,
    );
    result.is_deterministic
}

/// Run N worlds on scoped threads and collect final hashes.
///
/// Each world is built and run entirely on its own thread, so the world
/// itself never has to cross a thread boundary.
pub fn run_parallel_worlds<F>(setup_fn: F, num_worlds: usize, num_ticks: u64) -> DeterminismResult
where
    F: Fn() -> World + Sync,
{
    let hashes: Vec<u64> = thread::scope(|s| {
        let handles: Vec<_> = (0..num_worlds)
            .map(|_| {
                s.spawn(|| {
                    let mut world = setup_fn();
                    for _ in 0..num_ticks {
                        world.tick();
                    }
                    world.state_hash()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("world thread panicked"))
            .collect()
    });

    DeterminismResult {
        is_deterministic: hashes.windows(2).all(|w| w[0] == w[1]),
        hashes,
        ticks: num_ticks,
    }
}

/// Compare two world runs tick-by-tick, finding first divergence.
///
/// # Returns
///
/// `None` if the worlds stay identical, `Some(tick)` if they diverge
/// at that tick.
pub fn find_first_divergence<F>(setup_fn: F, num_ticks: u64) -> Option<u64>
where
    F: Fn() -> World,
{
    let mut world1 = setup_fn();
    let mut world2 = setup_fn();

    // Check initial state
    if world1.state_hash() != world2.state_hash() {
        return Some(0);
    }

    for tick in 1..=num_ticks {
        world1.tick();
        world2.tick();

        if world1.state_hash() != world2.state_hash() {
            tracing::warn!(tick, "Worlds diverged");
            return Some(tick);
        }
    }

    None
}

/// Verify that a snapshot round-trip through bincode preserves the state hash.
pub fn verify_snapshot_determinism<F>(setup_fn: F, num_ticks: u64) -> bool
where
    F: Fn() -> World,
{
    let mut world = setup_fn();

    for _ in 0..num_ticks {
        world.tick();
    }

    let hash_before = world.state_hash();

    let Ok(bytes) = world.snapshot().to_bytes() else {
        return false;
    };
    let Ok(restored) = WorldSnapshot::from_bytes(&bytes) else {
        return false;
    };

    hash_before == restored.state_hash()
}

/// Proptest strategies for determinism testing.
///
/// These strategies generate random but reproducible inputs for
/// property-based testing of production.
pub mod strategies {
    use proptest::prelude::*;
    use rts_production::components::ActorId;
    use rts_production::order::Order;

    use crate::fixtures::ScriptedOrder;

    /// Items of the standard rules that the standard base can queue.
    pub const STANDARD_ITEMS: [&str; 6] = [
        "rifleman",
        "engineer",
        "jeep",
        "light_tank",
        "power_plant",
        "barracks",
    ];

    /// Generate an item name, occasionally one no rules know.
    pub fn arb_item() -> impl Strategy<Value = String> {
        prop_oneof![
            9 => proptest::sample::select(STANDARD_ITEMS.to_vec()).prop_map(str::to_string),
            1 => Just("mammoth_tank".to_string()),
        ]
    }

    /// Generate any production order.
    pub fn arb_order() -> impl Strategy<Value = Order> {
        prop_oneof![
            4 => arb_item().prop_map(Order::start),
            1 => (arb_item(), any::<bool>()).prop_map(|(item, paused)| Order::pause(item, paused)),
            2 => arb_item().prop_map(Order::cancel),
        ]
    }

    /// Generate a script of orders for `owner` spread over `0..max_tick`.
    pub fn arb_order_script(
        owner: ActorId,
        max_len: usize,
        max_tick: u64,
    ) -> impl Strategy<Value = Vec<ScriptedOrder>> {
        proptest::collection::vec((0..max_tick, arb_order()), 0..max_len).prop_map(
            move |orders| {
                orders
                    .into_iter()
                    .map(|(tick, order)| ScriptedOrder { tick, owner, order })
                    .collect()
            },
        )
    }

    /// Generate item costs (0-5000).
    pub fn arb_cost() -> impl Strategy<Value = i32> {
        0i32..5000i32
    }

    /// Generate build times in ticks (1-2000).
    pub fn arb_build_time() -> impl Strategy<Value = i32> {
        1i32..2000i32
    }
}
