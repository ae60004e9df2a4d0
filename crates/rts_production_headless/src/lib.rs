//! Headless scenario runner for CI verification and balance checks.
//!
//! This crate loads a RON scenario, builds a production [`World`] from it,
//! applies a script of timed actions and reports the outcome as JSON. This
//! enables:
//!
//! - **CI verification**: Production rules and scheduling stay deterministic
//! - **Balance checks**: Compare build timings and spend across rule tweaks
//! - **Data validation**: Reject broken rules files before they ship
//!
//! # Example
//!
//! ```bash
//! # Run a scenario for its default length
//! cargo run -p rts_production_headless -- run --scenario scenarios/skirmish.ron
//!
//! # Write the report and a binary snapshot
//! cargo run -p rts_production_headless -- run --scenario scenarios/skirmish.ron \
//!     --ticks 3000 --output report.json --snapshot world.bin
//!
//! # Validate a rules file
//! cargo run -p rts_production_headless -- validate --rules data/rules.ron
//! ```
//!
//! [`World`]: rts_production::world::World

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod report;
pub mod runner;
pub mod scenario;

pub use report::{PlayerReport, RunReport};
pub use runner::ScenarioRunner;
pub use scenario::{
    Action, ActorPlacement, PlayerSetup, ProducerSpec, Scenario, ScenarioError, ScriptedAction,
};
