//! Headless host for boss encounters.
//!
//! Provides a geometric [`arena::ArenaOracle`], RON-scripted
//! [`scenario::Scenario`]s and the fixed-step [`runner::Simulation`] loop
//! used by the `boss-sim` binary.

pub mod arena;
pub mod runner;
pub mod scenario;

pub use arena::{ArenaOracle, ArenaSpec, Pillar};
pub use runner::{Simulation, Summary, TargetSummary};
pub use scenario::{Scenario, ScriptedHit, ScriptedStun, ScriptedTarget, TargetAttack, Waypoint};
