//! Utility AI: perception, candidate scoring, selection and action execution.
//!
//! The flow for one decision step:
//!
//! 1. [`Perception`] refreshes target, line of sight and lost time
//! 2. [`scoring`] generates candidates in a fixed order
//! 3. [`DecisionSelector`] picks the strict maximum (first wins ties)
//! 4. The winner becomes a [`QueuedAction`] run by the executor
mod engine;
mod executor;
mod perception;
pub mod scoring;
mod selector;
mod types;

pub use engine::{DecisionEngine, EngineContext};
pub use perception::Perception;
pub use scoring::{Candidates, ScoringContext};
pub use selector::DecisionSelector;
pub use types::{ActionKind, AiState, Decision, DecisionKind, QueuedAction};
