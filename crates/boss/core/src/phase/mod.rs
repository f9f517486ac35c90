//! Health-threshold phases and timed transitions.
mod controller;
mod definition;

pub use controller::PhaseController;
pub use definition::{PhaseDefinition, PhaseTable};
