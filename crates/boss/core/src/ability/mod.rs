//! Ability catalog and execution pipeline.
mod catalog;
mod definition;
mod perform;
mod pipeline;

pub use catalog::{AbilityCatalog, QueuedRequest, RequestOutcome};
pub use definition::{AbilityDefinition, AbilityId, AbilityKind, TargetKind};
pub use perform::{AbilityTarget, PerformContext};
pub use pipeline::ExecutionStage;
