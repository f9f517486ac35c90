//! Single-slot execution pipeline: Cast → Perform → Cooldown.
//!
//! Each stage is an explicit state advanced by elapsed time, so an execution
//! can span any number of ticks without suspending. The pipeline knows nothing
//! about cooldown timers; a finished perform hands the execution back to the
//! catalog, which starts the cooldown and frees the slot in the same tick.

use super::definition::{AbilityDefinition, AbilityId};
use super::perform::{AbilityTarget, PerformContext, PerformState, PerformStatus, perform_step};
use crate::events::EventQueue;

/// Observable stage of the in-flight execution. The cooldown stage is
/// tracked by the catalog once the slot is free.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExecutionStage {
    Cast,
    Perform,
}

#[derive(Clone, Debug, PartialEq)]
enum Stage {
    Casting { elapsed: f32 },
    Performing(PerformState),
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Execution {
    pub slot: usize,
    pub ability: AbilityId,
    pub target: AbilityTarget,
    stage: Stage,
}

impl Execution {
    pub fn stage(&self) -> ExecutionStage {
        match self.stage {
            Stage::Casting { .. } => ExecutionStage::Cast,
            Stage::Performing(_) => ExecutionStage::Perform,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct ExecutionPipeline {
    current: Option<Execution>,
}

impl ExecutionPipeline {
    pub fn is_busy(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&self) -> Option<&Execution> {
        self.current.as_ref()
    }

    pub fn begin(&mut self, slot: usize, ability: AbilityId, target: AbilityTarget) {
        debug_assert!(self.current.is_none(), "pipeline already busy");
        self.current = Some(Execution {
            slot,
            ability,
            target,
            stage: Stage::Casting { elapsed: 0.0 },
        });
    }

    /// Drops the in-flight execution without completing it.
    pub fn cancel(&mut self) -> Option<Execution> {
        self.current.take()
    }

    /// Advances the in-flight execution by `dt`.
    ///
    /// Returns the execution once its perform stage finishes. Time left
    /// over after the cast carries into the perform stage of the same tick.
    pub fn advance(
        &mut self,
        dt: f32,
        definition: &AbilityDefinition,
        ctx: &mut PerformContext<'_>,
        events: &mut EventQueue,
    ) -> Option<Execution> {
        let execution = self.current.as_mut()?;
        let mut remaining = dt;

        if let Stage::Casting { elapsed } = &mut execution.stage {
            *elapsed += remaining;
            if *elapsed < definition.cast_time {
                return None;
            }
            remaining = *elapsed - definition.cast_time;
            tracing::debug!("{} cast complete, performing", execution.ability);
            execution.stage = Stage::Performing(PerformState::default());
        }

        if let Stage::Performing(state) = &mut execution.stage {
            let status = perform_step(
                definition,
                &execution.target,
                state,
                remaining,
                ctx,
                events,
            );
            if status == PerformStatus::Continue {
                return None;
            }
        }

        self.current.take()
    }
}
