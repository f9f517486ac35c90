//! Ability catalog: definitions, cooldowns, phase gating and the request queue.
//!
//! The catalog owns one [`AbilityRuntime`] per definition and the single-slot
//! [`ExecutionPipeline`]. Requests that cannot start right now are queued in
//! FIFO order and drained by [`AbilityCatalog::tick`] once the pipeline is idle
//! and the global cooldown has elapsed.
//!
//! ## Availability
//!
//! `can_use` is false when:
//! - the id is unknown
//! - the current phase does not allow the ability
//! - the pipeline is suspended by a phase transition
//! - the ability's own cooldown is running
//! - the global cooldown has not elapsed since the last completion
//! - another ability is executing
//!
//! The first three are request errors; the rest are transient and queue.

use std::collections::{HashMap, VecDeque};

use super::definition::{AbilityDefinition, AbilityId};
use super::perform::{AbilityTarget, PerformContext};
use super::pipeline::{ExecutionPipeline, ExecutionStage};
use crate::error::{ConfigError, RequestError};
use crate::events::{BossEvent, EventQueue};

/// Mutable per-ability state.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct AbilityRuntime {
    cooldown_remaining: f32,
    allowed: bool,
}

/// A request waiting for the pipeline.
#[derive(Clone, Debug, PartialEq)]
pub struct QueuedRequest {
    pub ability: AbilityId,
    pub target: AbilityTarget,
    pub enqueued_at: f32,
}

/// Result of an accepted request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestOutcome {
    Started,
    Queued,
}

/// Why an allowed, known ability cannot start this instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Unavailable {
    OnCooldown,
    GlobalCooldown,
    Busy,
}

#[derive(Clone, Debug)]
pub struct AbilityCatalog {
    definitions: Vec<AbilityDefinition>,
    slots: HashMap<AbilityId, usize>,
    runtimes: Vec<AbilityRuntime>,
    cooldown_multiplier: f32,
    global_cooldown: f32,
    queued_request_timeout: f32,
    clock: f32,
    last_ability_time: Option<f32>,
    suspended: bool,
    pipeline: ExecutionPipeline,
    queue: VecDeque<QueuedRequest>,
}

impl AbilityCatalog {
    /// Builds the catalog. Every ability starts ready and disallowed until a
    /// phase set is applied.
    pub fn new(
        definitions: Vec<AbilityDefinition>,
        global_cooldown: f32,
        queued_request_timeout: f32,
    ) -> Result<Self, ConfigError> {
        let mut slots = HashMap::with_capacity(definitions.len());
        for (slot, def) in definitions.iter().enumerate() {
            def.validate()?;
            if slots.insert(def.id.clone(), slot).is_some() {
                return Err(ConfigError::DuplicateAbility(def.id.clone()));
            }
        }

        Ok(Self {
            runtimes: vec![AbilityRuntime::default(); definitions.len()],
            definitions,
            slots,
            cooldown_multiplier: 1.0,
            global_cooldown,
            queued_request_timeout,
            clock: 0.0,
            last_ability_time: None,
            suspended: false,
            pipeline: ExecutionPipeline::default(),
            queue: VecDeque::new(),
        })
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn contains(&self, id: &str) -> bool {
        self.slots.contains_key(id)
    }

    pub fn definition(&self, id: &str) -> Option<&AbilityDefinition> {
        self.slots.get(id).map(|&slot| &self.definitions[slot])
    }

    pub fn definitions(&self) -> &[AbilityDefinition] {
        &self.definitions
    }

    /// Definitions the current phase allows, in catalog order.
    pub fn allowed(&self) -> impl Iterator<Item = &AbilityDefinition> {
        self.definitions
            .iter()
            .zip(&self.runtimes)
            .filter(|(_, rt)| rt.allowed)
            .map(|(def, _)| def)
    }

    pub fn is_allowed(&self, id: &str) -> bool {
        self.slots
            .get(id)
            .is_some_and(|&slot| self.runtimes[slot].allowed)
    }

    pub fn cooldown_remaining(&self, id: &str) -> Option<f32> {
        self.slots
            .get(id)
            .map(|&slot| self.runtimes[slot].cooldown_remaining)
    }

    pub fn cooldown_multiplier(&self) -> f32 {
        self.cooldown_multiplier
    }

    /// True if `id` may start right now.
    pub fn can_use(&self, id: &str) -> bool {
        matches!(self.availability(id), Ok(None))
    }

    pub fn is_executing(&self) -> bool {
        self.pipeline.is_busy()
    }

    pub fn executing(&self) -> Option<(&AbilityId, ExecutionStage)> {
        self.pipeline.current().map(|e| (&e.ability, e.stage()))
    }

    /// True while `id` is executing or waiting in the queue.
    pub fn is_pending(&self, id: &str) -> bool {
        self.executing().is_some_and(|(a, _)| a.as_str() == id)
            || self.queue.iter().any(|q| q.ability.as_str() == id)
    }

    pub fn queue(&self) -> impl Iterator<Item = &QueuedRequest> {
        self.queue.iter()
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    /// `Ok(None)` when ready, `Ok(Some(_))` when transiently blocked.
    fn availability(&self, id: &str) -> Result<Option<Unavailable>, RequestError> {
        let slot = *self
            .slots
            .get(id)
            .ok_or_else(|| RequestError::UnknownAbility(AbilityId::from(id)))?;
        let runtime = &self.runtimes[slot];
        if !runtime.allowed {
            return Err(RequestError::NotInPhase(self.definitions[slot].id.clone()));
        }
        if self.suspended {
            return Err(RequestError::PipelineSuspended);
        }
        if runtime.cooldown_remaining > 0.0 {
            return Ok(Some(Unavailable::OnCooldown));
        }
        if !self.global_cooldown_elapsed() {
            return Ok(Some(Unavailable::GlobalCooldown));
        }
        if self.pipeline.is_busy() {
            return Ok(Some(Unavailable::Busy));
        }
        Ok(None)
    }

    fn global_cooldown_elapsed(&self) -> bool {
        self.last_ability_time
            .is_none_or(|last| self.clock - last >= self.global_cooldown)
    }

    // ========================================================================
    // Requests
    // ========================================================================

    /// Requests an ability, returning `false` if it was rejected.
    ///
    /// A known, allowed ability that is only transiently unavailable is queued
    /// and still reported as accepted.
    pub fn request(&mut self, id: &str, target: AbilityTarget, events: &mut EventQueue) -> bool {
        match self.try_request(id, target, events) {
            Ok(_) => true,
            Err(err) => {
                tracing::warn!("Ability request rejected: {}", err);
                false
            }
        }
    }

    pub fn try_request(
        &mut self,
        id: &str,
        target: AbilityTarget,
        events: &mut EventQueue,
    ) -> Result<RequestOutcome, RequestError> {
        match self.availability(id)? {
            None => {
                let slot = self.slots[id];
                self.begin(slot, target, events);
                Ok(RequestOutcome::Started)
            }
            Some(reason) => {
                tracing::debug!("Queueing {} ({:?})", id, reason);
                self.queue.push_back(QueuedRequest {
                    ability: self.definitions[self.slots[id]].id.clone(),
                    target,
                    enqueued_at: self.clock,
                });
                Ok(RequestOutcome::Queued)
            }
        }
    }

    fn begin(&mut self, slot: usize, target: AbilityTarget, events: &mut EventQueue) {
        let ability = self.definitions[slot].id.clone();
        tracing::debug!("Starting {}", ability);
        events.emit(BossEvent::AbilityStarted {
            ability: ability.clone(),
        });
        self.pipeline.begin(slot, ability, target);
    }

    // ========================================================================
    // Phase control
    // ========================================================================

    /// Replaces the allowed set and cooldown multiplier with a phase's values.
    ///
    /// Running cooldowns are clamped to the new maximum.
    pub fn apply_phase(&mut self, allowed: &[AbilityId], cooldown_multiplier: f32) {
        self.cooldown_multiplier = cooldown_multiplier;
        for (def, runtime) in self.definitions.iter().zip(self.runtimes.iter_mut()) {
            runtime.allowed = allowed.contains(&def.id);
            let max = def.cooldown * cooldown_multiplier;
            runtime.cooldown_remaining = runtime.cooldown_remaining.min(max);
        }
    }

    /// Stops accepting requests, draining the queue and counting down cooldowns.
    /// An in-flight execution still runs to completion.
    pub fn suspend(&mut self) {
        self.suspended = true;
    }

    pub fn resume(&mut self) {
        self.suspended = false;
    }

    pub fn reset_all_cooldowns(&mut self) {
        for runtime in &mut self.runtimes {
            runtime.cooldown_remaining = 0.0;
        }
    }

    /// Cancels the in-flight execution (stun). No cooldown is applied.
    pub fn interrupt(&mut self, events: &mut EventQueue) -> Option<AbilityId> {
        let execution = self.pipeline.cancel()?;
        tracing::debug!("Interrupted {}", execution.ability);
        events.emit(BossEvent::AbilityInterrupted {
            ability: execution.ability.clone(),
        });
        Some(execution.ability)
    }

    pub fn clear_queue(&mut self) {
        self.queue.clear();
    }

    // ========================================================================
    // Tick
    // ========================================================================

    /// Advances cooldowns, the in-flight execution and the request queue.
    pub fn tick(&mut self, dt: f32, ctx: &mut PerformContext<'_>, events: &mut EventQueue) {
        self.clock += dt;

        if !self.suspended {
            for runtime in &mut self.runtimes {
                runtime.cooldown_remaining = (runtime.cooldown_remaining - dt).max(0.0);
            }
        }

        if let Some(execution) = self.pipeline.current() {
            let slot = execution.slot;
            if let Some(done) = self.pipeline.advance(dt, &self.definitions[slot], ctx, events) {
                self.complete(done.slot, events);
            }
        }

        if !self.suspended {
            self.drain_queue(events);
        }
    }

    fn complete(&mut self, slot: usize, events: &mut EventQueue) {
        let def = &self.definitions[slot];
        self.runtimes[slot].cooldown_remaining = def.cooldown * self.cooldown_multiplier;
        self.last_ability_time = Some(self.clock);
        tracing::debug!(
            "Completed {} (cooldown {:.2}s)",
            def.id,
            self.runtimes[slot].cooldown_remaining
        );
        events.emit(BossEvent::AbilityCompleted {
            ability: def.id.clone(),
        });
    }

    fn drain_queue(&mut self, events: &mut EventQueue) {
        while !self.pipeline.is_busy() && self.global_cooldown_elapsed() {
            let Some(head) = self.queue.front() else {
                return;
            };

            if self.clock - head.enqueued_at > self.queued_request_timeout {
                tracing::debug!("Dropping stale request for {}", head.ability);
                self.queue.pop_front();
                continue;
            }

            let slot = self.slots[head.ability.as_str()];
            let runtime = self.runtimes[slot];
            if !runtime.allowed {
                tracing::debug!("Dropping {}: no longer allowed", head.ability);
                self.queue.pop_front();
                continue;
            }
            if runtime.cooldown_remaining > 0.0 {
                // FIFO: the head waits for its own cooldown
                return;
            }

            if let Some(request) = self.queue.pop_front() {
                self.begin(slot, request.target, events);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::ability::AbilityKind;
    use crate::env::CombatOracle;
    use crate::state::EntityRef;

    struct Empty;

    impl CombatOracle for Empty {
        fn line_of_sight(&self, _: Vec3, _: Vec3) -> bool {
            true
        }
        fn find_cover(&self, _: Vec3, _: Vec3, _: f32) -> Option<Vec3> {
            None
        }
        fn overlap(&self, _: Vec3, _: f32) -> Vec<EntityRef> {
            Vec::new()
        }
    }

    fn catalog() -> AbilityCatalog {
        let defs = vec![
            AbilityDefinition::new("Slam", AbilityKind::Melee)
                .with_range(3.0)
                .with_cooldown(4.0),
            AbilityDefinition::new("Nova", AbilityKind::Ultimate)
                .with_cooldown(10.0)
                .with_cast_time(1.0),
            AbilityDefinition::new("Hidden", AbilityKind::Melee),
        ];
        let mut catalog = AbilityCatalog::new(defs, 1.0, 5.0).expect("valid catalog");
        catalog.apply_phase(&["Slam".into(), "Nova".into()], 1.0);
        catalog
    }

    fn tick(catalog: &mut AbilityCatalog, dt: f32, events: &mut EventQueue) {
        let mut position = Vec3::ZERO;
        let mut ctx = PerformContext {
            position: &mut position,
            known_targets: &[],
            oracle: &Empty,
            damage_multiplier: 1.0,
            random: 0,
        };
        catalog.tick(dt, &mut ctx, events);
    }

    fn target() -> AbilityTarget {
        AbilityTarget::point(Vec3::ZERO)
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let defs = vec![
            AbilityDefinition::new("Slam", AbilityKind::Melee),
            AbilityDefinition::new("Slam", AbilityKind::Ultimate),
        ];
        assert_eq!(
            AbilityCatalog::new(defs, 1.0, 5.0).err(),
            Some(ConfigError::DuplicateAbility("Slam".into()))
        );
    }

    #[test]
    fn unknown_ability_is_rejected_without_events() {
        let mut catalog = catalog();
        let mut events = EventQueue::new();
        assert!(!catalog.can_use("Missing"));
        assert!(!catalog.request("Missing", target(), &mut events));
        assert!(events.is_empty());
        assert_eq!(catalog.queue_len(), 0);
    }

    #[test]
    fn phase_gating_overrides_cooldown_state() {
        let mut catalog = catalog();
        let mut events = EventQueue::new();
        assert_eq!(catalog.cooldown_remaining("Hidden"), Some(0.0));
        assert!(!catalog.can_use("Hidden"));
        assert_eq!(
            catalog.try_request("Hidden", target(), &mut events),
            Err(RequestError::NotInPhase("Hidden".into()))
        );
    }

    #[test]
    fn busy_pipeline_queues_and_drains_after_global_cooldown() {
        let mut catalog = catalog();
        let mut events = EventQueue::new();

        assert_eq!(
            catalog.try_request("Nova", target(), &mut events),
            Ok(RequestOutcome::Started)
        );
        assert_eq!(
            catalog.try_request("Slam", target(), &mut events),
            Ok(RequestOutcome::Queued)
        );
        assert!(!catalog.can_use("Slam"));

        // Nova finishes its 1s cast.
        tick(&mut catalog, 1.0, &mut events);
        assert!(!catalog.is_executing());
        assert_eq!(catalog.cooldown_remaining("Nova"), Some(10.0));
        assert_eq!(catalog.queue_len(), 1);

        // Global cooldown (1s) still running.
        tick(&mut catalog, 0.5, &mut events);
        assert_eq!(catalog.queue_len(), 1);

        tick(&mut catalog, 0.5, &mut events);
        assert_eq!(catalog.executing().map(|(id, _)| id.as_str()), Some("Slam"));
    }

    #[test]
    fn cooldowns_never_go_negative() {
        let mut catalog = catalog();
        let mut events = EventQueue::new();
        catalog.request("Slam", target(), &mut events);
        for _ in 0..20 {
            tick(&mut catalog, 0.7, &mut events);
            let remaining = catalog.cooldown_remaining("Slam").unwrap_or_default();
            assert!((0.0..=4.0).contains(&remaining));
        }
        assert_eq!(catalog.cooldown_remaining("Slam"), Some(0.0));
    }

    #[test]
    fn suspension_freezes_cooldowns_but_finishes_cast() {
        let mut catalog = catalog();
        let mut events = EventQueue::new();
        catalog.request("Slam", target(), &mut events);
        tick(&mut catalog, 0.1, &mut events);
        assert_eq!(catalog.cooldown_remaining("Slam"), Some(4.0));

        catalog.request("Nova", target(), &mut events);
        catalog.suspend();
        assert!(!catalog.request("Slam", target(), &mut events));

        tick(&mut catalog, 2.0, &mut events);
        assert_eq!(catalog.cooldown_remaining("Slam"), Some(4.0));
        // Nova was queued behind the global cooldown and waits out the suspension.
        assert!(!catalog.is_executing());
        assert_eq!(catalog.queue_len(), 1);

        catalog.resume();
        tick(&mut catalog, 1.0, &mut events);
        assert_eq!(catalog.cooldown_remaining("Slam"), Some(3.0));
        assert_eq!(catalog.executing().map(|(id, _)| id.as_str()), Some("Nova"));
    }

    #[test]
    fn phase_swap_clamps_running_cooldowns() {
        let mut catalog = catalog();
        let mut events = EventQueue::new();
        catalog.request("Slam", target(), &mut events);
        tick(&mut catalog, 0.1, &mut events);
        assert_eq!(catalog.cooldown_remaining("Slam"), Some(4.0));

        catalog.apply_phase(&["Slam".into()], 0.5);
        assert_eq!(catalog.cooldown_remaining("Slam"), Some(2.0));
        assert!(!catalog.is_allowed("Nova"));
    }

    #[test]
    fn interrupt_skips_cooldown() {
        let mut catalog = catalog();
        let mut events = EventQueue::new();
        catalog.request("Nova", target(), &mut events);
        assert_eq!(catalog.interrupt(&mut events), Some("Nova".into()));
        assert_eq!(catalog.cooldown_remaining("Nova"), Some(0.0));
        assert!(!catalog.is_executing());
    }

    #[test]
    fn stale_requests_expire() {
        let mut catalog = catalog();
        let mut events = EventQueue::new();
        catalog.request("Nova", target(), &mut events);
        catalog.request("Slam", target(), &mut events);
        catalog.suspend();
        tick(&mut catalog, 6.0, &mut events);
        catalog.resume();
        tick(&mut catalog, 1.0, &mut events);
        assert_eq!(catalog.queue_len(), 0);
        assert!(!catalog.is_pending("Slam"));
    }
}
