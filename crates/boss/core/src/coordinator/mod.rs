//! Boss coordinator: owns health and combat state and ticks every component.
//!
//! One [`Boss`] per boss entity. It owns the ability catalog, phase
//! controller and decision engine outright; none of them hold a reference
//! back. Everything the boss wants done outside itself leaves through the
//! [`EventBus`].
//!
//! # Tick Order
//!
//! 1. Target acquisition and the combat-state gate
//! 2. Decision engine
//! 3. Phase controller
//! 4. Ability catalog
//! 5. Event dispatch
//!
//! A phase transition started during step 3 is first seen by decisions on the
//! next tick.
mod definition;
mod targeting;

pub use definition::BossDefinition;
pub use targeting::{LEASH_FACTOR, acquire};

use glam::Vec3;

use crate::ability::{
    AbilityCatalog, AbilityId, AbilityTarget, PerformContext, RequestOutcome,
};
use crate::ai::{AiState, DecisionEngine, EngineContext};
use crate::config::BossConfig;
use crate::env::{PcgRng, RngOracle, TargetView, TickInput, compute_seed};
use crate::error::{ConfigError, RequestError};
use crate::events::{BossEvent, EventBus, EventListener, EventQueue};
use crate::phase::PhaseController;
use crate::state::{BossCombatState, CombatState, EntityRef};

/// Roll context for random target picks.
const ROLL_RANDOM_TARGET: u32 = 2;

/// Read-only view of a boss for UI and logging.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BossSnapshot {
    pub name: String,
    pub health: f32,
    pub max_health: f32,
    pub health_percent: f32,
    pub phase_index: usize,
    pub phase_name: String,
    pub is_transitioning: bool,
    pub is_invulnerable: bool,
    pub is_dead: bool,
    pub ai_state: AiState,
    pub combat_state: CombatState,
    pub target: Option<EntityRef>,
    pub position: Vec3,
    pub facing: Vec3,
    pub executing: Option<AbilityId>,
}

pub struct Boss {
    name: String,
    config: BossConfig,
    combat: BossCombatState,
    position: Vec3,
    facing: Vec3,
    damage_multiplier: f32,
    speed_multiplier: f32,
    catalog: AbilityCatalog,
    phases: PhaseController,
    engine: DecisionEngine,
    bus: EventBus,
    pending: EventQueue,
    /// Seconds since death, until `Defeated` has been emitted.
    defeat_elapsed: Option<f32>,
    defeat_announced: bool,
    tick_nonce: u64,
}

impl Boss {
    /// Builds a boss in its opening phase at `spawn`.
    pub fn new(definition: BossDefinition, spawn: Vec3) -> Result<Self, ConfigError> {
        let (mut catalog, table) = definition.build()?;
        let config = definition.config;

        let phases = PhaseController::new(table, config.transition_duration);
        let opening = phases.current_definition();
        catalog.apply_phase(&opening.abilities, opening.cooldown_multiplier);
        let damage_multiplier = opening.damage_multiplier;
        let speed_multiplier = opening.speed_multiplier;

        tracing::info!(
            "Boss '{}' ready: {} abilities, {} phases, {} hp",
            definition.name,
            catalog.definitions().len(),
            phases.table().len(),
            config.max_health
        );

        Ok(Self {
            name: definition.name,
            combat: BossCombatState::new(config.max_health),
            position: spawn,
            facing: Vec3::Z,
            damage_multiplier,
            speed_multiplier,
            catalog,
            phases,
            engine: DecisionEngine::new(&config),
            bus: EventBus::new(),
            pending: EventQueue::new(),
            defeat_elapsed: None,
            defeat_announced: false,
            tick_nonce: 0,
            config,
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &BossConfig {
        &self.config
    }

    pub fn combat(&self) -> &BossCombatState {
        &self.combat
    }

    pub fn health(&self) -> f32 {
        self.combat.health
    }

    pub fn max_health(&self) -> f32 {
        self.combat.max_health
    }

    pub fn health_percent(&self) -> f32 {
        self.combat.health_percent()
    }

    pub fn phase_index(&self) -> usize {
        self.combat.phase_index
    }

    pub fn is_invulnerable(&self) -> bool {
        self.combat.is_invulnerable
    }

    pub fn is_dead(&self) -> bool {
        self.combat.is_dead
    }

    pub fn combat_state(&self) -> CombatState {
        self.combat.combat_state()
    }

    pub fn target(&self) -> Option<EntityRef> {
        self.combat.target
    }

    pub fn ai_state(&self) -> AiState {
        self.engine.state()
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn facing(&self) -> Vec3 {
        self.facing
    }

    pub fn damage_multiplier(&self) -> f32 {
        self.damage_multiplier
    }

    pub fn speed_multiplier(&self) -> f32 {
        self.speed_multiplier
    }

    pub fn catalog(&self) -> &AbilityCatalog {
        &self.catalog
    }

    pub fn phases(&self) -> &PhaseController {
        &self.phases
    }

    pub fn engine(&self) -> &DecisionEngine {
        &self.engine
    }

    pub fn snapshot(&self) -> BossSnapshot {
        BossSnapshot {
            name: self.name.clone(),
            health: self.combat.health,
            max_health: self.combat.max_health,
            health_percent: self.combat.health_percent(),
            phase_index: self.combat.phase_index,
            phase_name: self.phases.current_definition().name.clone(),
            is_transitioning: self.phases.is_transitioning(),
            is_invulnerable: self.combat.is_invulnerable,
            is_dead: self.combat.is_dead,
            ai_state: self.engine.state(),
            combat_state: self.combat.combat_state(),
            target: self.combat.target,
            position: self.position,
            facing: self.facing,
            executing: self.catalog.executing().map(|(id, _)| id.clone()),
        }
    }

    // ========================================================================
    // Host controls
    // ========================================================================

    pub fn subscribe(&mut self, listener: impl EventListener + 'static) {
        self.bus.subscribe(listener);
    }

    /// Moves the boss, e.g. after the host resolves a teleport.
    pub fn set_position(&mut self, position: Vec3) {
        if position.is_finite() {
            self.position = position;
        } else {
            tracing::warn!("Ignoring non-finite boss position {}", position);
        }
    }

    pub fn reset_all_cooldowns(&mut self) {
        self.catalog.reset_all_cooldowns();
    }

    pub fn can_use(&self, ability: &str) -> bool {
        !self.combat.is_dead && self.catalog.can_use(ability)
    }

    /// Requests an ability against the current target. `false` if rejected.
    pub fn request_ability(&mut self, ability: &str) -> bool {
        match self.try_request_ability(ability) {
            Ok(_) => true,
            Err(err) => {
                tracing::warn!("Ability request rejected: {}", err);
                false
            }
        }
    }

    pub fn try_request_ability(&mut self, ability: &str) -> Result<RequestOutcome, RequestError> {
        if self.combat.is_dead {
            return Err(RequestError::Defeated);
        }
        let target = self
            .engine
            .perception()
            .target
            .map(AbilityTarget::from)
            .unwrap_or_else(|| AbilityTarget::point(self.position));
        let outcome = self.catalog.try_request(ability, target, &mut self.pending);
        self.dispatch();
        outcome
    }

    /// Applies incoming damage from `source`.
    ///
    /// No-op while dead or invulnerable, and for non-positive or non-finite
    /// amounts.
    pub fn apply_damage(&mut self, amount: f32, source: Vec3) {
        if self.combat.is_dead || self.combat.is_invulnerable {
            tracing::debug!("Ignoring {} damage: boss is dead or invulnerable", amount);
            return;
        }
        if !(amount.is_finite() && amount > 0.0) {
            if amount != 0.0 {
                tracing::warn!("Ignoring invalid damage amount {}", amount);
            }
            return;
        }

        let dealt = self.combat.take_damage(amount);
        tracing::debug!(
            "Took {:.1} damage ({:.1}/{:.1})",
            dealt,
            self.combat.health,
            self.combat.max_health
        );
        self.pending.emit(BossEvent::DamageTaken {
            amount: dealt,
            source,
        });
        self.pending.emit(BossEvent::HealthChanged {
            current: self.combat.health,
            max: self.combat.max_health,
        });
        if amount > self.config.enrage_fraction * self.combat.max_health {
            tracing::info!("Enraged by a {:.1} hit", amount);
            self.pending.emit(BossEvent::Enraged);
        }

        if self.combat.is_dead {
            self.on_death();
        } else {
            self.evaluate_phase();
        }
        self.dispatch();
    }

    /// Stuns the boss: interrupts any cast and drops the current action.
    pub fn apply_stun(&mut self, duration: f32) {
        if self.combat.is_dead {
            return;
        }
        if !(duration.is_finite() && duration > 0.0) {
            tracing::warn!("Ignoring invalid stun duration {}", duration);
            return;
        }
        tracing::debug!("Stunned for {:.1}s", duration);
        self.catalog.interrupt(&mut self.pending);
        self.engine.stun(duration, &mut self.pending);
        self.dispatch();
    }

    // ========================================================================
    // Tick
    // ========================================================================

    pub fn tick(&mut self, input: &TickInput<'_>) {
        let dt = input.sanitized_dt();

        if self.combat.is_dead {
            self.tick_defeat(dt);
            self.dispatch();
            return;
        }

        let target = self.update_target(input);

        let mut engine_ctx = EngineContext {
            dt,
            position: &mut self.position,
            facing: &mut self.facing,
            target,
            health_percent: self.combat.health_percent(),
            speed_multiplier: self.speed_multiplier,
            transitioning: self.phases.is_transitioning(),
            config: &self.config,
            catalog: &mut self.catalog,
            oracle: input.oracle,
        };
        self.engine.tick(&mut engine_ctx, &mut self.pending);

        if let Some(phase) = self.phases.tick(dt) {
            self.complete_transition(phase);
        }

        let known_targets = input.known_targets();
        self.tick_nonce += 1;
        let random = PcgRng.next_u32(compute_seed(
            self.config.seed,
            self.tick_nonce,
            ROLL_RANDOM_TARGET,
        ));
        let mut perform_ctx = PerformContext {
            position: &mut self.position,
            known_targets: &known_targets,
            oracle: input.oracle,
            damage_multiplier: self.damage_multiplier,
            random,
        };
        self.catalog.tick(dt, &mut perform_ctx, &mut self.pending);

        self.dispatch();
    }

    fn update_target(&mut self, input: &TickInput<'_>) -> Option<TargetView> {
        let target = acquire(
            self.combat.target,
            self.position,
            input.candidates,
            self.config.aggro_range,
        );
        let handle = target.map(|t| t.handle);

        if handle != self.combat.target {
            tracing::debug!("Target {:?} -> {:?}", self.combat.target, handle);
            self.combat.target = handle;
        }

        match (self.combat.in_combat, handle) {
            (false, Some(handle)) => {
                tracing::info!("Combat started against {}", handle);
                self.combat.in_combat = true;
                self.pending.emit(BossEvent::CombatStarted { target: handle });
            }
            (true, None) => {
                tracing::info!("Combat ended");
                self.combat.in_combat = false;
                self.pending.emit(BossEvent::CombatEnded);
            }
            _ => {}
        }

        target
    }

    fn evaluate_phase(&mut self) {
        let Some(to) = self
            .phases
            .evaluate_transition(self.combat.health_percent())
        else {
            return;
        };

        match self.phases.begin_transition(to, &mut self.pending) {
            Ok(()) => {
                self.combat.is_invulnerable = true;
                self.catalog.suspend();
                self.engine.abandon(&self.config, &mut self.pending);
            }
            Err(err) => tracing::warn!("Phase transition ignored: {}", err),
        }
    }

    fn complete_transition(&mut self, phase: usize) {
        let definition = self.phases.current_definition();
        self.damage_multiplier = definition.damage_multiplier;
        self.speed_multiplier = definition.speed_multiplier;
        self.catalog
            .apply_phase(&definition.abilities, definition.cooldown_multiplier);
        tracing::info!("Entered phase {} ({})", phase, definition.name);

        self.catalog.resume();
        self.combat.is_invulnerable = false;
        self.combat.advance_phase(phase);
        self.pending.emit(BossEvent::PhaseChanged { phase });

        self.evaluate_phase();
    }

    fn on_death(&mut self) {
        tracing::info!("Boss '{}' defeated", self.name);
        self.engine.abandon(&self.config, &mut self.pending);
        self.catalog.interrupt(&mut self.pending);
        self.catalog.clear_queue();
        self.defeat_elapsed = Some(0.0);
    }

    fn tick_defeat(&mut self, dt: f32) {
        if self.defeat_announced {
            return;
        }
        let Some(elapsed) = self.defeat_elapsed.as_mut() else {
            return;
        };
        *elapsed += dt;
        if *elapsed >= self.config.defeat_delay {
            self.defeat_announced = true;
            self.pending.emit(BossEvent::Defeated);
        }
    }

    fn dispatch(&mut self) {
        self.bus.dispatch(&mut self.pending);
    }
}

impl std::fmt::Debug for Boss {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Boss")
            .field("name", &self.name)
            .field("combat", &self.combat)
            .field("position", &self.position)
            .field("phase", &self.phases.current())
            .field("ai_state", &self.engine.state())
            .finish_non_exhaustive()
    }
}
