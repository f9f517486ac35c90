//! Decision engine: perception, timed decisions, fallback behaviour and the
//! action executor, tied together by the AI state machine.

use std::collections::VecDeque;

use glam::Vec3;

use super::executor::{ActionContext, ActionExecutor, ActionStatus};
use super::perception::Perception;
use super::scoring::{self, Candidates, ScoringContext};
use super::selector::DecisionSelector;
use super::types::{ActionKind, AiState, Decision, QueuedAction};
use crate::ability::AbilityCatalog;
use crate::config::BossConfig;
use crate::env::{CombatOracle, PcgRng, RngOracle, TargetView, compute_seed};
use crate::events::{BossEvent, EventQueue};

/// Roll contexts for [`compute_seed`].
const ROLL_ABILITY_GATE: u32 = 0;
const ROLL_COVER_GATE: u32 = 1;

/// Everything the engine reads or drives during one tick.
pub struct EngineContext<'a> {
    pub dt: f32,
    pub position: &'a mut Vec3,
    pub facing: &'a mut Vec3,
    pub target: Option<TargetView>,
    pub health_percent: f32,
    pub speed_multiplier: f32,
    /// Decisions are held while the phase controller is transitioning.
    pub transitioning: bool,
    pub config: &'a BossConfig,
    pub catalog: &'a mut AbilityCatalog,
    pub oracle: &'a dyn CombatOracle,
}

/// Utility AI for one boss.
///
/// Perception runs every tick; a decision is made at most once per
/// `decision_interval` and only while no action is executing. The winning
/// decision becomes a [`QueuedAction`] run by the executor, one at a time.
#[derive(Clone, Debug)]
pub struct DecisionEngine {
    state: AiState,
    perception: Perception,
    executor: ActionExecutor,
    queue: VecDeque<QueuedAction>,
    clock: f32,
    decision_timer: f32,
    seed: u64,
    roll_nonce: u64,
    /// A target has been held since the boss last gave up and patrolled.
    engaged: bool,
    /// The search move for the current loss has been queued.
    searched: bool,
    patrol_index: usize,
    stun_remaining: f32,
    last_decision: Option<Decision>,
}

impl DecisionEngine {
    pub fn new(config: &BossConfig) -> Self {
        Self {
            state: AiState::Idle,
            perception: Perception::default(),
            executor: ActionExecutor::default(),
            queue: VecDeque::new(),
            clock: 0.0,
            decision_timer: 0.0,
            seed: config.seed,
            roll_nonce: 0,
            engaged: false,
            searched: false,
            patrol_index: 0,
            stun_remaining: 0.0,
            last_decision: None,
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn state(&self) -> AiState {
        self.state
    }

    pub fn perception(&self) -> &Perception {
        &self.perception
    }

    pub fn is_executing(&self) -> bool {
        self.executor.is_busy()
    }

    pub fn current_action(&self) -> Option<&QueuedAction> {
        self.executor.current()
    }

    pub fn queued(&self) -> impl Iterator<Item = &QueuedAction> {
        self.queue.iter()
    }

    pub fn last_decision(&self) -> Option<&Decision> {
        self.last_decision.as_ref()
    }

    pub fn is_stunned(&self) -> bool {
        self.stun_remaining > 0.0
    }

    /// Scores every candidate for the current perception without rolling or
    /// committing to anything. Both probability gates are treated as passed.
    pub fn evaluate(
        &self,
        position: Vec3,
        health_percent: f32,
        config: &BossConfig,
        catalog: &AbilityCatalog,
        oracle: &dyn CombatOracle,
    ) -> Candidates {
        scoring::generate(&ScoringContext {
            position,
            health_percent,
            perception: &self.perception,
            config,
            catalog,
            oracle,
            use_abilities: true,
            consider_cover: true,
        })
    }

    // ========================================================================
    // Tick
    // ========================================================================

    pub fn tick(&mut self, ctx: &mut EngineContext<'_>, events: &mut EventQueue) {
        let dt = ctx.dt;
        self.clock += dt;
        self.perception.update(*ctx.position, ctx.target, ctx.oracle, dt);

        if self.stun_remaining > 0.0 {
            self.stun_remaining -= dt;
            if self.stun_remaining > 0.0 {
                return;
            }
            self.stun_remaining = 0.0;
            tracing::debug!("Stun expired");
            let next = if self.perception.has_target() || self.engaged {
                AiState::Engaging
            } else {
                AiState::Idle
            };
            self.set_state(next, events);
        }

        if self.perception.has_target() {
            self.on_target_present(events);
        }

        self.decision_timer += dt;
        if self.decision_timer >= ctx.config.decision_interval
            && !self.executor.is_busy()
            && self.queue.is_empty()
            && !ctx.transitioning
        {
            self.decision_timer = 0.0;
            self.decide(ctx, events);
        }

        self.run_actions(ctx, events);
    }

    fn on_target_present(&mut self, events: &mut EventQueue) {
        self.engaged = true;
        self.searched = false;

        let wandering = self
            .executor
            .current()
            .is_some_and(|a| a.kind.is_fallback());
        if wandering {
            self.executor.abandon();
        }
        self.queue.retain(|a| !a.kind.is_fallback());

        if wandering || matches!(self.state, AiState::Idle | AiState::Patrolling) {
            tracing::debug!("Target acquired");
            self.set_state(AiState::Engaging, events);
        }
    }

    fn decide(&mut self, ctx: &mut EngineContext<'_>, events: &mut EventQueue) {
        self.roll_nonce += 1;
        let rng = PcgRng;
        let use_abilities = rng.chance(
            compute_seed(self.seed, self.roll_nonce, ROLL_ABILITY_GATE),
            ctx.config.ability_use_probability,
        );
        let consider_cover = rng.chance(
            compute_seed(self.seed, self.roll_nonce, ROLL_COVER_GATE),
            ctx.config.seek_cover_probability,
        );

        let candidates = scoring::generate(&ScoringContext {
            position: *ctx.position,
            health_percent: ctx.health_percent,
            perception: &self.perception,
            config: ctx.config,
            catalog: &*ctx.catalog,
            oracle: ctx.oracle,
            use_abilities,
            consider_cover,
        });

        match DecisionSelector::select(&candidates) {
            Some(decision) => {
                self.queue.push_back(decision.clone().into_action(self.clock));
                self.last_decision = Some(decision);
            }
            None => self.fallback(ctx.config, events),
        }
    }

    /// No candidates: search the last known position, then give up and patrol.
    fn fallback(&mut self, config: &BossConfig, events: &mut EventQueue) {
        let lost = self.perception.lost_time;

        if lost > config.patrol_after_lost {
            if self.state != AiState::Patrolling {
                tracing::debug!("Target lost for {:.1}s, patrolling", lost);
                self.engaged = false;
                self.set_state(AiState::Patrolling, events);
            }
            if !config.patrol_points.is_empty() {
                let index = self.patrol_index % config.patrol_points.len();
                self.patrol_index = index + 1;
                self.queue.push_back(QueuedAction::fallback(
                    ActionKind::Patrol,
                    config.patrol_points[index],
                    self.clock,
                ));
            }
            return;
        }

        if lost > config.lost_target_grace && !self.searched {
            if let Some(last_known) = self.perception.last_known_position {
                tracing::debug!("Searching last known position {}", last_known);
                self.searched = true;
                self.queue.push_back(QueuedAction::fallback(
                    ActionKind::Search,
                    last_known,
                    self.clock,
                ));
            }
        }
    }

    fn run_actions(&mut self, ctx: &mut EngineContext<'_>, events: &mut EventQueue) {
        let mut action_ctx = ActionContext {
            position: &mut *ctx.position,
            facing: &mut *ctx.facing,
            target: ctx.target,
            speed_multiplier: ctx.speed_multiplier,
            config: ctx.config,
            catalog: &mut *ctx.catalog,
            oracle: ctx.oracle,
            events,
        };

        if !self.executor.is_busy() {
            let Some(action) = self.queue.pop_front() else {
                return;
            };
            let kind = action.kind;
            if !self.executor.start(action, &mut action_ctx) {
                tracing::debug!("{} action failed to start", kind);
                let next = self.settled_state(ctx.config);
                self.set_state(next, action_ctx.events);
                return;
            }
            self.set_state(kind.state(), action_ctx.events);
        }

        match self.executor.advance(ctx.dt, &mut action_ctx) {
            ActionStatus::Running => {}
            status => {
                if status == ActionStatus::Failed {
                    tracing::debug!("Action failed");
                }
                let next = self.settled_state(ctx.config);
                self.set_state(next, action_ctx.events);
            }
        }
    }

    /// State to fall back to once no action is running.
    fn settled_state(&self, config: &BossConfig) -> AiState {
        if self.perception.has_target() {
            AiState::Engaging
        } else if self.perception.lost_time > config.patrol_after_lost {
            AiState::Patrolling
        } else if self.engaged {
            AiState::Engaging
        } else {
            AiState::Idle
        }
    }

    fn set_state(&mut self, next: AiState, events: &mut EventQueue) {
        if next == self.state {
            return;
        }
        tracing::debug!("AI state {} -> {}", self.state, next);
        events.emit(BossEvent::AiStateChanged {
            previous: self.state,
            next,
        });
        self.state = next;
    }

    // ========================================================================
    // External interruptions
    // ========================================================================

    /// Drops the running and queued actions (death, phase transition).
    pub fn abandon(&mut self, config: &BossConfig, events: &mut EventQueue) {
        let had_action = self.executor.abandon().is_some();
        self.queue.clear();
        if had_action {
            let next = self.settled_state(config);
            self.set_state(next, events);
        }
    }

    /// Stuns the AI for `duration` seconds. Overlapping stuns keep the longer one.
    pub fn stun(&mut self, duration: f32, events: &mut EventQueue) {
        if !(duration.is_finite() && duration > 0.0) {
            return;
        }
        self.executor.abandon();
        self.queue.clear();
        self.stun_remaining = self.stun_remaining.max(duration);
        self.set_state(AiState::Stunned, events);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ability::{AbilityDefinition, AbilityId, AbilityKind};
    use crate::state::EntityRef;

    struct Open;

    impl CombatOracle for Open {
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

    struct Arena {
        position: Vec3,
        facing: Vec3,
        config: BossConfig,
        catalog: AbilityCatalog,
        engine: DecisionEngine,
        events: EventQueue,
    }

    impl Arena {
        fn new() -> Self {
            let mut config = BossConfig::default();
            config.ability_use_probability = 0.0;
            config.seek_cover_probability = 0.0;
            let defs = vec![AbilityDefinition::new("BasicAttack", AbilityKind::Melee).with_range(3.0)];
            let mut catalog = AbilityCatalog::new(defs, 1.0, 5.0).expect("valid catalog");
            catalog.apply_phase(&[AbilityId::from("BasicAttack")], 1.0);
            Self {
                position: Vec3::ZERO,
                facing: Vec3::Z,
                engine: DecisionEngine::new(&config),
                config,
                catalog,
                events: EventQueue::new(),
            }
        }

        fn tick(&mut self, dt: f32, target: Option<Vec3>) {
            let mut ctx = EngineContext {
                dt,
                position: &mut self.position,
                facing: &mut self.facing,
                target: target.map(|position| TargetView {
                    handle: EntityRef(1),
                    position,
                }),
                health_percent: 100.0,
                speed_multiplier: 1.0,
                transitioning: false,
                config: &self.config,
                catalog: &mut self.catalog,
                oracle: &Open,
            };
            self.engine.tick(&mut ctx, &mut self.events);
        }
    }

    #[test]
    fn acquiring_a_target_engages() {
        let mut arena = Arena::new();
        arena.tick(0.1, Some(Vec3::X * 5.0));
        assert_eq!(arena.engine.state(), AiState::Engaging);
        assert_eq!(
            arena.events.drain().collect::<Vec<_>>(),
            vec![BossEvent::AiStateChanged {
                previous: AiState::Idle,
                next: AiState::Engaging,
            }]
        );
    }

    #[test]
    fn decides_once_per_interval() {
        let mut arena = Arena::new();
        // Target far away: the only candidate is an approach move.
        arena.tick(0.5, Some(Vec3::X * 30.0));
        assert!(!arena.engine.is_executing());
        arena.tick(0.5, Some(Vec3::X * 30.0));
        assert_eq!(
            arena.engine.current_action().map(|a| a.kind),
            Some(ActionKind::Move)
        );
        assert_eq!(arena.engine.state(), AiState::Moving);
    }

    #[test]
    fn lost_target_searches_then_patrols() {
        let mut arena = Arena::new();
        // Comfortable distance, no candidates while the target is held.
        arena.tick(1.0, Some(Vec3::X * 5.0));
        assert_eq!(arena.engine.state(), AiState::Engaging);

        let mut saw_search = false;
        for _ in 0..80 {
            arena.tick(0.1, None);
            saw_search |= arena
                .engine
                .current_action()
                .is_some_and(|a| a.kind == ActionKind::Search);
        }
        assert!(saw_search);
        assert_eq!(arena.engine.state(), AiState::Patrolling);
    }

    #[test]
    fn stun_blocks_actions_until_it_expires() {
        let mut arena = Arena::new();
        arena.tick(1.0, Some(Vec3::X * 30.0));
        assert!(arena.engine.is_executing());

        arena.engine.stun(2.0, &mut arena.events);
        assert_eq!(arena.engine.state(), AiState::Stunned);
        assert!(!arena.engine.is_executing());

        let before = arena.position;
        arena.tick(1.0, Some(Vec3::X * 30.0));
        assert_eq!(arena.position, before);
        assert!(arena.engine.is_stunned());

        arena.tick(1.0, Some(Vec3::X * 30.0));
        assert!(!arena.engine.is_stunned());
        assert_ne!(arena.engine.state(), AiState::Stunned);
    }
}
