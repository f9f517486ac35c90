//! Outbound events and the observer bus.
//!
//! Components never call into animation, audio or damage systems. They push
//! [`BossEvent`]s into an [`EventQueue`] during a tick; the coordinator then
//! hands the queue to its [`EventBus`], which forwards every event to each
//! subscribed [`EventListener`] in subscription order.

use std::sync::{Arc, Mutex};

use glam::Vec3;

use crate::ability::AbilityId;
use crate::ai::AiState;
use crate::state::EntityRef;

/// Everything the boss reports to the outside world.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BossEvent {
    /// A phase transition began; the boss is invulnerable until `PhaseChanged`.
    PhaseTransitionStarted { from: usize, to: usize },
    /// A phase transition finished and the new phase is active.
    PhaseChanged { phase: usize },
    HealthChanged { current: f32, max: f32 },
    DamageTaken { amount: f32, source: Vec3 },
    /// A single hit exceeded the enrage fraction of max health.
    Enraged,
    /// Emitted once, a fixed delay after death.
    Defeated,
    CombatStarted { target: EntityRef },
    CombatEnded,
    AbilityStarted { ability: AbilityId },
    AbilityCompleted { ability: AbilityId },
    /// An in-flight ability was cut short by a stun. No cooldown was applied.
    AbilityInterrupted { ability: AbilityId },
    /// Damage the host should apply to `target`.
    DamageIntent {
        target: EntityRef,
        amount: f32,
        ability: AbilityId,
    },
    ProjectileLaunched {
        ability: AbilityId,
        origin: Vec3,
        target_point: Vec3,
        speed: f32,
        damage: f32,
    },
    SummonRequested {
        ability: AbilityId,
        creature: String,
        count: u32,
        around: Vec3,
    },
    TeleportRequested {
        ability: AbilityId,
        destination: Vec3,
    },
    AiStateChanged { previous: AiState, next: AiState },
}

impl BossEvent {
    /// Short, stable name used in logs.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::PhaseTransitionStarted { .. } => "phase_transition_started",
            Self::PhaseChanged { .. } => "phase_changed",
            Self::HealthChanged { .. } => "health_changed",
            Self::DamageTaken { .. } => "damage_taken",
            Self::Enraged => "enraged",
            Self::Defeated => "defeated",
            Self::CombatStarted { .. } => "combat_started",
            Self::CombatEnded => "combat_ended",
            Self::AbilityStarted { .. } => "ability_started",
            Self::AbilityCompleted { .. } => "ability_completed",
            Self::AbilityInterrupted { .. } => "ability_interrupted",
            Self::DamageIntent { .. } => "damage_intent",
            Self::ProjectileLaunched { .. } => "projectile_launched",
            Self::SummonRequested { .. } => "summon_requested",
            Self::TeleportRequested { .. } => "teleport_requested",
            Self::AiStateChanged { .. } => "ai_state_changed",
        }
    }
}

/// Events produced during one tick, in emission order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EventQueue {
    events: Vec<BossEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, event: BossEvent) {
        tracing::trace!("emit {}", event.name());
        self.events.push(event);
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BossEvent> {
        self.events.iter()
    }

    pub fn drain(&mut self) -> std::vec::Drain<'_, BossEvent> {
        self.events.drain(..)
    }
}

/// Subscriber to boss events.
///
/// Listeners must be `Send` so bosses can be ticked on worker threads.
pub trait EventListener: Send {
    fn on_event(&mut self, event: &BossEvent);
}

impl<F> EventListener for F
where
    F: FnMut(&BossEvent) + Send,
{
    fn on_event(&mut self, event: &BossEvent) {
        self(event)
    }
}

/// Fan-out of queued events to any number of listeners.
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<Box<dyn EventListener>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: impl EventListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Delivers and clears every queued event.
    pub fn dispatch(&mut self, queue: &mut EventQueue) {
        for event in queue.drain() {
            for listener in &mut self.listeners {
                listener.on_event(&event);
            }
        }
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Listener that stores every event it receives.
///
/// Cloning shares the same storage, so a host can keep one clone and
/// subscribe the other.
#[derive(Clone, Debug, Default)]
pub struct EventRecorder {
    events: Arc<Mutex<Vec<BossEvent>>>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far.
    pub fn events(&self) -> Vec<BossEvent> {
        self.lock().clone()
    }

    /// Removes and returns everything recorded so far.
    pub fn take(&self) -> Vec<BossEvent> {
        std::mem::take(&mut *self.lock())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<BossEvent>> {
        // Recording survives a poisoned lock.
        self.events.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl EventListener for EventRecorder {
    fn on_event(&mut self, event: &BossEvent) {
        self.lock().push(event.clone());
    }
}
