//! Core types for the decision engine.

use glam::Vec3;

use crate::ability::AbilityId;

/// Behavioural state of the boss AI.
///
/// Transitions are event driven: a target being acquired or lost, an action
/// starting or finishing, a stun landing or wearing off.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AiState {
    /// No target and nothing to do.
    #[default]
    Idle,

    /// Target lost for too long; walking patrol waypoints.
    Patrolling,

    /// Holding a target between actions.
    Engaging,

    /// Running the basic attack sequence.
    Attacking,

    /// Waiting on a requested ability.
    UsingAbility,

    /// Travelling to a point (repositioning or searching).
    Moving,

    /// Travelling to cover and holding there.
    SeekingCover,

    /// Externally stunned; no decisions or actions.
    Stunned,
}

/// Kind of a scored candidate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DecisionKind {
    Attack,
    UseAbility,
    Move,
    SeekCover,
}

/// One scored candidate. Produced and consumed within a single decision step.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Decision {
    pub kind: DecisionKind,
    pub priority: f32,
    pub target_point: Vec3,
    pub ability: Option<AbilityId>,
}

impl Decision {
    pub fn new(kind: DecisionKind, priority: f32, target_point: Vec3) -> Self {
        Self {
            kind,
            priority,
            target_point,
            ability: None,
        }
    }

    pub fn use_ability(ability: AbilityId, priority: f32, target_point: Vec3) -> Self {
        Self {
            kind: DecisionKind::UseAbility,
            priority,
            target_point,
            ability: Some(ability),
        }
    }

    /// Converts the winning decision into the action the executor runs.
    pub fn into_action(self, enqueued_at: f32) -> QueuedAction {
        let kind = match self.kind {
            DecisionKind::Attack => ActionKind::Attack,
            DecisionKind::UseAbility => ActionKind::UseAbility,
            DecisionKind::Move => ActionKind::Move,
            DecisionKind::SeekCover => ActionKind::SeekCover,
        };
        QueuedAction {
            kind,
            target_point: self.target_point,
            ability: self.ability,
            enqueued_at,
        }
    }
}

/// Timed sequence the executor can run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionKind {
    Attack,
    UseAbility,
    Move,
    SeekCover,
    /// Walk to the last known target position.
    Search,
    /// Walk to the next patrol waypoint.
    Patrol,
}

impl ActionKind {
    /// Fallback actions queued without a target. Dropped once a target shows up.
    pub fn is_fallback(self) -> bool {
        matches!(self, Self::Search | Self::Patrol)
    }

    /// AI state shown while this action runs.
    pub fn state(self) -> AiState {
        match self {
            Self::Attack => AiState::Attacking,
            Self::UseAbility => AiState::UsingAbility,
            Self::Move | Self::Search => AiState::Moving,
            Self::SeekCover => AiState::SeekingCover,
            Self::Patrol => AiState::Patrolling,
        }
    }
}

/// An action waiting for, or held by, the executor.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QueuedAction {
    pub kind: ActionKind,
    pub target_point: Vec3,
    pub ability: Option<AbilityId>,
    pub enqueued_at: f32,
}

impl QueuedAction {
    pub fn fallback(kind: ActionKind, target_point: Vec3, enqueued_at: f32) -> Self {
        Self {
            kind,
            target_point,
            ability: None,
            enqueued_at,
        }
    }
}
