//! Runtime combat state owned by the coordinator.

use std::fmt;

/// Opaque handle to an entity owned by the host simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityRef(pub u32);

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Coarse combat gate used by cosmetic systems (music, UI).
///
/// Independent of the AI state machine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CombatState {
    #[default]
    NotInCombat,
    InCombat,
}

/// Health and combat flags for one boss instance.
///
/// `health` only decreases and `phase_index` never decreases for the lifetime
/// of the boss. Both invariants are enforced by the coordinator.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BossCombatState {
    pub health: f32,
    pub max_health: f32,
    pub phase_index: usize,
    pub is_invulnerable: bool,
    pub in_combat: bool,
    pub target: Option<EntityRef>,
    pub is_dead: bool,
}

impl BossCombatState {
    pub fn new(max_health: f32) -> Self {
        Self {
            health: max_health,
            max_health,
            phase_index: 0,
            is_invulnerable: false,
            in_combat: false,
            target: None,
            is_dead: false,
        }
    }

    /// Current health as a percentage of max health (0-100).
    pub fn health_percent(&self) -> f32 {
        if self.max_health <= 0.0 {
            return 0.0;
        }
        (self.health / self.max_health * 100.0).clamp(0.0, 100.0)
    }

    pub fn combat_state(&self) -> CombatState {
        if self.in_combat {
            CombatState::InCombat
        } else {
            CombatState::NotInCombat
        }
    }

    /// Subtracts damage, flooring at zero. Returns the health actually removed.
    pub(crate) fn take_damage(&mut self, amount: f32) -> f32 {
        let before = self.health;
        self.health = (self.health - amount).max(0.0);
        if self.health <= 0.0 {
            self.health = 0.0;
            self.is_dead = true;
        }
        before - self.health
    }

    /// Raises the phase index, ignoring attempts to lower it.
    pub(crate) fn advance_phase(&mut self, phase: usize) {
        if phase < self.phase_index {
            tracing::warn!(
                "Ignoring phase index decrease {} -> {}",
                self.phase_index,
                phase
            );
            return;
        }
        self.phase_index = phase;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn damage_floors_at_zero_and_marks_dead() {
        let mut state = BossCombatState::new(100.0);
        assert_eq!(state.take_damage(30.0), 30.0);
        assert_eq!(state.health_percent(), 70.0);

        assert_eq!(state.take_damage(500.0), 70.0);
        assert_eq!(state.health, 0.0);
        assert!(state.is_dead);
    }

    #[test]
    fn phase_index_never_decreases() {
        let mut state = BossCombatState::new(100.0);
        state.advance_phase(2);
        state.advance_phase(1);
        assert_eq!(state.phase_index, 2);
    }
}
