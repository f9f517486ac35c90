use super::definition::{PhaseDefinition, PhaseTable};
use crate::error::RequestError;
use crate::events::{BossEvent, EventQueue};

#[derive(Clone, Copy, Debug, PartialEq)]
struct Transition {
    to: usize,
    remaining: f32,
}

/// Tracks the current phase and runs timed transitions between phases.
///
/// The controller only decides *when* to change phase. Applying the new
/// phase's abilities and multipliers, and toggling invulnerability, is left
/// to the owner once [`PhaseController::tick`] reports completion.
#[derive(Clone, Debug)]
pub struct PhaseController {
    table: PhaseTable,
    current: usize,
    transition_duration: f32,
    transition: Option<Transition>,
}

impl PhaseController {
    pub fn new(table: PhaseTable, transition_duration: f32) -> Self {
        Self {
            table,
            current: 0,
            transition_duration,
            transition: None,
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn current_definition(&self) -> &PhaseDefinition {
        &self.table.as_slice()[self.current]
    }

    pub fn definition(&self, index: usize) -> Option<&PhaseDefinition> {
        self.table.get(index)
    }

    pub fn table(&self) -> &PhaseTable {
        &self.table
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    /// Phase the running transition leads to.
    pub fn pending(&self) -> Option<usize> {
        self.transition.map(|t| t.to)
    }

    /// Returns the phase to move to, if `health_percent` has crossed into a
    /// later phase and no transition is already running.
    pub fn evaluate_transition(&self, health_percent: f32) -> Option<usize> {
        if self.transition.is_some() {
            return None;
        }
        let target = self.table.target_phase(health_percent);
        (target > self.current).then_some(target)
    }

    /// Starts a transition toward `to`.
    pub fn begin_transition(&mut self, to: usize, events: &mut EventQueue) -> Result<(), RequestError> {
        if let Some(transition) = self.transition {
            return Err(RequestError::TransitionInFlight(transition.to));
        }
        if to >= self.table.len() || to <= self.current {
            return Err(RequestError::InvalidPhase {
                requested: to,
                current: self.current,
                count: self.table.len(),
            });
        }

        tracing::info!(
            "Phase transition {} -> {} ({})",
            self.current,
            to,
            self.table.get(to).map_or("", |p| p.name.as_str())
        );
        events.emit(BossEvent::PhaseTransitionStarted {
            from: self.current,
            to,
        });
        self.transition = Some(Transition {
            to,
            remaining: self.transition_duration,
        });
        Ok(())
    }

    /// Advances the running transition. Returns the new phase index on completion.
    pub fn tick(&mut self, dt: f32) -> Option<usize> {
        let transition = self.transition.as_mut()?;
        transition.remaining -= dt;
        if transition.remaining > 0.0 {
            return None;
        }

        let to = transition.to;
        self.transition = None;
        self.current = to;
        Some(to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> PhaseController {
        let table = PhaseTable::new(vec![
            PhaseDefinition::new("Opening", 100.0),
            PhaseDefinition::new("Aggressive", 75.0),
            PhaseDefinition::new("Desperate", 50.0),
            PhaseDefinition::new("Enraged", 25.0),
        ])
        .expect("valid table");
        PhaseController::new(table, 3.0)
    }

    #[test]
    fn transition_completes_after_duration() {
        let mut phases = controller();
        let mut events = EventQueue::new();

        assert_eq!(phases.evaluate_transition(70.0), Some(1));
        phases.begin_transition(1, &mut events).expect("valid transition");
        assert!(phases.is_transitioning());
        assert_eq!(
            events.drain().collect::<Vec<_>>(),
            vec![BossEvent::PhaseTransitionStarted { from: 0, to: 1 }]
        );

        assert_eq!(phases.tick(1.5), None);
        assert_eq!(phases.current(), 0);
        assert_eq!(phases.tick(1.5), Some(1));
        assert_eq!(phases.current(), 1);
        assert!(!phases.is_transitioning());
    }

    #[test]
    fn no_evaluation_while_transitioning() {
        let mut phases = controller();
        let mut events = EventQueue::new();
        phases.begin_transition(1, &mut events).expect("valid transition");
        assert_eq!(phases.evaluate_transition(10.0), None);
        assert_eq!(
            phases.begin_transition(2, &mut events),
            Err(RequestError::TransitionInFlight(1))
        );
    }

    #[test]
    fn multi_threshold_drop_jumps_directly() {
        let phases = controller();
        assert_eq!(phases.evaluate_transition(10.0), Some(3));
    }

    #[test]
    fn never_moves_backwards() {
        let mut phases = controller();
        let mut events = EventQueue::new();
        phases.begin_transition(2, &mut events).expect("valid transition");
        phases.tick(3.0);
        assert_eq!(phases.evaluate_transition(90.0), None);
        assert!(matches!(
            phases.begin_transition(1, &mut events),
            Err(RequestError::InvalidPhase { requested: 1, current: 2, .. })
        ));
        assert!(phases.begin_transition(9, &mut events).is_err());
    }
}
