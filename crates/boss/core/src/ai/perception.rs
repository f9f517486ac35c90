use glam::Vec3;

use crate::env::{CombatOracle, TargetView};

/// What the boss knows about its target this tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Perception {
    pub target: Option<TargetView>,
    /// Last position the target was seen at. Survives losing the target.
    pub last_known_position: Option<Vec3>,
    pub line_of_sight: bool,
    /// Seconds since the target was last present and visible.
    pub lost_time: f32,
    /// Distance to the target, or infinity without one.
    pub distance: f32,
}

impl Default for Perception {
    fn default() -> Self {
        Self {
            target: None,
            last_known_position: None,
            line_of_sight: false,
            lost_time: 0.0,
            distance: f32::INFINITY,
        }
    }
}

impl Perception {
    pub fn update(
        &mut self,
        position: Vec3,
        target: Option<TargetView>,
        oracle: &dyn CombatOracle,
        dt: f32,
    ) {
        self.target = target;
        match target {
            Some(view) => {
                self.line_of_sight = oracle.line_of_sight(position, view.position);
                self.distance = position.distance(view.position);
                self.last_known_position = Some(view.position);
            }
            None => {
                self.line_of_sight = false;
                self.distance = f32::INFINITY;
            }
        }

        if self.can_see_target() {
            self.lost_time = 0.0;
        } else {
            self.lost_time += dt;
        }
    }

    pub fn has_target(&self) -> bool {
        self.target.is_some()
    }

    pub fn can_see_target(&self) -> bool {
        self.target.is_some() && self.line_of_sight
    }

    pub fn target_position(&self) -> Option<Vec3> {
        self.target.map(|t| t.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::EntityRef;

    struct Wall(bool);

    impl CombatOracle for Wall {
        fn line_of_sight(&self, _: Vec3, _: Vec3) -> bool {
            !self.0
        }
        fn find_cover(&self, _: Vec3, _: Vec3, _: f32) -> Option<Vec3> {
            None
        }
        fn overlap(&self, _: Vec3, _: f32) -> Vec<EntityRef> {
            Vec::new()
        }
    }

    fn target(x: f32) -> Option<TargetView> {
        Some(TargetView {
            handle: EntityRef(1),
            position: Vec3::new(x, 0.0, 0.0),
        })
    }

    #[test]
    fn lost_time_accumulates_without_target() {
        let mut perception = Perception::default();
        perception.update(Vec3::ZERO, target(4.0), &Wall(false), 0.5);
        assert_eq!(perception.lost_time, 0.0);
        assert_eq!(perception.distance, 4.0);

        perception.update(Vec3::ZERO, None, &Wall(false), 0.5);
        perception.update(Vec3::ZERO, None, &Wall(false), 0.5);
        assert_eq!(perception.lost_time, 1.0);
        assert_eq!(perception.last_known_position, Some(Vec3::new(4.0, 0.0, 0.0)));
        assert!(!perception.has_target());
    }

    #[test]
    fn hidden_target_counts_as_lost() {
        let mut perception = Perception::default();
        perception.update(Vec3::ZERO, target(4.0), &Wall(true), 0.25);
        assert!(perception.has_target());
        assert!(!perception.can_see_target());
        assert_eq!(perception.lost_time, 0.25);
    }
}
