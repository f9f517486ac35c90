//! Flat circular arena with round pillars, answering the boss's world queries.
//!
//! All geometry is 2D on the XZ plane; heights are ignored.

use boss_core::{CombatOracle, EntityRef, Vec3};
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Distance kept between a cover point and the pillar surface.
pub const COVER_MARGIN: f32 = 1.0;
/// Body radius of every scripted target.
pub const TARGET_RADIUS: f32 = 0.5;

/// A round obstruction blocking sight and movement.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pillar {
    pub center: Vec3,
    pub radius: f32,
}

impl Pillar {
    fn contains(&self, point: Vec2) -> bool {
        flat(self.center).distance(point) < self.radius
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ArenaSpec {
    /// Movement beyond this distance from the origin is blocked. Zero means unbounded.
    #[serde(default)]
    pub radius: f32,
    #[serde(default)]
    pub pillars: Vec<Pillar>,
}

/// [`CombatOracle`] over an [`ArenaSpec`] and the targets alive this tick.
#[derive(Clone, Debug, Default)]
pub struct ArenaOracle {
    spec: ArenaSpec,
    targets: Vec<(EntityRef, Vec3)>,
}

impl ArenaOracle {
    pub fn new(spec: ArenaSpec) -> Self {
        Self {
            spec,
            targets: Vec::new(),
        }
    }

    pub fn spec(&self) -> &ArenaSpec {
        &self.spec
    }

    /// Replaces the overlap-able targets for the coming tick.
    pub fn set_targets(&mut self, targets: impl IntoIterator<Item = (EntityRef, Vec3)>) {
        self.targets.clear();
        self.targets.extend(targets);
    }

    fn out_of_bounds(&self, point: Vec2) -> bool {
        self.spec.radius > 0.0 && point.length() > self.spec.radius
    }
}

impl CombatOracle for ArenaOracle {
    fn line_of_sight(&self, from: Vec3, to: Vec3) -> bool {
        let (a, b) = (flat(from), flat(to));
        !self
            .spec
            .pillars
            .iter()
            .any(|p| segment_distance(flat(p.center), a, b) < p.radius)
    }

    fn find_cover(&self, origin: Vec3, away: Vec3, radius: f32) -> Option<Vec3> {
        let away = flat(away).try_normalize()?;
        let origin_2d = flat(origin);

        self.spec
            .pillars
            .iter()
            .filter(|p| flat(p.center).distance(origin_2d) <= radius)
            .map(|p| flat(p.center) + away * (p.radius + COVER_MARGIN))
            .filter(|spot| !self.out_of_bounds(*spot))
            .min_by(|a, b| a.distance(origin_2d).total_cmp(&b.distance(origin_2d)))
            .map(|spot| Vec3::new(spot.x, origin.y, spot.y))
    }

    fn overlap(&self, center: Vec3, radius: f32) -> Vec<EntityRef> {
        let center = flat(center);
        self.targets
            .iter()
            .filter(|(_, position)| flat(*position).distance(center) <= radius + TARGET_RADIUS)
            .map(|(handle, _)| *handle)
            .collect()
    }

    fn is_path_blocked(&self, _from: Vec3, to: Vec3) -> bool {
        let to = flat(to);
        self.out_of_bounds(to) || self.spec.pillars.iter().any(|p| p.contains(to))
    }
}

fn flat(v: Vec3) -> Vec2 {
    Vec2::new(v.x, v.z)
}

/// Shortest distance from `point` to the segment `a -> b`.
fn segment_distance(point: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let length_squared = ab.length_squared();
    let t = if length_squared > 0.0 {
        ((point - a).dot(ab) / length_squared).clamp(0.0, 1.0)
    } else {
        0.0
    };
    point.distance(a + ab * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arena() -> ArenaOracle {
        ArenaOracle::new(ArenaSpec {
            radius: 30.0,
            pillars: vec![Pillar {
                center: Vec3::new(5.0, 0.0, 0.0),
                radius: 1.0,
            }],
        })
    }

    #[test]
    fn pillar_blocks_sight() {
        let arena = arena();
        assert!(!arena.line_of_sight(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0)));
        assert!(arena.line_of_sight(Vec3::ZERO, Vec3::new(10.0, 0.0, 3.0)));
        // Segment ends before the pillar.
        assert!(arena.line_of_sight(Vec3::ZERO, Vec3::new(3.0, 0.0, 0.0)));
    }

    #[test]
    fn cover_is_behind_the_pillar() {
        let arena = arena();
        let cover = arena.find_cover(Vec3::new(3.0, 0.0, 0.0), Vec3::X, 10.0);
        assert_eq!(cover, Some(Vec3::new(7.0, 0.0, 0.0)));

        assert!(arena.find_cover(Vec3::new(-20.0, 0.0, 0.0), Vec3::X, 10.0).is_none());
        assert!(arena.find_cover(Vec3::ZERO, Vec3::ZERO, 10.0).is_none());
    }

    #[test]
    fn overlap_counts_body_radius() {
        let mut arena = arena();
        arena.set_targets([
            (EntityRef(1), Vec3::new(2.4, 0.0, 0.0)),
            (EntityRef(2), Vec3::new(2.6, 0.0, 0.0)),
        ]);
        assert_eq!(arena.overlap(Vec3::ZERO, 2.0), vec![EntityRef(1)]);
    }

    #[test]
    fn pillars_and_walls_block_movement() {
        let arena = arena();
        assert!(arena.is_path_blocked(Vec3::ZERO, Vec3::new(5.5, 0.0, 0.0)));
        assert!(arena.is_path_blocked(Vec3::ZERO, Vec3::new(31.0, 0.0, 0.0)));
        assert!(!arena.is_path_blocked(Vec3::ZERO, Vec3::new(0.0, 0.0, 5.0)));
    }
}
