use glam::Vec3;

use crate::env::{TargetCandidate, TargetView};
use crate::state::EntityRef;

/// Combat is dropped once the held target is this many aggro ranges away.
pub const LEASH_FACTOR: f32 = 1.5;

/// Picks the target for this tick.
///
/// The current target is kept while it is still targetable and within the
/// leash distance. Otherwise the closest targetable candidate inside
/// `aggro_range` is acquired; equal distances keep the earlier candidate.
pub fn acquire(
    current: Option<EntityRef>,
    position: Vec3,
    candidates: &[TargetCandidate],
    aggro_range: f32,
) -> Option<TargetView> {
    if let Some(handle) = current {
        let held = candidates
            .iter()
            .find(|c| c.handle == handle && c.is_targetable())
            .filter(|c| c.position.distance(position) <= aggro_range * LEASH_FACTOR);
        if let Some(candidate) = held {
            return Some(candidate.view());
        }
    }

    let mut best: Option<(&TargetCandidate, f32)> = None;
    for candidate in candidates.iter().filter(|c| c.is_targetable()) {
        let distance = candidate.position.distance(position);
        if distance > aggro_range {
            continue;
        }
        if best.is_none_or(|(_, d)| distance < d) {
            best = Some((candidate, distance));
        }
    }
    best.map(|(candidate, _)| candidate.view())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(id: u32, x: f32) -> TargetCandidate {
        TargetCandidate::new(EntityRef(id), Vec3::new(x, 0.0, 0.0))
    }

    #[test]
    fn acquires_closest_in_range() {
        let candidates = [at(1, 15.0), at(2, 8.0), at(3, 40.0)];
        let target = acquire(None, Vec3::ZERO, &candidates, 20.0);
        assert_eq!(target.map(|t| t.handle), Some(EntityRef(2)));
    }

    #[test]
    fn skips_invalid_and_dead() {
        let mut ghost = at(1, 2.0);
        ghost.is_alive = false;
        let mut ally = at(2, 3.0);
        ally.is_valid_target = false;
        let candidates = [ghost, ally, at(3, 10.0)];
        let target = acquire(None, Vec3::ZERO, &candidates, 20.0);
        assert_eq!(target.map(|t| t.handle), Some(EntityRef(3)));
    }

    #[test]
    fn holds_target_until_leash_breaks() {
        let candidates = [at(1, 25.0), at(2, 5.0)];
        let held = acquire(Some(EntityRef(1)), Vec3::ZERO, &candidates, 20.0);
        assert_eq!(held.map(|t| t.handle), Some(EntityRef(1)));

        let candidates = [at(1, 31.0)];
        assert!(acquire(Some(EntityRef(1)), Vec3::ZERO, &candidates, 20.0).is_none());
    }
}
