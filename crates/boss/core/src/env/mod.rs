//! Traits and inputs describing the world outside the boss.
//!
//! The engine never raycasts or queries physics itself. The host supplies a
//! [`CombatOracle`] answering visibility, cover and overlap questions, plus the
//! list of entities that could be targeted this tick.
mod rng;

pub use rng::{PcgRng, RngOracle, compute_seed};

use glam::Vec3;

use crate::state::EntityRef;

/// Physics and collision queries answered by the host.
pub trait CombatOracle {
    /// True when the straight segment `from -> to` is unobstructed.
    fn line_of_sight(&self, from: Vec3, to: Vec3) -> bool;

    /// A point behind the first obstruction found along `away` from `origin`,
    /// searched within `radius`.
    fn find_cover(&self, origin: Vec3, away: Vec3, radius: f32) -> Option<Vec3>;

    /// Entities overlapping the sphere at `center`.
    fn overlap(&self, center: Vec3, radius: f32) -> Vec<EntityRef>;

    /// True when a movement step `from -> to` cannot be taken.
    ///
    /// Pathfinding is the host's concern; the default never blocks.
    fn is_path_blocked(&self, _from: Vec3, _to: Vec3) -> bool {
        false
    }
}

/// An entity the boss could target this tick.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TargetCandidate {
    pub handle: EntityRef,
    pub position: Vec3,
    pub is_valid_target: bool,
    pub is_alive: bool,
}

impl TargetCandidate {
    pub fn new(handle: EntityRef, position: Vec3) -> Self {
        Self {
            handle,
            position,
            is_valid_target: true,
            is_alive: true,
        }
    }

    pub fn is_targetable(&self) -> bool {
        self.is_valid_target && self.is_alive
    }

    pub fn view(&self) -> TargetView {
        TargetView {
            handle: self.handle,
            position: self.position,
        }
    }
}

/// Handle and position of a target as seen this tick.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TargetView {
    pub handle: EntityRef,
    pub position: Vec3,
}

/// Everything the host hands the boss for one tick.
#[derive(Clone, Copy)]
pub struct TickInput<'a> {
    pub dt: f32,
    pub candidates: &'a [TargetCandidate],
    pub oracle: &'a dyn CombatOracle,
}

impl<'a> TickInput<'a> {
    pub fn new(dt: f32, candidates: &'a [TargetCandidate], oracle: &'a dyn CombatOracle) -> Self {
        Self {
            dt,
            candidates,
            oracle,
        }
    }

    /// `dt` with non-finite and negative values clamped to zero.
    pub fn sanitized_dt(&self) -> f32 {
        if self.dt.is_finite() && self.dt > 0.0 {
            self.dt
        } else {
            if self.dt != 0.0 {
                tracing::warn!("Clamping invalid tick delta {}", self.dt);
            }
            0.0
        }
    }

    /// Views of every live, valid candidate.
    pub fn known_targets(&self) -> Vec<TargetView> {
        self.candidates
            .iter()
            .filter(|c| c.is_targetable())
            .map(TargetCandidate::view)
            .collect()
    }
}

impl std::fmt::Debug for TickInput<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TickInput")
            .field("dt", &self.dt)
            .field("candidates", &self.candidates)
            .finish_non_exhaustive()
    }
}
