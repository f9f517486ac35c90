//! Utility scoring for boss decisions.
//!
//! Each generator looks at the [`ScoringContext`] and produces zero or one
//! [`Decision`] (abilities produce one per usable ability). Candidates are
//! collected in a fixed order so that ties resolve the same way every run:
//!
//! 1. Attack
//! 2. Abilities, in catalog order
//! 3. Move
//! 4. Seek cover
//!
//! # Priorities
//!
//! | Candidate | Eligible when | Priority |
//! |-----------|---------------|----------|
//! | Attack | line of sight, `d <= attack_range` | `50 + 10(range - d)`, x0.7 at low health |
//! | Move (retreat) | `d < min` | `45 + 10(min - d)` |
//! | Move (approach) | `d > max` | `30 + 2(d - max)`, capped at 60 |
//! | Move (orbit) | inside the band, no line of sight | `25` |
//! | Seek cover | low health, cover found | `70 + (threshold - health)` |
//!
//! Ability heuristics live in [`ability_priority`].
//!
//! The ground plane is XZ; orbit points rotate about the Y axis.

use arrayvec::ArrayVec;
use glam::Vec3;

use super::perception::Perception;
use super::types::{Decision, DecisionKind};
use crate::ability::{AbilityCatalog, AbilityDefinition, AbilityKind};
use crate::config::BossConfig;
use crate::env::CombatOracle;

/// Candidate buffer for one decision step.
pub type Candidates = ArrayVec<Decision, { BossConfig::MAX_CANDIDATES }>;

/// Read-only blackboard for one decision step.
pub struct ScoringContext<'a> {
    pub position: Vec3,
    pub health_percent: f32,
    pub perception: &'a Perception,
    pub config: &'a BossConfig,
    pub catalog: &'a AbilityCatalog,
    pub oracle: &'a dyn CombatOracle,
    /// Outcome of this step's ability-use roll.
    pub use_abilities: bool,
    /// Outcome of this step's seek-cover roll.
    pub consider_cover: bool,
}

impl ScoringContext<'_> {
    /// Unit vector from the target toward the boss on the ground plane.
    fn away_from(&self, target: Vec3) -> Vec3 {
        let away = Vec3::new(self.position.x - target.x, 0.0, self.position.z - target.z);
        away.try_normalize().unwrap_or(Vec3::X)
    }

    fn is_low_health(&self) -> bool {
        self.health_percent < self.config.low_health_threshold
    }
}

/// Collects every eligible candidate in generation order.
pub fn generate(ctx: &ScoringContext<'_>) -> Candidates {
    let mut candidates = Candidates::new();

    if let Some(decision) = attack(ctx) {
        candidates.push(decision);
    }
    if ctx.use_abilities {
        abilities(ctx, &mut candidates);
    }
    for decision in [movement(ctx), seek_cover(ctx)].into_iter().flatten() {
        if let Err(err) = candidates.try_push(decision) {
            tracing::warn!("Candidate buffer full, dropping {}", err.element().kind);
        }
    }

    candidates
}

pub fn attack(ctx: &ScoringContext<'_>) -> Option<Decision> {
    let target = ctx.perception.target_position()?;
    let distance = ctx.perception.distance;
    let range = ctx.config.attack_range;
    if !ctx.perception.line_of_sight || distance > range {
        return None;
    }

    let mut priority = 50.0 + 10.0 * (range - distance);
    if ctx.is_low_health() {
        priority *= 0.7;
    }
    Some(Decision::new(DecisionKind::Attack, priority, target))
}

/// One candidate per usable ability in the current phase.
pub fn abilities(ctx: &ScoringContext<'_>, out: &mut Candidates) {
    let Some(target) = ctx.perception.target_position() else {
        return;
    };

    for def in ctx.catalog.allowed() {
        if !ctx.catalog.can_use(def.id.as_str()) {
            continue;
        }
        let Some(priority) = ability_priority(
            def,
            ctx.perception.distance,
            ctx.perception.line_of_sight,
            ctx.health_percent,
            ctx.config,
        ) else {
            continue;
        };

        let decision = Decision::use_ability(def.id.clone(), priority, target);
        if out.try_push(decision).is_err() {
            tracing::warn!("Candidate buffer full, skipping {}", def.id);
            return;
        }
    }
}

/// Kind-specific heuristic for one ability. `None` when the ability does not fit.
///
/// - Melee: close targets, `55 + 10(range - d)`
/// - Ranged: farther is better, `40 + 2d`
/// - Area: close targets, `60 + 5(range - d)`
/// - Charge: beyond the minimum distance, `35 + 3d`
/// - Ultimate: grows as health drops, `40 + 0.6(100 - health)`
/// - Summon: grows as health drops, `35 + 0.4(100 - health)`
/// - Teleport: escape when crowded (65) or close the gap (`45 + d`)
pub fn ability_priority(
    def: &AbilityDefinition,
    distance: f32,
    line_of_sight: bool,
    health_percent: f32,
    config: &BossConfig,
) -> Option<f32> {
    if def.kind.needs_line_of_sight() && !line_of_sight {
        return None;
    }
    if !def.in_range(distance) {
        return None;
    }

    let missing = 100.0 - health_percent;
    match def.kind {
        AbilityKind::Melee => Some(55.0 + 10.0 * (def.range - distance).max(0.0)),
        AbilityKind::Ranged { .. } => Some(40.0 + 2.0 * distance),
        AbilityKind::Area { .. } => Some(60.0 + 5.0 * (def.range - distance).max(0.0)),
        AbilityKind::Charge { .. } => {
            (distance > config.min_distance_to_player).then_some(35.0 + 3.0 * distance)
        }
        AbilityKind::Ultimate => Some(40.0 + 0.6 * missing),
        AbilityKind::Summon { .. } => Some(35.0 + 0.4 * missing),
        AbilityKind::Teleport { .. } => {
            if distance < config.min_distance_to_player {
                Some(65.0)
            } else if distance > config.max_distance_to_player {
                Some(45.0 + distance)
            } else {
                None
            }
        }
    }
}

/// Keeps the boss inside the preferred distance band.
pub fn movement(ctx: &ScoringContext<'_>) -> Option<Decision> {
    let target = ctx.perception.target_position()?;
    let distance = ctx.perception.distance;
    let min = ctx.config.min_distance_to_player;
    let max = ctx.config.max_distance_to_player;
    let away = ctx.away_from(target);

    if distance < min {
        let point = target + away * min;
        return Some(Decision::new(
            DecisionKind::Move,
            45.0 + 10.0 * (min - distance),
            point,
        ));
    }
    if distance > max {
        let point = target + away * max;
        let priority = (30.0 + 2.0 * (distance - max)).min(60.0);
        return Some(Decision::new(DecisionKind::Move, priority, point));
    }
    if !ctx.perception.line_of_sight {
        // quarter turn around the target at the band midpoint
        let perpendicular = Vec3::new(-away.z, 0.0, away.x);
        let point = target + perpendicular * ((min + max) * 0.5);
        return Some(Decision::new(DecisionKind::Move, 25.0, point));
    }
    None
}

pub fn seek_cover(ctx: &ScoringContext<'_>) -> Option<Decision> {
    if !ctx.consider_cover || !ctx.is_low_health() {
        return None;
    }
    let target = ctx.perception.target_position()?;
    let away = ctx.away_from(target);
    let cover = ctx
        .oracle
        .find_cover(ctx.position, away, ctx.config.cover_search_radius)?;

    let priority = 70.0 + (ctx.config.low_health_threshold - ctx.health_percent);
    Some(Decision::new(DecisionKind::SeekCover, priority, cover))
}
