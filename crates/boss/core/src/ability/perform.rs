//! Kind-specific effect routines for the perform stage.
//!
//! [`perform_step`] is the single dispatcher over [`AbilityKind`]. Effects are
//! never applied directly: every routine reports what should happen through
//! [`BossEvent`]s. Only the charge moves the boss, and only through the
//! position handed in by the coordinator.

use glam::Vec3;

use super::definition::{AbilityDefinition, AbilityKind, TargetKind};
use crate::env::{CombatOracle, TargetView};
use crate::events::{BossEvent, EventQueue};
use crate::state::EntityRef;

/// Target captured when the ability was requested.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilityTarget {
    pub handle: Option<EntityRef>,
    pub point: Vec3,
}

impl AbilityTarget {
    pub fn entity(handle: EntityRef, point: Vec3) -> Self {
        Self {
            handle: Some(handle),
            point,
        }
    }

    pub fn point(point: Vec3) -> Self {
        Self {
            handle: None,
            point,
        }
    }
}

impl From<TargetView> for AbilityTarget {
    fn from(view: TargetView) -> Self {
        Self::entity(view.handle, view.position)
    }
}

/// World access for one perform step.
pub struct PerformContext<'a> {
    /// Boss position. Only the charge writes to it.
    pub position: &'a mut Vec3,
    /// Every live, valid target this tick.
    pub known_targets: &'a [TargetView],
    pub oracle: &'a dyn CombatOracle,
    pub damage_multiplier: f32,
    /// Pre-rolled random value for [`TargetKind::Random`].
    pub random: u32,
}

impl PerformContext<'_> {
    fn position_of(&self, handle: EntityRef) -> Option<Vec3> {
        self.known_targets
            .iter()
            .find(|t| t.handle == handle)
            .map(|t| t.position)
    }

    /// Where the requested target is now, falling back to where it was.
    fn live_point(&self, target: &AbilityTarget) -> Vec3 {
        target
            .handle
            .and_then(|h| self.position_of(h))
            .unwrap_or(target.point)
    }
}

/// Progress kept across ticks while an ability performs.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct PerformState {
    pub elapsed: f32,
    /// Entities already damaged by this execution.
    pub hits: Vec<EntityRef>,
    /// Charge aim, resolved on the first step.
    pub aim: Option<AbilityTarget>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PerformStatus {
    Done,
    Continue,
}

/// Runs one step of the perform stage. Everything but the charge finishes immediately.
pub(crate) fn perform_step(
    def: &AbilityDefinition,
    target: &AbilityTarget,
    state: &mut PerformState,
    dt: f32,
    ctx: &mut PerformContext<'_>,
    events: &mut EventQueue,
) -> PerformStatus {
    let damage = def.damage * ctx.damage_multiplier;

    match &def.kind {
        AbilityKind::Melee => {
            let origin = *ctx.position;
            for (handle, position) in resolve_targets(def, target, def.range, ctx) {
                let in_reach = position.is_none_or(|p| def.in_range(p.distance(origin)));
                if in_reach {
                    damage_intent(def, handle, damage, events);
                } else {
                    tracing::debug!("{} missed {}: target moved out of range", def.id, handle);
                }
            }
            PerformStatus::Done
        }

        AbilityKind::Ranged { projectile_speed } => {
            let target_point = resolve_targets(def, target, def.range, ctx)
                .first()
                .and_then(|(_, position)| *position)
                .unwrap_or_else(|| ctx.live_point(target));
            events.emit(BossEvent::ProjectileLaunched {
                ability: def.id.clone(),
                origin: *ctx.position,
                target_point,
                speed: *projectile_speed,
                damage,
            });
            PerformStatus::Done
        }

        AbilityKind::Area { radius } => {
            let centers: Vec<Vec3> = match def.target {
                TargetKind::All => ctx.known_targets.iter().map(|t| t.position).collect(),
                _ => {
                    let aim = resolve_aim(def, target, ctx);
                    vec![ctx.live_point(&aim)]
                }
            };
            let mut struck = Vec::new();
            for center in centers {
                for handle in ctx.oracle.overlap(center, *radius) {
                    if !struck.contains(&handle) {
                        struck.push(handle);
                        damage_intent(def, handle, damage, events);
                    }
                }
            }
            PerformStatus::Done
        }

        AbilityKind::Charge {
            speed,
            hit_radius,
            max_duration,
        } => {
            let locked = match state.aim {
                Some(locked) => locked,
                None => {
                    let locked = resolve_aim(def, target, ctx);
                    state.aim = Some(locked);
                    locked
                }
            };
            let aim = ctx.live_point(&locked);
            let from = *ctx.position;
            let offset = aim - from;
            let distance = offset.length();
            let step = (speed * dt).min(distance);
            let next = from + offset.normalize_or_zero() * step;

            if ctx.oracle.is_path_blocked(from, next) {
                tracing::debug!("{} stopped: path blocked", def.id);
                return PerformStatus::Done;
            }
            *ctx.position = next;

            for handle in ctx.oracle.overlap(next, *hit_radius) {
                if !state.hits.contains(&handle) {
                    state.hits.push(handle);
                    damage_intent(def, handle, damage, events);
                }
            }

            state.elapsed += dt;
            let arrived = next.distance(aim) <= *hit_radius;
            if arrived || state.elapsed >= *max_duration {
                PerformStatus::Done
            } else {
                PerformStatus::Continue
            }
        }

        AbilityKind::Ultimate => {
            for (handle, _) in resolve_targets(def, target, def.range, ctx) {
                damage_intent(def, handle, damage, events);
            }
            PerformStatus::Done
        }

        AbilityKind::Summon { creature, count } => {
            events.emit(BossEvent::SummonRequested {
                ability: def.id.clone(),
                creature: creature.clone(),
                count: *count,
                around: *ctx.position,
            });
            PerformStatus::Done
        }

        AbilityKind::Teleport { offset } => {
            let aimed = resolve_aim(def, target, ctx);
            let aim = ctx.live_point(&aimed);
            let behind = (aim - *ctx.position).normalize_or_zero();
            events.emit(BossEvent::TeleportRequested {
                ability: def.id.clone(),
                destination: aim + behind * *offset,
            });
            PerformStatus::Done
        }
    }
}

/// Where an ability is aimed according to its [`TargetKind`].
///
/// `Single`, `Area` and `All` aim at the requested target.
fn resolve_aim(
    def: &AbilityDefinition,
    target: &AbilityTarget,
    ctx: &PerformContext<'_>,
) -> AbilityTarget {
    match def.target {
        TargetKind::Caster => AbilityTarget::point(*ctx.position),
        TargetKind::Random => random_pick(ctx).map_or(*target, AbilityTarget::from),
        TargetKind::Single | TargetKind::Area | TargetKind::All => *target,
    }
}

fn random_pick(ctx: &PerformContext<'_>) -> Option<TargetView> {
    if ctx.known_targets.is_empty() {
        return None;
    }
    Some(ctx.known_targets[ctx.random as usize % ctx.known_targets.len()])
}

/// Resolves who is affected according to the ability's [`TargetKind`].
///
/// Positions are known for listed targets; overlap hits carry none.
fn resolve_targets(
    def: &AbilityDefinition,
    target: &AbilityTarget,
    radius: f32,
    ctx: &PerformContext<'_>,
) -> Vec<(EntityRef, Option<Vec3>)> {
    match def.target {
        TargetKind::Single => target
            .handle
            .and_then(|h| ctx.position_of(h).map(|p| (h, Some(p))))
            .into_iter()
            .collect(),
        TargetKind::All => ctx
            .known_targets
            .iter()
            .map(|t| (t.handle, Some(t.position)))
            .collect(),
        TargetKind::Random => random_pick(ctx)
            .map(|pick| (pick.handle, Some(pick.position)))
            .into_iter()
            .collect(),
        TargetKind::Area => overlap_or_all(ctx.live_point(target), radius, ctx),
        TargetKind::Caster => overlap_or_all(*ctx.position, radius, ctx),
    }
}

/// Overlap around `center`. Zero radius means unlimited: every known target.
fn overlap_or_all(
    center: Vec3,
    radius: f32,
    ctx: &PerformContext<'_>,
) -> Vec<(EntityRef, Option<Vec3>)> {
    if radius <= 0.0 {
        return ctx
            .known_targets
            .iter()
            .map(|t| (t.handle, Some(t.position)))
            .collect();
    }
    ctx.oracle
        .overlap(center, radius)
        .into_iter()
        .map(|h| (h, None))
        .collect()
}

fn damage_intent(def: &AbilityDefinition, target: EntityRef, amount: f32, events: &mut EventQueue) {
    if amount <= 0.0 {
        return;
    }
    events.emit(BossEvent::DamageIntent {
        target,
        amount,
        ability: def.id.clone(),
    });
}
