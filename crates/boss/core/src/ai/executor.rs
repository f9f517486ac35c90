//! Runs one queued action at a time as an elapsed-time state machine.
//!
//! | Action | Sequence |
//! |--------|----------|
//! | Attack | face target, windup, request basic attack, recovery |
//! | UseAbility | request ability, wait until the catalog is done with it |
//! | Move / Search / Patrol | interpolate toward the point |
//! | SeekCover | interpolate toward cover, then dwell |

use glam::Vec3;

use super::types::{ActionKind, QueuedAction};
use crate::ability::{AbilityCatalog, AbilityTarget};
use crate::config::BossConfig;
use crate::env::{CombatOracle, TargetView};
use crate::events::EventQueue;

/// World access for one executor step.
pub(crate) struct ActionContext<'a, 'e> {
    pub position: &'a mut Vec3,
    pub facing: &'a mut Vec3,
    pub target: Option<TargetView>,
    pub speed_multiplier: f32,
    pub config: &'a BossConfig,
    pub catalog: &'a mut AbilityCatalog,
    pub oracle: &'a dyn CombatOracle,
    pub events: &'e mut EventQueue,
}

impl ActionContext<'_, '_> {
    fn face(&mut self, point: Vec3) {
        let direction = Vec3::new(point.x - self.position.x, 0.0, point.z - self.position.z);
        if let Some(direction) = direction.try_normalize() {
            *self.facing = direction;
        }
    }

    fn ability_target(&self, fallback: Vec3) -> AbilityTarget {
        self.target
            .map(AbilityTarget::from)
            .unwrap_or_else(|| AbilityTarget::point(fallback))
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Step {
    Windup { elapsed: f32 },
    Recovery { elapsed: f32 },
    AwaitAbility { elapsed: f32 },
    Travel { from: Vec3, elapsed: f32, duration: f32 },
    Dwell { elapsed: f32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ActionStatus {
    Running,
    Completed,
    Failed,
}

#[derive(Clone, Debug, PartialEq)]
struct RunningAction {
    action: QueuedAction,
    step: Step,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct ActionExecutor {
    current: Option<RunningAction>,
}

impl ActionExecutor {
    pub fn is_busy(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&self) -> Option<&QueuedAction> {
        self.current.as_ref().map(|r| &r.action)
    }

    /// Starts `action`. Returns `false` if it failed before taking any time.
    pub fn start(&mut self, action: QueuedAction, ctx: &mut ActionContext<'_, '_>) -> bool {
        debug_assert!(self.current.is_none(), "executor already busy");
        tracing::debug!("Starting {} action toward {}", action.kind, action.target_point);

        let step = match action.kind {
            ActionKind::Attack => {
                let aim = ctx.target.map_or(action.target_point, |t| t.position);
                ctx.face(aim);
                Step::Windup { elapsed: 0.0 }
            }
            ActionKind::UseAbility => {
                let Some(ability) = action.ability.as_ref() else {
                    tracing::warn!("UseAbility action without an ability");
                    return false;
                };
                let target = ctx.ability_target(action.target_point);
                ctx.face(target.point);
                if !ctx.catalog.request(ability.as_str(), target, ctx.events) {
                    return false;
                }
                Step::AwaitAbility { elapsed: 0.0 }
            }
            ActionKind::Move | ActionKind::Search | ActionKind::Patrol | ActionKind::SeekCover => {
                let speed = ctx.config.move_speed * ctx.speed_multiplier;
                let distance = ctx.position.distance(action.target_point);
                Step::Travel {
                    from: *ctx.position,
                    elapsed: 0.0,
                    duration: if speed > 0.0 { distance / speed } else { 0.0 },
                }
            }
        };

        self.current = Some(RunningAction { action, step });
        true
    }

    /// Drops the running action without finishing it.
    pub fn abandon(&mut self) -> Option<QueuedAction> {
        let running = self.current.take()?;
        tracing::debug!("Abandoned {} action", running.action.kind);
        Some(running.action)
    }

    /// Advances the running action by `dt`.
    ///
    /// The action is cleared once it reports [`ActionStatus::Completed`] or
    /// [`ActionStatus::Failed`].
    pub fn advance(&mut self, dt: f32, ctx: &mut ActionContext<'_, '_>) -> ActionStatus {
        let Some(running) = self.current.as_mut() else {
            return ActionStatus::Completed;
        };
        let status = advance_step(running, dt, ctx);
        if status != ActionStatus::Running {
            self.current = None;
        }
        status
    }
}

fn advance_step(running: &mut RunningAction, dt: f32, ctx: &mut ActionContext<'_, '_>) -> ActionStatus {
    let action = &running.action;
    match &mut running.step {
        Step::Windup { elapsed } => {
            *elapsed += dt;
            if *elapsed < ctx.config.attack_windup {
                return ActionStatus::Running;
            }
            let leftover = *elapsed - ctx.config.attack_windup;
            let target = ctx.ability_target(action.target_point);
            ctx.face(target.point);
            if !ctx
                .catalog
                .request(ctx.config.basic_attack.as_str(), target, ctx.events)
            {
                return ActionStatus::Failed;
            }
            running.step = Step::Recovery { elapsed: leftover };
            ActionStatus::Running
        }

        Step::Recovery { elapsed } => {
            *elapsed += dt;
            if *elapsed < ctx.config.attack_recovery {
                ActionStatus::Running
            } else {
                ActionStatus::Completed
            }
        }

        Step::AwaitAbility { elapsed } => {
            *elapsed += dt;
            let pending = action
                .ability
                .as_ref()
                .is_some_and(|id| ctx.catalog.is_pending(id.as_str()));
            if !pending {
                return ActionStatus::Completed;
            }
            if *elapsed >= ctx.config.ability_action_timeout {
                tracing::debug!("Stopped waiting on {:?}", action.ability);
                return ActionStatus::Completed;
            }
            ActionStatus::Running
        }

        Step::Travel {
            from,
            elapsed,
            duration,
        } => {
            *elapsed += dt;
            let t = if *duration > 0.0 {
                (*elapsed / *duration).min(1.0)
            } else {
                1.0
            };
            let next = from.lerp(action.target_point, t);
            if ctx.oracle.is_path_blocked(*ctx.position, next) {
                tracing::debug!("{} action blocked at {}", action.kind, *ctx.position);
                return ActionStatus::Failed;
            }

            let look_at = ctx.target.map_or(action.target_point, |t| t.position);
            *ctx.position = next;
            ctx.face(look_at);

            if t < 1.0 {
                return ActionStatus::Running;
            }
            if action.kind == ActionKind::SeekCover {
                running.step = Step::Dwell { elapsed: 0.0 };
                return ActionStatus::Running;
            }
            ActionStatus::Completed
        }

        Step::Dwell { elapsed } => {
            *elapsed += dt;
            if *elapsed < ctx.config.cover_dwell {
                ActionStatus::Running
            } else {
                ActionStatus::Completed
            }
        }
    }
}
