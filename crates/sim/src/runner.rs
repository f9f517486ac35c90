//! Fixed-step encounter loop.
//!
//! Each step advances the script (target movement, scripted hits, target
//! attacks), ticks the boss, then resolves the boss's outbound events against
//! the scripted targets.

use std::collections::BTreeMap;
use std::fmt;

use boss_core::{
    Boss, BossDefinition, BossEvent, BossSnapshot, CombatOracle, EntityRef, EventRecorder,
    TargetCandidate, TickInput, Vec3,
};

use crate::arena::ArenaOracle;
use crate::scenario::{Scenario, ScriptedTarget};

/// Projectiles land on targets this close to their aim point.
pub const PROJECTILE_HIT_RADIUS: f32 = 1.5;

#[derive(Clone, Debug)]
struct TargetState {
    script: ScriptedTarget,
    health: f32,
    position: Vec3,
    attack_timer: f32,
    damage_taken: f32,
}

impl TargetState {
    fn handle(&self) -> EntityRef {
        EntityRef(self.script.id)
    }

    fn is_alive(&self) -> bool {
        self.health > 0.0
    }
}

/// Drives one boss through one [`Scenario`].
pub struct Simulation {
    boss: Boss,
    oracle: ArenaOracle,
    targets: Vec<TargetState>,
    scenario: Scenario,
    recorder: EventRecorder,
    clock: f32,
    next_hit: usize,
    next_stun: usize,
    event_counts: BTreeMap<&'static str, usize>,
    defeated_at: Option<f32>,
}

impl Simulation {
    pub fn new(definition: BossDefinition, scenario: Scenario) -> anyhow::Result<Self> {
        let mut boss = Boss::new(definition, scenario.spawn)?;
        let recorder = EventRecorder::new();
        boss.subscribe(recorder.clone());

        let mut scenario = scenario;
        scenario.hits.sort_by(|a, b| a.time.total_cmp(&b.time));
        scenario.stuns.sort_by(|a, b| a.time.total_cmp(&b.time));

        let targets = scenario
            .targets
            .iter()
            .map(|script| TargetState {
                health: script.health,
                position: script.position_at(0.0),
                attack_timer: 0.0,
                damage_taken: 0.0,
                script: script.clone(),
            })
            .collect();

        tracing::info!(
            "Simulating '{}' against '{}' ({} targets)",
            scenario.name,
            boss.name(),
            scenario.targets.len()
        );

        Ok(Self {
            boss,
            oracle: ArenaOracle::new(scenario.arena.clone()),
            targets,
            scenario,
            recorder,
            clock: 0.0,
            next_hit: 0,
            next_stun: 0,
            event_counts: BTreeMap::new(),
            defeated_at: None,
        })
    }

    pub fn boss(&self) -> &Boss {
        &self.boss
    }

    pub fn clock(&self) -> f32 {
        self.clock
    }

    pub fn is_finished(&self) -> bool {
        self.defeated_at.is_some()
    }

    /// Runs until `duration` seconds have passed or the boss is defeated.
    pub fn run(&mut self, duration: f32, dt: f32) -> Summary {
        while self.clock < duration && !self.is_finished() {
            self.step(dt);
        }
        self.summary()
    }

    pub fn step(&mut self, dt: f32) {
        self.clock += dt;
        let now = self.clock;

        self.apply_script(now);
        self.attack_boss(dt, now);

        let candidates: Vec<TargetCandidate> = self
            .targets
            .iter()
            .filter(|t| t.script.is_present(now))
            .map(|t| TargetCandidate {
                is_alive: t.is_alive(),
                ..TargetCandidate::new(t.handle(), t.position)
            })
            .collect();
        self.oracle.set_targets(
            candidates
                .iter()
                .filter(|c| c.is_targetable())
                .map(|c| (c.handle, c.position)),
        );

        self.boss
            .tick(&TickInput::new(dt, &candidates, &self.oracle));

        for event in self.recorder.take() {
            self.resolve(&event);
        }
    }

    fn apply_script(&mut self, now: f32) {
        for target in &mut self.targets {
            target.position = target.script.position_at(now);
        }

        while let Some(hit) = self.scenario.hits.get(self.next_hit) {
            if hit.time > now {
                break;
            }
            self.boss.apply_damage(hit.amount, hit.source);
            self.next_hit += 1;
        }

        while let Some(stun) = self.scenario.stuns.get(self.next_stun) {
            if stun.time > now {
                break;
            }
            tracing::info!("[{:>7.2}s] Stunning boss for {:.1}s", now, stun.duration);
            self.boss.apply_stun(stun.duration);
            self.next_stun += 1;
        }
    }

    /// Target auto-attacks on the boss.
    fn attack_boss(&mut self, dt: f32, now: f32) {
        let boss_position = self.boss.position();
        for target in &mut self.targets {
            let Some(attack) = target.script.attack else {
                continue;
            };
            if !(target.is_alive() && target.script.is_present(now)) {
                continue;
            }
            target.attack_timer += dt;
            if target.attack_timer < attack.interval {
                continue;
            }
            target.attack_timer -= attack.interval;
            if target.position.distance(boss_position) <= attack.reach {
                self.boss.apply_damage(attack.damage, target.position);
            }
        }
    }

    fn resolve(&mut self, event: &BossEvent) {
        *self.event_counts.entry(event.name()).or_default() += 1;
        let now = self.clock;

        match event {
            BossEvent::DamageIntent {
                target,
                amount,
                ability,
            } => {
                tracing::info!("[{:>7.2}s] {} hits {} for {:.0}", now, ability, target, amount);
                self.damage_target(*target, *amount);
            }
            BossEvent::ProjectileLaunched {
                ability,
                origin,
                target_point,
                damage,
                ..
            } => {
                tracing::info!("[{:>7.2}s] {} launched toward {}", now, ability, target_point);
                if self.oracle.line_of_sight(*origin, *target_point) {
                    let struck = self
                        .targets
                        .iter()
                        .filter(|t| t.is_alive() && t.script.is_present(now))
                        .filter(|t| t.position.distance(*target_point) <= PROJECTILE_HIT_RADIUS)
                        .map(TargetState::handle)
                        .next();
                    if let Some(handle) = struck {
                        self.damage_target(handle, *damage);
                    }
                }
            }
            BossEvent::TeleportRequested {
                ability,
                destination,
            } => {
                if self
                    .oracle
                    .is_path_blocked(self.boss.position(), *destination)
                {
                    tracing::info!("[{:>7.2}s] {} blocked at {}", now, ability, destination);
                } else {
                    tracing::info!("[{:>7.2}s] {} to {}", now, ability, destination);
                    self.boss.set_position(*destination);
                }
            }
            BossEvent::Defeated => {
                tracing::info!("[{:>7.2}s] Boss defeated", now);
                self.defeated_at = Some(now);
            }
            BossEvent::AiStateChanged { .. } | BossEvent::HealthChanged { .. } => {
                tracing::debug!("[{:>7.2}s] {:?}", now, event);
            }
            other => tracing::info!("[{:>7.2}s] {:?}", now, other),
        }
    }

    fn damage_target(&mut self, handle: EntityRef, amount: f32) {
        let Some(target) = self.targets.iter_mut().find(|t| t.handle() == handle) else {
            tracing::warn!("Damage for unknown target {}", handle);
            return;
        };
        if !target.is_alive() {
            return;
        }
        target.health = (target.health - amount).max(0.0);
        target.damage_taken += amount;
        if !target.is_alive() {
            tracing::info!("[{:>7.2}s] Target {} died", self.clock, handle);
        }
    }

    pub fn summary(&self) -> Summary {
        Summary {
            scenario: self.scenario.name.clone(),
            elapsed: self.clock,
            boss: self.boss.snapshot(),
            defeated_at: self.defeated_at,
            event_counts: self.event_counts.clone(),
            targets: self
                .targets
                .iter()
                .map(|t| TargetSummary {
                    id: t.script.id,
                    health: t.health,
                    damage_taken: t.damage_taken,
                })
                .collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TargetSummary {
    pub id: u32,
    pub health: f32,
    pub damage_taken: f32,
}

/// End-of-run report.
#[derive(Clone, Debug, PartialEq)]
pub struct Summary {
    pub scenario: String,
    pub elapsed: f32,
    pub boss: BossSnapshot,
    pub defeated_at: Option<f32>,
    pub event_counts: BTreeMap<&'static str, usize>,
    pub targets: Vec<TargetSummary>,
}

impl Summary {
    pub fn count(&self, event: &str) -> usize {
        self.event_counts.get(event).copied().unwrap_or(0)
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Scenario: {} ({:.1}s)", self.scenario, self.elapsed)?;
        writeln!(
            f,
            "Boss: {} {:.0}/{:.0} ({:.1}%), phase {} '{}', {}, {}",
            self.boss.name,
            self.boss.health,
            self.boss.max_health,
            self.boss.health_percent,
            self.boss.phase_index,
            self.boss.phase_name,
            self.boss.ai_state,
            self.boss.combat_state,
        )?;
        match self.defeated_at {
            Some(t) => writeln!(f, "Defeated at {:.1}s", t)?,
            None => writeln!(f, "Still standing")?,
        }
        writeln!(f, "Targets:")?;
        for target in &self.targets {
            writeln!(
                f,
                "  #{}: {:.0} health, {:.0} damage taken",
                target.id, target.health, target.damage_taken
            )?;
        }
        writeln!(f, "Events:")?;
        for (name, count) in &self.event_counts {
            writeln!(f, "  {:<26} {}", name, count)?;
        }
        Ok(())
    }
}
