#![allow(dead_code)]

use boss_core::{
    AbilityDefinition, AbilityKind, Boss, BossConfig, BossDefinition, CombatOracle, EntityRef,
    EventRecorder, PhaseDefinition, TargetCandidate, TargetKind, TickInput, Vec3,
};

pub const DT: f32 = 0.1;

/// Oracle with fixed answers.
#[derive(Default)]
pub struct ScriptedOracle {
    pub blocked_sight: bool,
    pub cover: Option<Vec3>,
    pub hits: Vec<EntityRef>,
    pub blocked_path: bool,
}

impl CombatOracle for ScriptedOracle {
    fn line_of_sight(&self, _from: Vec3, _to: Vec3) -> bool {
        !self.blocked_sight
    }

    fn find_cover(&self, _origin: Vec3, _away: Vec3, _radius: f32) -> Option<Vec3> {
        self.cover
    }

    fn overlap(&self, _center: Vec3, _radius: f32) -> Vec<EntityRef> {
        self.hits.clone()
    }

    fn is_path_blocked(&self, _from: Vec3, _to: Vec3) -> bool {
        self.blocked_path
    }
}

/// Deterministic tuning: no ability or cover rolls.
pub fn config() -> BossConfig {
    let mut config = BossConfig::default().with_seed(7);
    config.ability_use_probability = 0.0;
    config.seek_cover_probability = 0.0;
    config
}

pub fn abilities() -> Vec<AbilityDefinition> {
    vec![
        AbilityDefinition::new("BasicAttack", AbilityKind::Melee)
            .with_damage(50.0)
            .with_range(3.0),
        AbilityDefinition::new(
            "ChargeAttack",
            AbilityKind::Charge {
                speed: 20.0,
                hit_radius: 1.5,
                max_duration: 2.0,
            },
        )
        .with_damage(200.0)
        .with_range(25.0)
        .with_cooldown(8.0)
        .with_cast_time(1.0),
        AbilityDefinition::new("UltimateAbility", AbilityKind::Ultimate)
            .with_damage(500.0)
            .with_cooldown(30.0)
            .with_cast_time(2.0)
            .with_target(TargetKind::All),
        AbilityDefinition::new("Quake", AbilityKind::Area { radius: 5.0 })
            .with_damage(150.0)
            .with_range(6.0)
            .with_cooldown(10.0)
            .with_target(TargetKind::Caster),
    ]
}

/// Opening phase plus thresholds at 75, 50 and 25 percent.
pub fn phases() -> Vec<PhaseDefinition> {
    vec![
        PhaseDefinition::new("Opening", 100.0).with_abilities([
            "BasicAttack",
            "ChargeAttack",
            "UltimateAbility",
        ]),
        PhaseDefinition::new("Aggressive", 75.0)
            .with_multipliers(1.2, 1.1, 0.8)
            .with_abilities(["BasicAttack", "ChargeAttack", "UltimateAbility", "Quake"]),
        PhaseDefinition::new("Desperate", 50.0)
            .with_multipliers(1.4, 1.2, 0.6)
            .with_abilities(["BasicAttack", "ChargeAttack", "UltimateAbility", "Quake"]),
        PhaseDefinition::new("Enraged", 25.0)
            .with_multipliers(1.8, 1.3, 0.5)
            .with_abilities(["BasicAttack", "UltimateAbility"]),
    ]
}

pub fn definition_with(config: BossConfig) -> BossDefinition {
    BossDefinition::new("Warden", config, abilities(), phases())
}

/// A boss at the origin with a recorder subscribed.
pub fn spawn() -> (Boss, EventRecorder) {
    spawn_with(config())
}

pub fn spawn_with(config: BossConfig) -> (Boss, EventRecorder) {
    let mut boss = Boss::new(definition_with(config), Vec3::ZERO).expect("valid boss");
    let recorder = EventRecorder::new();
    boss.subscribe(recorder.clone());
    (boss, recorder)
}

pub fn player_at(x: f32) -> TargetCandidate {
    TargetCandidate::new(EntityRef(1), Vec3::new(x, 0.0, 0.0))
}

pub fn tick_for(
    boss: &mut Boss,
    seconds: f32,
    candidates: &[TargetCandidate],
    oracle: &dyn CombatOracle,
) {
    let steps = (seconds / DT).round() as usize;
    for _ in 0..steps {
        boss.tick(&TickInput::new(DT, candidates, oracle));
    }
}
