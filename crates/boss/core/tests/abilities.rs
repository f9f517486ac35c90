mod common;

use boss_core::{
    AbilityDefinition, AbilityKind, Boss, BossDefinition, BossEvent, EntityRef, EventRecorder,
    PhaseDefinition, RequestError, RequestOutcome, TargetKind, Vec3,
};
use common::{ScriptedOracle, abilities, config, phases, player_at, spawn, tick_for};

fn ability_events(events: &[BossEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            BossEvent::AbilityStarted { ability } => Some(format!("start {ability}")),
            BossEvent::AbilityCompleted { ability } => Some(format!("done {ability}")),
            BossEvent::AbilityInterrupted { ability } => Some(format!("cut {ability}")),
            _ => None,
        })
        .collect()
}

#[test]
fn request_while_busy_is_queued_and_runs_after_global_cooldown() {
    let (mut boss, recorder) = spawn();
    let oracle = ScriptedOracle::default();

    assert_eq!(
        boss.try_request_ability("ChargeAttack"),
        Ok(RequestOutcome::Started)
    );
    assert_eq!(
        boss.try_request_ability("UltimateAbility"),
        Ok(RequestOutcome::Queued)
    );
    assert!(boss.catalog().is_pending("UltimateAbility"));

    // ChargeAttack: 1s cast, then completes. Global cooldown: 1s more.
    tick_for(&mut boss, 1.5, &[], &oracle);
    assert_eq!(
        ability_events(&recorder.events()),
        vec!["start ChargeAttack", "done ChargeAttack"]
    );
    assert!(!boss.catalog().is_executing());

    tick_for(&mut boss, 1.0, &[], &oracle);
    assert_eq!(
        ability_events(&recorder.events()),
        vec![
            "start ChargeAttack",
            "done ChargeAttack",
            "start UltimateAbility"
        ]
    );
    assert_eq!(
        boss.catalog().executing().map(|(id, _)| id.as_str()),
        Some("UltimateAbility")
    );
}

#[test]
fn unknown_ability_is_rejected_silently() {
    let (mut boss, recorder) = spawn();
    assert!(!boss.request_ability("Meteor"));
    assert!(!boss.can_use("Meteor"));
    assert!(recorder.is_empty());
}

#[test]
fn abilities_outside_the_phase_are_never_usable() {
    let (mut boss, _recorder) = spawn();
    let oracle = ScriptedOracle::default();

    boss.reset_all_cooldowns();
    assert_eq!(boss.catalog().cooldown_remaining("Quake"), Some(0.0));
    assert!(!boss.can_use("Quake"));
    assert!(matches!(
        boss.try_request_ability("Quake"),
        Err(RequestError::NotInPhase(_))
    ));

    tick_for(&mut boss, 5.0, &[], &oracle);
    assert!(!boss.can_use("Quake"));
}

#[test]
fn cooldowns_stay_within_bounds_during_a_fight() {
    let mut config = common::config();
    config.ability_use_probability = 1.0;
    let (mut boss, _recorder) = common::spawn_with(config);
    let oracle = ScriptedOracle::default();
    let player = [player_at(2.5)];

    for step in 0..600 {
        if step % 50 == 25 {
            boss.apply_damage(900.0, Vec3::ZERO);
        }
        tick_for(&mut boss, 0.1, &player, &oracle);

        let multiplier = boss.catalog().cooldown_multiplier();
        for def in boss.catalog().definitions() {
            let remaining = boss
                .catalog()
                .cooldown_remaining(def.id.as_str())
                .unwrap_or_default();
            assert!(remaining >= 0.0, "{} went negative", def.id);
            assert!(
                remaining <= def.cooldown * multiplier + 1e-4,
                "{} above its cooldown: {}",
                def.id,
                remaining
            );
        }
    }
}

#[test]
fn stun_interrupts_a_cast_without_cooldown() {
    let (mut boss, recorder) = spawn();
    let oracle = ScriptedOracle::default();

    assert!(boss.request_ability("UltimateAbility"));
    tick_for(&mut boss, 0.5, &[], &oracle);
    boss.apply_stun(2.0);

    assert!(!boss.catalog().is_executing());
    assert_eq!(boss.catalog().cooldown_remaining("UltimateAbility"), Some(0.0));
    assert_eq!(
        ability_events(&recorder.events()),
        vec!["start UltimateAbility", "cut UltimateAbility"]
    );
}

#[test]
fn ultimate_damages_every_known_target_with_phase_multiplier() {
    let (mut boss, recorder) = spawn();
    let oracle = ScriptedOracle::default();
    let mut far = player_at(40.0);
    far.handle = boss_core::EntityRef(2);
    let targets = [player_at(5.0), far];

    assert!(boss.request_ability("UltimateAbility"));
    tick_for(&mut boss, 2.5, &targets, &oracle);

    let intents: Vec<_> = recorder
        .events()
        .into_iter()
        .filter_map(|e| match e {
            BossEvent::DamageIntent { target, amount, .. } => Some((target.0, amount)),
            _ => None,
        })
        .collect();
    assert_eq!(intents, vec![(1, 500.0), (2, 500.0)]);
}

/// Boss whose opening phase can blink to a random target.
fn spawn_blinker(seed: u64) -> (Boss, EventRecorder) {
    let mut abilities = abilities();
    abilities.push(
        AbilityDefinition::new("Blink", AbilityKind::Teleport { offset: 3.0 })
            .with_range(60.0)
            .with_cooldown(15.0)
            .with_target(TargetKind::Random),
    );
    let mut phases = phases();
    phases[0] = PhaseDefinition::new("Opening", 100.0).with_abilities(["BasicAttack", "Blink"]);

    let definition = BossDefinition::new("Warden", config().with_seed(seed), abilities, phases);
    let mut boss = Boss::new(definition, Vec3::ZERO).expect("valid boss");
    let recorder = EventRecorder::new();
    boss.subscribe(recorder.clone());
    (boss, recorder)
}

#[test]
fn random_blink_lands_behind_either_target_depending_on_seed() {
    let oracle = ScriptedOracle::default();
    let mut far = player_at(-50.0);
    far.handle = EntityRef(2);
    let targets = [player_at(5.0), far];

    let mut near_side = 0;
    let mut far_side = 0;
    for seed in 0..40 {
        let (mut boss, recorder) = spawn_blinker(seed);
        assert!(boss.request_ability("Blink"));
        tick_for(&mut boss, 0.1, &targets, &oracle);

        let destination = recorder
            .events()
            .into_iter()
            .find_map(|e| match e {
                BossEvent::TeleportRequested { destination, .. } => Some(destination),
                _ => None,
            })
            .expect("blink performed");
        if destination.x > 5.0 {
            near_side += 1;
        } else if destination.x < -50.0 {
            far_side += 1;
        }
    }

    assert!(near_side > 0, "never picked the near target");
    assert!(far_side > 0, "never picked the far target");
    assert_eq!(near_side + far_side, 40);
}

#[test]
fn death_cuts_the_cast_in_flight() {
    let (mut boss, recorder) = spawn();
    let oracle = ScriptedOracle::default();

    assert!(boss.request_ability("UltimateAbility"));
    tick_for(&mut boss, 0.5, &[], &oracle);
    assert!(boss.snapshot().executing.is_some());

    boss.apply_damage(1_000_000.0, Vec3::ZERO);
    assert!(boss.is_dead());
    assert_eq!(boss.snapshot().executing, None);

    tick_for(&mut boss, 3.0, &[], &oracle);
    assert_eq!(
        ability_events(&recorder.events()),
        vec!["start UltimateAbility", "cut UltimateAbility"]
    );
}
