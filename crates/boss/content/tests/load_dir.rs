use std::fs;
use std::path::Path;

use boss_content::{BossLoader, warden};
use boss_core::{Boss, Vec3};

const ABILITIES: &str = r#"(abilities: [
    (id: "BasicAttack", damage: 30.0, range: 3.0, cooldown: 0.0, cast_time: 0.0, kind: Melee),
    (id: "Bolt", damage: 60.0, range: 25.0, cooldown: 3.0, cast_time: 0.5, kind: Ranged(projectile_speed: 10.0)),
])"#;

const PHASES: &str = r#"(phases: [
    (name: "Calm", health_threshold_percent: 100.0, damage_multiplier: 1.0, speed_multiplier: 1.0, abilities: ["BasicAttack"]),
    (name: "Angry", health_threshold_percent: 50.0, damage_multiplier: 1.5, speed_multiplier: 1.0, abilities: ["BasicAttack", "Bolt"]),
])"#;

fn write_boss(root: &Path, name: &str, phases: &str, config: Option<&str>) -> std::path::PathBuf {
    let dir = root.join(name);
    fs::create_dir_all(&dir).expect("create boss dir");
    fs::write(dir.join("abilities.ron"), ABILITIES).expect("write abilities");
    fs::write(dir.join("phases.ron"), phases).expect("write phases");
    if let Some(config) = config {
        fs::write(dir.join("config.toml"), config).expect("write config");
    }
    dir
}

#[test]
fn loads_directory_named_after_boss() {
    let root = tempfile::tempdir().expect("tempdir");
    let dir = write_boss(root.path(), "golem", PHASES, Some("max_health = 2000.0\n"));

    let definition = BossLoader::load_dir(&dir).expect("valid boss");
    assert_eq!(definition.name, "golem");
    assert_eq!(definition.config.max_health, 2_000.0);
    assert_eq!(definition.abilities.len(), 2);

    let boss = Boss::new(definition, Vec3::ZERO).expect("boss builds");
    assert_eq!(boss.max_health(), 2_000.0);
    assert!(boss.can_use("BasicAttack"));
    assert!(!boss.can_use("Bolt"));
}

#[test]
fn config_file_is_optional() {
    let root = tempfile::tempdir().expect("tempdir");
    let dir = write_boss(root.path(), "golem", PHASES, None);

    let definition = BossLoader::load_dir(&dir).expect("valid boss");
    assert_eq!(definition.config, boss_core::BossConfig::default());
}

#[test]
fn phase_with_unknown_ability_is_rejected() {
    let root = tempfile::tempdir().expect("tempdir");
    let phases = r#"(phases: [
        (name: "Calm", health_threshold_percent: 100.0, damage_multiplier: 1.0, speed_multiplier: 1.0, abilities: ["BasicAttack", "Meteor"]),
    ])"#;
    let dir = write_boss(root.path(), "golem", phases, None);

    let err = BossLoader::load_dir(&dir).expect_err("unknown ability");
    let message = err.to_string();
    assert!(message.contains("Meteor"), "{message}");
    assert!(message.contains("golem"), "{message}");
}

#[test]
fn missing_file_names_the_path() {
    let root = tempfile::tempdir().expect("tempdir");
    let dir = root.path().join("empty");
    fs::create_dir_all(&dir).expect("create dir");

    let err = BossLoader::load_dir(&dir).expect_err("no files");
    assert!(err.to_string().contains("abilities.ron"));
}

#[test]
fn warden_fights() {
    let definition = warden().expect("built-in warden");
    assert_eq!(definition.phases.len(), 4);
    assert_eq!(definition.config.patrol_points.len(), 4);

    let mut boss = Boss::new(definition, Vec3::ZERO).expect("warden builds");
    assert_eq!(boss.snapshot().phase_name, "Opening");
    assert!(boss.can_use("ChargeAttack"));
    assert!(!boss.can_use("UltimateAbility"));

    // 12000 max health: 9000 damage drops to 25%, inside the 40% phase.
    boss.apply_damage(9_000.0, Vec3::ZERO);
    assert_eq!(boss.phases().pending(), Some(2));
}
