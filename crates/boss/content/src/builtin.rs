//! Bosses embedded in the crate.

use crate::loaders::{AbilityLoader, BossLoader, ConfigLoader, LoadResult, PhaseLoader};
use boss_core::BossDefinition;

/// Names accepted by [`load_builtin`].
pub const BUILTIN_BOSSES: &[&str] = &["warden"];

/// The Warden: a four-phase melee bruiser with a charge, a ranged bolt,
/// adds and an ultimate.
pub fn warden() -> LoadResult<BossDefinition> {
    let abilities = AbilityLoader::parse(include_str!("../data/warden/abilities.ron"))?;
    let phases = PhaseLoader::parse(include_str!("../data/warden/phases.ron"))?;
    let config = ConfigLoader::parse(include_str!("../data/warden/config.toml"))?;
    BossLoader::assemble("warden", config, abilities, phases)
}

pub fn load_builtin(name: &str) -> LoadResult<BossDefinition> {
    match name {
        "warden" => warden(),
        other => Err(anyhow::anyhow!(
            "Unknown built-in boss '{}' (available: {})",
            other,
            BUILTIN_BOSSES.join(", ")
        )),
    }
}
