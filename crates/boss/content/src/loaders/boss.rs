//! Boss directory loader.

use std::path::Path;

use boss_core::{AbilityDefinition, BossConfig, BossDefinition, PhaseDefinition};

use crate::loaders::{AbilityLoader, ConfigLoader, LoadResult, PhaseLoader};

pub const ABILITIES_FILE: &str = "abilities.ron";
pub const PHASES_FILE: &str = "phases.ron";
pub const CONFIG_FILE: &str = "config.toml";

/// Loads a complete boss from a data directory.
///
/// # Directory Structure
///
/// ```text
/// warden/
/// ├── abilities.ron
/// ├── phases.ron
/// └── config.toml   (optional)
/// ```
///
/// The boss is named after the directory.
pub struct BossLoader;

impl BossLoader {
    pub fn load_dir(dir: &Path) -> LoadResult<BossDefinition> {
        let name = dir
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| anyhow::anyhow!("Invalid boss directory {}", dir.display()))?;

        let abilities = AbilityLoader::load(&dir.join(ABILITIES_FILE))?;
        let phases = PhaseLoader::load(&dir.join(PHASES_FILE))?;

        let config_path = dir.join(CONFIG_FILE);
        let config = if config_path.exists() {
            ConfigLoader::load(&config_path)?
        } else {
            tracing::debug!("No {} for '{}', using defaults", CONFIG_FILE, name);
            BossConfig::default()
        };

        Self::assemble(name, config, abilities, phases)
            .map_err(|e| anyhow::anyhow!("{} ({})", e, dir.display()))
    }

    /// Builds and validates a definition from already-parsed parts.
    pub fn assemble(
        name: &str,
        config: BossConfig,
        abilities: Vec<AbilityDefinition>,
        phases: Vec<PhaseDefinition>,
    ) -> LoadResult<BossDefinition> {
        let definition = BossDefinition::new(name, config, abilities, phases);
        definition
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid boss '{}': {}", name, e))?;

        tracing::info!(
            "Loaded boss '{}' ({} abilities, {} phases)",
            name,
            definition.abilities.len(),
            definition.phases.len()
        );
        Ok(definition)
    }
}
