//! Boss tuning loader.

use std::path::Path;

use boss_core::BossConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for [`BossConfig`] from TOML files.
///
/// Missing keys keep their defaults, so a config file only lists overrides.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    pub fn load(path: &Path) -> LoadResult<BossConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("{} ({})", e, path.display()))
    }

    /// Parse and validate config data from TOML text.
    pub fn parse(content: &str) -> LoadResult<BossConfig> {
        let config: BossConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;

        config.validate()?;
        Ok(config)
    }
}
