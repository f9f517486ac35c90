//! Ability catalog loader.

use std::path::Path;

use boss_core::AbilityDefinition;
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Ability table structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbilityTable {
    pub abilities: Vec<AbilityDefinition>,
}

/// Loader for ability tables from RON files.
pub struct AbilityLoader;

impl AbilityLoader {
    /// Load ability definitions from a RON file containing an [`AbilityTable`].
    pub fn load(path: &Path) -> LoadResult<Vec<AbilityDefinition>> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("{} ({})", e, path.display()))
    }

    /// Parse ability definitions from RON text.
    ///
    /// Each definition is validated on its own; cross-references to phases
    /// are checked once the whole boss is assembled.
    pub fn parse(content: &str) -> LoadResult<Vec<AbilityDefinition>> {
        let table: AbilityTable = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse ability table RON: {}", e))?;

        for ability in &table.abilities {
            ability.validate()?;
        }
        Ok(table.abilities)
    }
}
