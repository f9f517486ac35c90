//! Phase table loader.

use std::path::Path;

use boss_core::{PhaseDefinition, PhaseTable};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Phase list structure for RON files. Phases are listed opening phase first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseList {
    pub phases: Vec<PhaseDefinition>,
}

/// Loader for phase tables from RON files.
pub struct PhaseLoader;

impl PhaseLoader {
    /// Load phase definitions from a RON file containing a [`PhaseList`].
    pub fn load(path: &Path) -> LoadResult<Vec<PhaseDefinition>> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("{} ({})", e, path.display()))
    }

    /// Parse phase definitions from RON text and check the table's ordering
    /// and multipliers.
    pub fn parse(content: &str) -> LoadResult<Vec<PhaseDefinition>> {
        let list: PhaseList = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse phase table RON: {}", e))?;

        let table = PhaseTable::new(list.phases)?;
        Ok(table.as_slice().to_vec())
    }
}
