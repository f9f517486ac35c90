//! Data-driven boss content.
//!
//! Bosses are authored as a directory of data files:
//! - `abilities.ron`: the ability catalog
//! - `phases.ron`: the ordered phase table
//! - `config.toml`: tuning overrides (optional, defaults otherwise)
//!
//! Every loader deserializes straight into boss-core types and the directory
//! loader validates the assembled [`BossDefinition`] before handing it out.
//!
//! One boss ships embedded in the crate, see [`builtin`].

pub mod builtin;
pub mod loaders;

pub use boss_core::BossDefinition;
pub use builtin::{BUILTIN_BOSSES, load_builtin, warden};
pub use loaders::{AbilityLoader, BossLoader, ConfigLoader, LoadResult, PhaseLoader};
