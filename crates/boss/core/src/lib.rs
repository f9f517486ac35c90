//! Tick-driven combat decision engine for boss encounters.
//!
//! `boss-core` decides, moment to moment, what a high-value enemy does. It is
//! a pure library driven by one [`Boss::tick`] call per frame from the host
//! simulation; everything it wants the outside world to do is reported through
//! [`BossEvent`]s.
//!
//! Components are layered bottom-up and owned by the coordinator:
//! - [`ability`] holds the catalog, cooldowns and the cast/perform/cooldown pipeline
//! - [`phase`] maps health to phases and runs the invulnerable transition
//! - [`ai`] perceives, scores candidate decisions and executes one action at a time
//! - [`coordinator`] owns health and combat state and ticks the other three
pub mod ability;
pub mod ai;
pub mod config;
pub mod coordinator;
pub mod env;
pub mod error;
pub mod events;
pub mod phase;
pub mod state;

pub use ability::{
    AbilityCatalog, AbilityDefinition, AbilityId, AbilityKind, AbilityTarget, ExecutionStage,
    RequestOutcome, TargetKind,
};
pub use ai::{
    ActionKind, AiState, Decision, DecisionEngine, DecisionKind, Perception, QueuedAction,
};
pub use config::BossConfig;
pub use coordinator::{Boss, BossDefinition, BossSnapshot};
pub use env::{CombatOracle, PcgRng, RngOracle, TargetCandidate, TargetView, TickInput, compute_seed};
pub use error::{ConfigError, EngineError, ErrorSeverity, RequestError};
pub use events::{BossEvent, EventBus, EventListener, EventQueue, EventRecorder};
pub use phase::{PhaseController, PhaseDefinition, PhaseTable};
pub use state::{BossCombatState, CombatState, EntityRef};

pub use glam::Vec3;
