//! Common error infrastructure for boss-core.
//!
//! Two error families exist:
//!
//! - [`ConfigError`]: malformed authored data. Fatal at load time; a boss cannot
//!   be constructed from a definition that fails validation.
//! - [`RequestError`]: a request that cannot be honoured right now (unknown
//!   ability, phase gating, suspended pipeline). Logged and ignored by the
//!   public entry points, which return `false`/`None` instead.
//!
//! Transient unavailability (cooldowns, busy pipeline, no line of sight) is not
//! an error at all and never appears here.

use crate::ability::AbilityId;

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: Temporary conditions that may succeed later
/// - **Validation**: Invalid input that should be rejected without retry
/// - **Internal**: Unexpected state inconsistencies that require investigation
/// - **Fatal**: The boss cannot operate with this input
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Can retry with the same or an alternative request.
    ///
    /// Examples: pipeline suspended during a phase transition
    Recoverable,

    /// Invalid input, should not retry without changes.
    ///
    /// Examples: unknown ability id, ability outside the phase set
    Validation,

    /// Unexpected state inconsistency.
    Internal,

    /// Unrecoverable, the boss must not enter combat.
    ///
    /// Examples: ascending phase thresholds, duplicate ability ids
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates an internal bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all boss-core errors.
///
/// - All error enums implement this trait
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait EngineError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

// ============================================================================
// Configuration Errors
// ============================================================================

/// Errors detected while validating authored boss data.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// The phase table is empty.
    #[error("boss must define at least one phase")]
    NoPhases,

    /// Phase thresholds must be strictly descending.
    #[error(
        "phase {index} threshold {current}% must be strictly below the previous threshold {previous}%"
    )]
    ThresholdNotDescending {
        index: usize,
        previous: f32,
        current: f32,
    },

    /// Phase threshold outside (0, 100].
    #[error("phase {index} threshold {value}% is outside (0, 100]")]
    ThresholdOutOfRange { index: usize, value: f32 },

    /// The first phase must start at full health.
    #[error("first phase threshold is {0}%, expected an opening phase at 100%")]
    MissingOpeningPhase(f32),

    /// A phase multiplier is non-finite or out of range.
    #[error("phase {index} has invalid {field} multiplier {value}")]
    InvalidMultiplier {
        index: usize,
        field: &'static str,
        value: f32,
    },

    /// Phase ability sets exceed the candidate capacity.
    #[error("phase {index} lists {count} abilities (max {max})")]
    TooManyAbilities {
        index: usize,
        count: usize,
        max: usize,
    },

    /// Two ability definitions share an id.
    #[error("duplicate ability id '{0}'")]
    DuplicateAbility(AbilityId),

    /// A phase references an ability missing from the catalog.
    #[error("phase {phase} references unknown ability '{ability}'")]
    UnknownAbilityInPhase { phase: usize, ability: AbilityId },

    /// An ability definition carries invalid numbers.
    #[error("ability '{id}' is invalid: {reason}")]
    InvalidAbility { id: AbilityId, reason: &'static str },

    /// Max health must be positive and finite.
    #[error("max health must be positive, got {0}")]
    InvalidMaxHealth(f32),

    /// A tuning value in [`crate::BossConfig`] is out of range.
    #[error("invalid tuning value for '{field}': {value}")]
    InvalidTuning { field: &'static str, value: f32 },
}

impl EngineError for ConfigError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        use ConfigError::*;
        match self {
            NoPhases => "CONFIG_NO_PHASES",
            ThresholdNotDescending { .. } => "CONFIG_THRESHOLD_NOT_DESCENDING",
            ThresholdOutOfRange { .. } => "CONFIG_THRESHOLD_OUT_OF_RANGE",
            MissingOpeningPhase(_) => "CONFIG_MISSING_OPENING_PHASE",
            InvalidMultiplier { .. } => "CONFIG_INVALID_MULTIPLIER",
            TooManyAbilities { .. } => "CONFIG_TOO_MANY_ABILITIES",
            DuplicateAbility(_) => "CONFIG_DUPLICATE_ABILITY",
            UnknownAbilityInPhase { .. } => "CONFIG_UNKNOWN_ABILITY_IN_PHASE",
            InvalidAbility { .. } => "CONFIG_INVALID_ABILITY",
            InvalidMaxHealth(_) => "CONFIG_INVALID_MAX_HEALTH",
            InvalidTuning { .. } => "CONFIG_INVALID_TUNING",
        }
    }
}

// ============================================================================
// Request Errors
// ============================================================================

/// Requests rejected by a component. Never propagated across the tick boundary.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    /// The ability id is not in the catalog.
    #[error("unknown ability '{0}'")]
    UnknownAbility(AbilityId),

    /// The ability exists but the current phase does not allow it.
    #[error("ability '{0}' is not available in the current phase")]
    NotInPhase(AbilityId),

    /// The pipeline is suspended by a phase transition.
    #[error("ability pipeline is suspended")]
    PipelineSuspended,

    /// Phase index is out of range or would move backwards.
    #[error("invalid phase {requested} (current {current}, count {count})")]
    InvalidPhase {
        requested: usize,
        current: usize,
        count: usize,
    },

    /// A transition is already running.
    #[error("phase transition to {0} already in flight")]
    TransitionInFlight(usize),

    /// The boss has been defeated.
    #[error("boss is defeated")]
    Defeated,
}

impl EngineError for RequestError {
    fn severity(&self) -> ErrorSeverity {
        use RequestError::*;
        match self {
            UnknownAbility(_) | NotInPhase(_) | InvalidPhase { .. } => ErrorSeverity::Validation,
            PipelineSuspended | TransitionInFlight(_) | Defeated => ErrorSeverity::Recoverable,
        }
    }

    fn error_code(&self) -> &'static str {
        use RequestError::*;
        match self {
            UnknownAbility(_) => "REQUEST_UNKNOWN_ABILITY",
            NotInPhase(_) => "REQUEST_NOT_IN_PHASE",
            PipelineSuspended => "REQUEST_PIPELINE_SUSPENDED",
            InvalidPhase { .. } => "REQUEST_INVALID_PHASE",
            TransitionInFlight(_) => "REQUEST_TRANSITION_IN_FLIGHT",
            Defeated => "REQUEST_DEFEATED",
        }
    }
}
