use glam::Vec3;

use crate::ability::AbilityId;
use crate::error::ConfigError;

/// Boss tuning constants and tunable parameters.
///
/// Every field has a default so authored TOML only needs to list overrides.
/// Distances are in world units, durations in seconds, percentages in 0-100.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BossConfig {
    pub max_health: f32,
    /// Radius in which a valid target pulls the boss into combat.
    /// Combat ends once the target is farther than `1.5 * aggro_range`.
    pub aggro_range: f32,
    pub decision_interval: f32,
    /// Chance per decision that ability candidates are evaluated at all.
    pub ability_use_probability: f32,
    /// Chance per decision that a cover candidate is evaluated.
    pub seek_cover_probability: f32,
    /// Health percent under which the boss considers seeking cover.
    pub low_health_threshold: f32,
    pub cover_search_radius: f32,
    pub attack_range: f32,
    pub min_distance_to_player: f32,
    pub max_distance_to_player: f32,
    pub move_speed: f32,
    pub transition_duration: f32,
    pub global_cooldown: f32,
    /// Delay between death and the `Defeated` event.
    pub defeat_delay: f32,
    /// Lost-target time before the boss moves to the last known position.
    pub lost_target_grace: f32,
    /// Lost-target time after which the boss gives up and patrols.
    pub patrol_after_lost: f32,
    /// Fraction of max health a single hit must exceed to enrage the boss.
    pub enrage_fraction: f32,
    pub attack_windup: f32,
    pub attack_recovery: f32,
    pub cover_dwell: f32,
    /// Upper bound on how long a use-ability action waits for the pipeline.
    pub ability_action_timeout: f32,
    /// Queued ability requests older than this are discarded.
    pub queued_request_timeout: f32,
    /// Ability requested by the attack action.
    pub basic_attack: AbilityId,
    pub seed: u64,
    pub patrol_points: Vec<Vec3>,
}

impl BossConfig {
    // ===== compile-time constants used as type parameters =====
    /// Maximum abilities a single phase may expose to the decision engine.
    pub const MAX_PHASE_ABILITIES: usize = 16;
    /// Attack, move and cover plus one candidate per phase ability.
    pub const MAX_CANDIDATES: usize = Self::MAX_PHASE_ABILITIES + 3;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_MAX_HEALTH: f32 = 10_000.0;
    pub const DEFAULT_AGGRO_RANGE: f32 = 20.0;
    pub const DEFAULT_DECISION_INTERVAL: f32 = 1.0;
    pub const DEFAULT_ABILITY_USE_PROBABILITY: f32 = 0.7;
    pub const DEFAULT_SEEK_COVER_PROBABILITY: f32 = 0.3;
    pub const DEFAULT_LOW_HEALTH_THRESHOLD: f32 = 30.0;
    pub const DEFAULT_COVER_SEARCH_RADIUS: f32 = 15.0;
    pub const DEFAULT_ATTACK_RANGE: f32 = 3.0;
    pub const DEFAULT_MIN_DISTANCE_TO_PLAYER: f32 = 2.0;
    pub const DEFAULT_MAX_DISTANCE_TO_PLAYER: f32 = 10.0;
    pub const DEFAULT_MOVE_SPEED: f32 = 5.0;
    pub const DEFAULT_TRANSITION_DURATION: f32 = 3.0;
    pub const DEFAULT_GLOBAL_COOLDOWN: f32 = 1.0;
    pub const DEFAULT_DEFEAT_DELAY: f32 = 3.0;
    pub const DEFAULT_LOST_TARGET_GRACE: f32 = 1.0;
    pub const DEFAULT_PATROL_AFTER_LOST: f32 = 5.0;
    pub const DEFAULT_ENRAGE_FRACTION: f32 = 0.1;
    pub const DEFAULT_ATTACK_WINDUP: f32 = 0.5;
    pub const DEFAULT_ATTACK_RECOVERY: f32 = 1.0;
    pub const DEFAULT_COVER_DWELL: f32 = 3.0;
    pub const DEFAULT_ABILITY_ACTION_TIMEOUT: f32 = 10.0;
    pub const DEFAULT_QUEUED_REQUEST_TIMEOUT: f32 = 5.0;
    pub const DEFAULT_BASIC_ATTACK: &'static str = "BasicAttack";

    pub fn new() -> Self {
        Self {
            max_health: Self::DEFAULT_MAX_HEALTH,
            aggro_range: Self::DEFAULT_AGGRO_RANGE,
            decision_interval: Self::DEFAULT_DECISION_INTERVAL,
            ability_use_probability: Self::DEFAULT_ABILITY_USE_PROBABILITY,
            seek_cover_probability: Self::DEFAULT_SEEK_COVER_PROBABILITY,
            low_health_threshold: Self::DEFAULT_LOW_HEALTH_THRESHOLD,
            cover_search_radius: Self::DEFAULT_COVER_SEARCH_RADIUS,
            attack_range: Self::DEFAULT_ATTACK_RANGE,
            min_distance_to_player: Self::DEFAULT_MIN_DISTANCE_TO_PLAYER,
            max_distance_to_player: Self::DEFAULT_MAX_DISTANCE_TO_PLAYER,
            move_speed: Self::DEFAULT_MOVE_SPEED,
            transition_duration: Self::DEFAULT_TRANSITION_DURATION,
            global_cooldown: Self::DEFAULT_GLOBAL_COOLDOWN,
            defeat_delay: Self::DEFAULT_DEFEAT_DELAY,
            lost_target_grace: Self::DEFAULT_LOST_TARGET_GRACE,
            patrol_after_lost: Self::DEFAULT_PATROL_AFTER_LOST,
            enrage_fraction: Self::DEFAULT_ENRAGE_FRACTION,
            attack_windup: Self::DEFAULT_ATTACK_WINDUP,
            attack_recovery: Self::DEFAULT_ATTACK_RECOVERY,
            cover_dwell: Self::DEFAULT_COVER_DWELL,
            ability_action_timeout: Self::DEFAULT_ABILITY_ACTION_TIMEOUT,
            queued_request_timeout: Self::DEFAULT_QUEUED_REQUEST_TIMEOUT,
            basic_attack: AbilityId::from(Self::DEFAULT_BASIC_ATTACK),
            seed: 0,
            patrol_points: Vec::new(),
        }
    }

    pub fn with_max_health(mut self, max_health: f32) -> Self {
        self.max_health = max_health;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Checks every tunable. Run once at load; the engine trusts the values afterwards.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.max_health.is_finite() && self.max_health > 0.0) {
            return Err(ConfigError::InvalidMaxHealth(self.max_health));
        }

        let positive = [
            ("aggro_range", self.aggro_range),
            ("decision_interval", self.decision_interval),
            ("move_speed", self.move_speed),
            ("max_distance_to_player", self.max_distance_to_player),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::InvalidTuning { field, value });
            }
        }

        let non_negative = [
            ("cover_search_radius", self.cover_search_radius),
            ("attack_range", self.attack_range),
            ("min_distance_to_player", self.min_distance_to_player),
            ("transition_duration", self.transition_duration),
            ("global_cooldown", self.global_cooldown),
            ("defeat_delay", self.defeat_delay),
            ("lost_target_grace", self.lost_target_grace),
            ("patrol_after_lost", self.patrol_after_lost),
            ("enrage_fraction", self.enrage_fraction),
            ("attack_windup", self.attack_windup),
            ("attack_recovery", self.attack_recovery),
            ("cover_dwell", self.cover_dwell),
            ("ability_action_timeout", self.ability_action_timeout),
            ("queued_request_timeout", self.queued_request_timeout),
        ];
        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::InvalidTuning { field, value });
            }
        }

        let probabilities = [
            ("ability_use_probability", self.ability_use_probability),
            ("seek_cover_probability", self.seek_cover_probability),
        ];
        for (field, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidTuning { field, value });
            }
        }

        if !(0.0..=100.0).contains(&self.low_health_threshold) {
            return Err(ConfigError::InvalidTuning {
                field: "low_health_threshold",
                value: self.low_health_threshold,
            });
        }

        if self.min_distance_to_player > self.max_distance_to_player {
            return Err(ConfigError::InvalidTuning {
                field: "min_distance_to_player",
                value: self.min_distance_to_player,
            });
        }

        Ok(())
    }
}

impl Default for BossConfig {
    fn default() -> Self {
        Self::new()
    }
}
