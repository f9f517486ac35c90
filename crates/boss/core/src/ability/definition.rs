//! Authored ability data.

use std::borrow::Borrow;
use std::fmt;

use crate::error::ConfigError;

/// Stable identifier of an ability, e.g. `"ChargeAttack"`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct AbilityId(String);

impl AbilityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AbilityId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for AbilityId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Borrow<str> for AbilityId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AbilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What an ability does when it performs, with kind-specific parameters.
///
/// A closed set consumed by the single perform dispatcher.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AbilityKind {
    /// Damages targets within `range` of the boss at perform time.
    Melee,
    /// Asks the host to spawn a projectile toward the target point.
    Ranged { projectile_speed: f32 },
    /// Damages everything overlapping a sphere.
    Area { radius: f32 },
    /// Moves the boss toward the target, hitting anything it runs into.
    Charge {
        speed: f32,
        hit_radius: f32,
        max_duration: f32,
    },
    /// Damages whoever its target kind resolves to; `All` hits every known target.
    Ultimate,
    /// Asks the host to spawn adds around the boss.
    Summon { creature: String, count: u32 },
    /// Asks the host to move the boss `offset` units behind the target.
    Teleport { offset: f32 },
}

impl AbilityKind {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Melee => "melee",
            Self::Ranged { .. } => "ranged",
            Self::Area { .. } => "area",
            Self::Charge { .. } => "charge",
            Self::Ultimate => "ultimate",
            Self::Summon { .. } => "summon",
            Self::Teleport { .. } => "teleport",
        }
    }

    /// Whether the decision engine needs line of sight before using it.
    pub const fn needs_line_of_sight(&self) -> bool {
        matches!(self, Self::Melee | Self::Ranged { .. } | Self::Charge { .. })
    }

    fn validate(&self) -> Result<(), &'static str> {
        let positive = |v: f32| v.is_finite() && v > 0.0;
        match self {
            Self::Ranged { projectile_speed } if !positive(*projectile_speed) => {
                Err("projectile speed must be positive")
            }
            Self::Area { radius } if !positive(*radius) => Err("area radius must be positive"),
            Self::Charge {
                speed,
                hit_radius,
                max_duration,
            } if !(positive(*speed) && positive(*hit_radius) && positive(*max_duration)) => {
                Err("charge speed, hit radius and duration must be positive")
            }
            Self::Summon { count, .. } if *count == 0 => Err("summon count must be non-zero"),
            Self::Teleport { offset } if !(offset.is_finite() && *offset >= 0.0) => {
                Err("teleport offset must be non-negative")
            }
            _ => Ok(()),
        }
    }
}

/// Who an ability affects.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TargetKind {
    /// The requested target.
    #[default]
    Single,
    /// Everything around the target point.
    Area,
    /// Every known target.
    All,
    /// Centred on the boss itself.
    #[cfg_attr(feature = "serde", serde(rename = "Self"))]
    #[strum(serialize = "Self")]
    Caster,
    /// One known target picked at random.
    Random,
}

/// Immutable ability definition.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilityDefinition {
    pub id: AbilityId,
    pub damage: f32,
    /// Maximum use distance. Zero means unlimited.
    pub range: f32,
    pub cooldown: f32,
    pub cast_time: f32,
    pub kind: AbilityKind,
    #[cfg_attr(feature = "serde", serde(default))]
    pub target: TargetKind,
}

impl AbilityDefinition {
    pub fn new(id: impl Into<AbilityId>, kind: AbilityKind) -> Self {
        Self {
            id: id.into(),
            damage: 0.0,
            range: 0.0,
            cooldown: 0.0,
            cast_time: 0.0,
            kind,
            target: TargetKind::Single,
        }
    }

    pub fn with_damage(mut self, damage: f32) -> Self {
        self.damage = damage;
        self
    }

    pub fn with_range(mut self, range: f32) -> Self {
        self.range = range;
        self
    }

    pub fn with_cooldown(mut self, cooldown: f32) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn with_cast_time(mut self, cast_time: f32) -> Self {
        self.cast_time = cast_time;
        self
    }

    pub fn with_target(mut self, target: TargetKind) -> Self {
        self.target = target;
        self
    }

    /// True when `distance` is within range (zero range is unlimited).
    pub fn in_range(&self, distance: f32) -> bool {
        self.range <= 0.0 || distance <= self.range
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason| ConfigError::InvalidAbility {
            id: self.id.clone(),
            reason,
        };
        if self.id.as_str().is_empty() {
            return Err(invalid("id must not be empty"));
        }
        if !(self.damage.is_finite() && self.damage >= 0.0) {
            return Err(invalid("damage must be non-negative"));
        }
        if !(self.range.is_finite() && self.range >= 0.0) {
            return Err(invalid("range must be non-negative"));
        }
        if !(self.cooldown.is_finite() && self.cooldown >= 0.0) {
            return Err(invalid("cooldown must be non-negative"));
        }
        if !(self.cast_time.is_finite() && self.cast_time >= 0.0) {
            return Err(invalid("cast time must be non-negative"));
        }
        self.kind.validate().map_err(invalid)
    }
}
