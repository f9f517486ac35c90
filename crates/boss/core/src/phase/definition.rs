use crate::ability::AbilityId;
use crate::config::BossConfig;
use crate::error::ConfigError;

/// One combat phase: entry threshold, stat multipliers and allowed abilities.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PhaseDefinition {
    pub name: String,
    /// The phase is entered once health percent drops to this value.
    pub health_threshold_percent: f32,
    pub damage_multiplier: f32,
    pub speed_multiplier: f32,
    #[cfg_attr(feature = "serde", serde(default = "default_multiplier"))]
    pub cooldown_multiplier: f32,
    pub abilities: Vec<AbilityId>,
}

#[cfg(feature = "serde")]
fn default_multiplier() -> f32 {
    1.0
}

impl PhaseDefinition {
    pub fn new(name: impl Into<String>, health_threshold_percent: f32) -> Self {
        Self {
            name: name.into(),
            health_threshold_percent,
            damage_multiplier: 1.0,
            speed_multiplier: 1.0,
            cooldown_multiplier: 1.0,
            abilities: Vec::new(),
        }
    }

    pub fn with_multipliers(mut self, damage: f32, speed: f32, cooldown: f32) -> Self {
        self.damage_multiplier = damage;
        self.speed_multiplier = speed;
        self.cooldown_multiplier = cooldown;
        self
    }

    pub fn with_abilities<I, A>(mut self, abilities: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<AbilityId>,
    {
        self.abilities = abilities.into_iter().map(Into::into).collect();
        self
    }
}

/// Validated, ordered phase list. Index 0 is the opening phase at 100%.
#[derive(Clone, Debug, PartialEq)]
pub struct PhaseTable {
    phases: Vec<PhaseDefinition>,
}

impl PhaseTable {
    pub fn new(phases: Vec<PhaseDefinition>) -> Result<Self, ConfigError> {
        if phases.is_empty() {
            return Err(ConfigError::NoPhases);
        }

        for (index, phase) in phases.iter().enumerate() {
            let threshold = phase.health_threshold_percent;
            if !(threshold.is_finite() && threshold > 0.0 && threshold <= 100.0) {
                return Err(ConfigError::ThresholdOutOfRange {
                    index,
                    value: threshold,
                });
            }
            if index > 0 {
                let previous = phases[index - 1].health_threshold_percent;
                if threshold >= previous {
                    return Err(ConfigError::ThresholdNotDescending {
                        index,
                        previous,
                        current: threshold,
                    });
                }
            }

            let multipliers = [
                ("damage", phase.damage_multiplier, true),
                ("speed", phase.speed_multiplier, false),
                ("cooldown", phase.cooldown_multiplier, false),
            ];
            for (field, value, zero_ok) in multipliers {
                let in_range = if zero_ok { value >= 0.0 } else { value > 0.0 };
                if !(value.is_finite() && in_range) {
                    return Err(ConfigError::InvalidMultiplier {
                        index,
                        field,
                        value,
                    });
                }
            }

            if phase.abilities.len() > BossConfig::MAX_PHASE_ABILITIES {
                return Err(ConfigError::TooManyAbilities {
                    index,
                    count: phase.abilities.len(),
                    max: BossConfig::MAX_PHASE_ABILITIES,
                });
            }
        }

        let opening = phases[0].health_threshold_percent;
        if opening != 100.0 {
            return Err(ConfigError::MissingOpeningPhase(opening));
        }

        Ok(Self { phases })
    }

    pub fn len(&self) -> usize {
        self.phases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PhaseDefinition> {
        self.phases.get(index)
    }

    pub fn as_slice(&self) -> &[PhaseDefinition] {
        &self.phases
    }

    pub fn iter(&self) -> impl Iterator<Item = &PhaseDefinition> {
        self.phases.iter()
    }

    /// Phase the given health percent belongs in.
    ///
    /// Thresholds are scanned from the lowest upward; the first one at or
    /// above `health_percent` wins, so equality enters that phase.
    pub fn target_phase(&self, health_percent: f32) -> usize {
        self.phases
            .iter()
            .rposition(|p| p.health_threshold_percent >= health_percent)
            .unwrap_or(0)
    }
}
