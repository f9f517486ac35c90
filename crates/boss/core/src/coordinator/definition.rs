use crate::ability::{AbilityCatalog, AbilityDefinition};
use crate::config::BossConfig;
use crate::error::ConfigError;
use crate::phase::{PhaseDefinition, PhaseTable};

/// Authored data for one boss: tuning, abilities and phases.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BossDefinition {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub config: BossConfig,
    pub abilities: Vec<AbilityDefinition>,
    pub phases: Vec<PhaseDefinition>,
}

impl BossDefinition {
    pub fn new(
        name: impl Into<String>,
        config: BossConfig,
        abilities: Vec<AbilityDefinition>,
        phases: Vec<PhaseDefinition>,
    ) -> Self {
        Self {
            name: name.into(),
            config,
            abilities,
            phases,
        }
    }

    /// Checks the whole definition without building a boss.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.build().map(|_| ())
    }

    /// Validates and builds the catalog and phase table.
    pub(crate) fn build(&self) -> Result<(AbilityCatalog, PhaseTable), ConfigError> {
        self.config.validate()?;

        let catalog = AbilityCatalog::new(
            self.abilities.clone(),
            self.config.global_cooldown,
            self.config.queued_request_timeout,
        )?;
        let table = PhaseTable::new(self.phases.clone())?;

        for (phase, definition) in table.iter().enumerate() {
            if let Some(ability) = definition
                .abilities
                .iter()
                .find(|id| !catalog.contains(id.as_str()))
            {
                return Err(ConfigError::UnknownAbilityInPhase {
                    phase,
                    ability: ability.clone(),
                });
            }
        }

        if !catalog.contains(self.config.basic_attack.as_str()) {
            return Err(ConfigError::InvalidAbility {
                id: self.config.basic_attack.clone(),
                reason: "basic attack is not defined",
            });
        }

        Ok((catalog, table))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ability::{AbilityId, AbilityKind};

    fn abilities() -> Vec<AbilityDefinition> {
        vec![
            AbilityDefinition::new("BasicAttack", AbilityKind::Melee).with_range(3.0),
            AbilityDefinition::new("UltimateAbility", AbilityKind::Ultimate).with_cooldown(30.0),
        ]
    }

    #[test]
    fn accepts_consistent_definition() {
        let definition = BossDefinition::new(
            "Warden",
            BossConfig::default(),
            abilities(),
            vec![PhaseDefinition::new("Opening", 100.0).with_abilities(["BasicAttack"])],
        );
        assert_eq!(definition.validate(), Ok(()));
    }

    #[test]
    fn rejects_unknown_phase_ability() {
        let definition = BossDefinition::new(
            "Warden",
            BossConfig::default(),
            abilities(),
            vec![
                PhaseDefinition::new("Opening", 100.0).with_abilities(["BasicAttack"]),
                PhaseDefinition::new("Enraged", 50.0).with_abilities(["Meteor"]),
            ],
        );
        assert_eq!(
            definition.validate(),
            Err(ConfigError::UnknownAbilityInPhase {
                phase: 1,
                ability: AbilityId::from("Meteor"),
            })
        );
    }

    #[test]
    fn requires_basic_attack() {
        let mut config = BossConfig::default();
        config.basic_attack = AbilityId::from("Punch");
        let definition = BossDefinition::new(
            "Warden",
            config,
            abilities(),
            vec![PhaseDefinition::new("Opening", 100.0)],
        );
        assert!(matches!(
            definition.validate(),
            Err(ConfigError::InvalidAbility { .. })
        ));
    }
}
