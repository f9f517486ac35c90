//! Scripted encounters loaded from RON.

use std::path::Path;

use anyhow::Context;
use boss_core::Vec3;
use serde::{Deserialize, Serialize};

use crate::arena::ArenaSpec;

const DEFAULT_TARGET_HEALTH: f32 = 1_000.0;

/// A scripted encounter: arena layout, targets and their behaviour.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub spawn: Vec3,
    #[serde(default)]
    pub arena: ArenaSpec,
    #[serde(default)]
    pub targets: Vec<ScriptedTarget>,
    /// One-off hits on the boss, independent of any target.
    #[serde(default)]
    pub hits: Vec<ScriptedHit>,
    #[serde(default)]
    pub stuns: Vec<ScriptedStun>,
}

/// A target that walks a fixed path and optionally hits back.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScriptedTarget {
    pub id: u32,
    /// Timed positions, interpolated linearly. Must be sorted by time.
    pub path: Vec<Waypoint>,
    #[serde(default = "default_target_health")]
    pub health: f32,
    /// Present from this time on.
    #[serde(default)]
    pub arrive: f32,
    /// Gone from this time on.
    #[serde(default)]
    pub leave: Option<f32>,
    #[serde(default)]
    pub attack: Option<TargetAttack>,
}

fn default_target_health() -> f32 {
    DEFAULT_TARGET_HEALTH
}

impl ScriptedTarget {
    /// Position at time `t`, clamped to the ends of the path.
    pub fn position_at(&self, t: f32) -> Vec3 {
        let Some(first) = self.path.first() else {
            return Vec3::ZERO;
        };
        if t <= first.time {
            return first.position;
        }
        for pair in self.path.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            if t <= b.time {
                let span = b.time - a.time;
                let s = if span > 0.0 { (t - a.time) / span } else { 1.0 };
                return a.position.lerp(b.position, s);
            }
        }
        self.path.last().map_or(first.position, |w| w.position)
    }

    pub fn is_present(&self, t: f32) -> bool {
        t >= self.arrive && self.leave.is_none_or(|leave| t < leave)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub time: f32,
    pub position: Vec3,
}

/// Periodic damage a target deals to the boss while within reach.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TargetAttack {
    pub damage: f32,
    pub interval: f32,
    pub reach: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScriptedHit {
    pub time: f32,
    pub amount: f32,
    #[serde(default)]
    pub source: Vec3,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScriptedStun {
    pub time: f32,
    pub duration: f32,
}

impl Scenario {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid scenario {}", path.display()))
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let scenario: Scenario = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse scenario RON: {}", e))?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// The built-in one-on-one duel used when no scenario file is given.
    pub fn duel() -> anyhow::Result<Self> {
        Self::parse(include_str!("../scenarios/duel.ron"))
    }

    fn validate(&self) -> anyhow::Result<()> {
        for target in &self.targets {
            if target.path.is_empty() {
                anyhow::bail!("target {} has an empty path", target.id);
            }
            if target.path.windows(2).any(|w| w[1].time < w[0].time) {
                anyhow::bail!("target {} path is not sorted by time", target.id);
            }
            if let Some(attack) = target.attack {
                if !(attack.interval.is_finite() && attack.interval > 0.0) {
                    anyhow::bail!("target {} attack interval must be positive", target.id);
                }
            }
        }
        let mut ids: Vec<u32> = self.targets.iter().map(|t| t.id).collect();
        ids.sort_unstable();
        if ids.windows(2).any(|w| w[0] == w[1]) {
            anyhow::bail!("duplicate target ids");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walker() -> ScriptedTarget {
        ScriptedTarget {
            id: 1,
            path: vec![
                Waypoint {
                    time: 0.0,
                    position: Vec3::new(10.0, 0.0, 0.0),
                },
                Waypoint {
                    time: 2.0,
                    position: Vec3::new(20.0, 0.0, 0.0),
                },
            ],
            health: DEFAULT_TARGET_HEALTH,
            arrive: 1.0,
            leave: Some(5.0),
            attack: None,
        }
    }

    #[test]
    fn path_interpolates_and_clamps() {
        let target = walker();
        assert_eq!(target.position_at(-1.0), Vec3::new(10.0, 0.0, 0.0));
        assert_eq!(target.position_at(1.0), Vec3::new(15.0, 0.0, 0.0));
        assert_eq!(target.position_at(9.0), Vec3::new(20.0, 0.0, 0.0));
    }

    #[test]
    fn presence_window() {
        let target = walker();
        assert!(!target.is_present(0.5));
        assert!(target.is_present(1.0));
        assert!(!target.is_present(5.0));
    }

    #[test]
    fn builtin_duel_parses() {
        let duel = Scenario::duel().expect("built-in scenario");
        assert!(!duel.targets.is_empty());
    }

    #[test]
    fn rejects_unsorted_paths() {
        let err = Scenario::parse(
            r#"(
                name: "bad",
                targets: [(
                    id: 1,
                    path: [
                        (time: 3.0, position: (0.0, 0.0, 0.0)),
                        (time: 1.0, position: (1.0, 0.0, 0.0)),
                    ],
                )],
            )"#,
        )
        .expect_err("unsorted");
        assert!(err.to_string().contains("not sorted"));
    }
}
