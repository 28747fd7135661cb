//! JSON configuration parsing for headless scenarios
//!
//! A scenario describes one actor and a timed script of host actions (damage,
//! heals, pickups, weapon upgrades, pause/resume) to replay against the core.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::combat::components::{EffectKind, DEFAULT_EFFECT_DURATION_SECS};
use crate::combat::weapons::WeaponKind;

/// Headless scenario configuration loaded from JSON
#[derive(bevy::prelude::Resource, Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    /// The simulated actor's starting stats
    #[serde(default)]
    pub actor: ActorConfig,
    /// Run length before the scenario stops on its own (default: 60)
    #[serde(default = "default_max_duration")]
    pub max_duration_secs: f32,
    /// Custom output path for the combat log (optional)
    #[serde(default)]
    pub output_path: Option<String>,
    /// Timed host actions, replayed in order of their `at` timestamps
    #[serde(default)]
    pub script: Vec<ScriptedAction>,
}

/// Starting stats for the scenario actor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorConfig {
    /// Maximum (and starting) hit points
    #[serde(default = "default_max_health")]
    pub max_health: i32,
    /// Unmodified movement rate
    #[serde(default = "default_move_rate")]
    pub base_move_rate: f32,
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            max_health: default_max_health(),
            base_move_rate: default_move_rate(),
        }
    }
}

/// One timed host action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptedAction {
    /// Scenario time at which the action fires, seconds
    pub at: f32,
    /// The action itself
    pub action: HostAction,
}

/// Host actions a scenario can replay against the core
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostAction {
    /// Deal raw damage to the actor
    Damage { amount: i32 },
    /// Heal the actor
    Heal { amount: i32 },
    /// Apply a timed pickup effect
    Pickup {
        effect: EffectKind,
        magnitude: f32,
        #[serde(default = "default_effect_duration")]
        duration: f32,
    },
    /// Grant a weapon upgrade level
    Upgrade { weapon: WeaponKind, level: u8 },
    /// Pause the simulation
    Pause,
    /// Resume the simulation
    Resume,
}

fn default_max_health() -> i32 {
    100
}

fn default_move_rate() -> f32 {
    2.5
}

fn default_max_duration() -> f32 {
    60.0
}

fn default_effect_duration() -> f32 {
    DEFAULT_EFFECT_DURATION_SECS
}

impl ScenarioConfig {
    /// Load a scenario from a JSON file. The script is sorted by timestamp.
    pub fn load_from_file(path: &Path) -> Result<Self, String> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read scenario file: {}", e))?;

        let mut config: ScenarioConfig =
            serde_json::from_str(&contents).map_err(|e| format!("Failed to parse JSON: {}", e))?;

        config.validate()?;
        config
            .script
            .sort_by(|a, b| a.at.total_cmp(&b.at));
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.actor.max_health <= 0 {
            return Err("actor.max_health must be positive".to_string());
        }
        if self.actor.base_move_rate <= 0.0 {
            return Err("actor.base_move_rate must be positive".to_string());
        }
        if self.max_duration_secs <= 0.0 {
            return Err("max_duration_secs must be positive".to_string());
        }

        for entry in &self.script {
            if entry.at < 0.0 {
                return Err(format!("script timestamps must be non-negative, got {}", entry.at));
            }
            match &entry.action {
                HostAction::Damage { amount } | HostAction::Heal { amount } => {
                    if *amount < 0 {
                        return Err(format!(
                            "action amounts must be non-negative, got {}",
                            amount
                        ));
                    }
                }
                HostAction::Pickup { duration, .. } => {
                    if *duration <= 0.0 {
                        return Err(format!(
                            "pickup duration must be positive, got {}",
                            duration
                        ));
                    }
                }
                HostAction::Upgrade { level, .. } => {
                    if *level == 0 {
                        return Err("upgrade levels start at 1".to_string());
                    }
                }
                HostAction::Pause | HostAction::Resume => {}
            }
        }

        Ok(())
    }
}
