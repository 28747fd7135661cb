//! Weapon emitters and data-driven tuning
//!
//! The three weapon variants share one emitter state machine
//! (`Disabled -> Idle -> Firing -> Idle`): a cooldown accumulates only in
//! `Idle`, a ready cooldown transitions to `Firing` and produces a fire
//! request, and the emitter returns to `Idle` when the discharge completes
//! (immediately for the instantaneous weapons, on cohort expiry for the
//! orbital cluster).
//!
//! Base tuning is loaded from `assets/config/weapons.ron` so balance changes
//! don't require recompilation; every [`WeaponKind`] is validated at startup.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use super::components::CooldownTimer;

/// The closed set of weapon variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponKind {
    /// Fires a single projectile in the facing direction; unlocked from the
    /// start and pre-armed so it fires almost immediately
    ForwardShot,
    /// Periodically fires one ranged attacker; unlocked by progression
    RangedBolt,
    /// Spawns a cohort of projectiles orbiting the owner; unlocked by
    /// progression, suppressed from re-firing while a cohort is live
    OrbitalCluster,
}

impl WeaponKind {
    pub const ALL: [WeaponKind; 3] = [
        WeaponKind::ForwardShot,
        WeaponKind::RangedBolt,
        WeaponKind::OrbitalCluster,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            WeaponKind::ForwardShot => "ForwardShot",
            WeaponKind::RangedBolt => "RangedBolt",
            WeaponKind::OrbitalCluster => "OrbitalCluster",
        }
    }
}

fn default_count() -> u32 {
    1
}

/// Tuning values for one weapon, loaded from RON and mutated cumulatively by
/// upgrades.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeaponTuning {
    /// Cooldown between discharges, seconds
    pub cooldown: f32,
    /// Base damage before the percentage modifier
    pub base_damage: i32,
    /// Damage percentage modifier (1.0 = full base damage)
    pub damage_pct: f32,
    /// Instances per discharge
    #[serde(default = "default_count")]
    pub count: u32,
    /// Active lifetime of an orbital cohort, seconds (orbital only)
    #[serde(default)]
    pub duration: f32,
    /// Orbit angular velocity, degrees per second (orbital only)
    #[serde(default)]
    pub rotation_deg_per_sec: f32,
    /// Orbit radius around the owner (orbital only)
    #[serde(default)]
    pub orbit_radius: f32,
    /// Whether the weapon starts unlocked
    #[serde(default)]
    pub starts_enabled: bool,
}

impl WeaponTuning {
    /// Validate tuning for a given weapon kind. Non-positive timing values
    /// are configuration errors and are rejected here rather than tolerated.
    pub fn validate(&self, kind: WeaponKind) -> Result<(), String> {
        if self.cooldown <= 0.0 {
            return Err(format!(
                "{}: cooldown must be positive, got {}",
                kind.name(),
                self.cooldown
            ));
        }
        if self.damage_pct <= 0.0 {
            return Err(format!(
                "{}: damage_pct must be positive, got {}",
                kind.name(),
                self.damage_pct
            ));
        }
        if self.base_damage < 0 {
            return Err(format!(
                "{}: base_damage must be non-negative, got {}",
                kind.name(),
                self.base_damage
            ));
        }
        if self.count == 0 {
            return Err(format!("{}: count must be at least 1", kind.name()));
        }
        if kind == WeaponKind::OrbitalCluster {
            if self.duration <= 0.0 {
                return Err(format!(
                    "{}: duration must be positive, got {}",
                    kind.name(),
                    self.duration
                ));
            }
            if self.orbit_radius <= 0.0 {
                return Err(format!(
                    "{}: orbit_radius must be positive, got {}",
                    kind.name(),
                    self.orbit_radius
                ));
            }
            if self.rotation_deg_per_sec == 0.0 {
                return Err(format!(
                    "{}: rotation_deg_per_sec must be non-zero",
                    kind.name()
                ));
            }
        }
        Ok(())
    }
}

/// Activation/firing state of an emitter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitterState {
    /// Locked; the cooldown does not accumulate
    Disabled,
    /// Armed; the cooldown accumulates each step
    Idle,
    /// Discharging; the cooldown does not accumulate until completion
    Firing,
}

/// A discharge produced by a ready emitter
#[derive(Debug, Clone, Copy)]
pub struct FireRequest {
    pub kind: WeaponKind,
    pub count: u32,
}

/// One weapon emitter owned by a single actor.
///
/// Each actor carries its own emitter instances; there is no tuning or
/// activation state shared across actors.
#[derive(Debug, Clone)]
pub struct WeaponEmitter {
    pub kind: WeaponKind,
    pub tuning: WeaponTuning,
    pub level: u8,
    state: EmitterState,
    cooldown: CooldownTimer,
    pending_disable: bool,
}

impl WeaponEmitter {
    /// Build an emitter from validated tuning. Weapons that start enabled are
    /// pre-armed so the first discharge happens shortly after simulation
    /// start.
    pub fn from_tuning(kind: WeaponKind, tuning: WeaponTuning) -> Result<Self, String> {
        tuning.validate(kind)?;
        let mut cooldown = CooldownTimer::new(tuning.cooldown)?;
        let state = if tuning.starts_enabled {
            cooldown.arm_nearly_ready();
            EmitterState::Idle
        } else {
            EmitterState::Disabled
        };
        Ok(Self {
            kind,
            tuning,
            level: 0,
            state,
            cooldown,
            pending_disable: false,
        })
    }

    pub fn state(&self) -> EmitterState {
        self.state
    }

    pub fn cooldown(&self) -> &CooldownTimer {
        &self.cooldown
    }

    /// Damage per projectile instance: `floor(base_damage * damage_pct)`.
    pub fn damage(&self) -> i32 {
        (self.tuning.base_damage as f32 * self.tuning.damage_pct).floor() as i32
    }

    /// Unlock the weapon and pre-arm its cooldown. Idempotent: enabling an
    /// already-enabled weapon does not re-arm an in-progress cooldown.
    pub fn enable(&mut self) {
        self.pending_disable = false;
        if self.state == EmitterState::Disabled {
            self.cooldown.arm_nearly_ready();
            self.state = EmitterState::Idle;
        }
    }

    /// Stop cooldown accumulation immediately. Idempotent. An in-flight
    /// discharge is not cancelled; the emitter disables once it completes.
    pub fn disable(&mut self) {
        match self.state {
            EmitterState::Idle => {
                self.state = EmitterState::Disabled;
                self.cooldown.reset();
            }
            EmitterState::Firing => self.pending_disable = true,
            EmitterState::Disabled => {}
        }
    }

    /// Advance the emitter by `dt`. In `Idle` the cooldown accumulates; on a
    /// crossing the emitter transitions to `Firing` and returns the fire
    /// request. In `Disabled` and `Firing` nothing accumulates.
    pub fn step(&mut self, dt: f32) -> Option<FireRequest> {
        if self.state != EmitterState::Idle {
            return None;
        }
        if self.cooldown.accumulate(dt) {
            self.state = EmitterState::Firing;
            Some(FireRequest {
                kind: self.kind,
                count: self.tuning.count,
            })
        } else {
            None
        }
    }

    /// Signal that the current discharge finished (immediately for the
    /// instantaneous weapons, cohort expiry for the orbital cluster).
    pub fn notify_discharge_complete(&mut self) {
        if self.state == EmitterState::Firing {
            self.state = if self.pending_disable {
                self.pending_disable = false;
                EmitterState::Disabled
            } else {
                EmitterState::Idle
            };
        }
    }

    /// Apply one level from this weapon's fixed upgrade table. Levels are
    /// cumulative and not reversible; level 1 of a locked weapon unlocks it.
    pub fn apply_upgrade(&mut self, level: u8) {
        match (self.kind, level) {
            (_, 1) => self.enable(),
            (WeaponKind::OrbitalCluster, 2) => {
                self.tuning.duration *= 1.2;
                self.tuning.damage_pct = 1.2;
            }
            (WeaponKind::OrbitalCluster, 3) => {
                self.tuning.duration *= 1.5;
                self.tuning.cooldown *= 0.7;
                self.cooldown.set_threshold(self.tuning.cooldown);
            }
            (WeaponKind::ForwardShot, 2) => {
                self.tuning.count += 1;
            }
            (WeaponKind::ForwardShot, 3) => {
                self.tuning.cooldown *= 0.8;
                self.cooldown.set_threshold(self.tuning.cooldown);
            }
            (WeaponKind::RangedBolt, 2) => {
                self.tuning.damage_pct = 1.25;
            }
            (WeaponKind::RangedBolt, 3) => {
                self.tuning.cooldown *= 0.75;
                self.cooldown.set_threshold(self.tuning.cooldown);
            }
            (kind, level) => {
                warn!("No upgrade defined for {} level {}", kind.name(), level);
                return;
            }
        }
        self.level = self.level.max(level);
    }
}

/// The weapon emitters owned by one actor, created once at actor construction.
#[derive(Component, Debug)]
pub struct WeaponLoadout {
    pub emitters: Vec<WeaponEmitter>,
}

impl WeaponLoadout {
    /// Build a full loadout (one emitter per weapon kind) from the loaded
    /// tuning definitions.
    pub fn from_definitions(definitions: &WeaponDefinitions) -> Result<Self, String> {
        let mut emitters = Vec::with_capacity(WeaponKind::ALL.len());
        for kind in WeaponKind::ALL {
            let tuning = definitions
                .get(&kind)
                .ok_or_else(|| format!("No tuning defined for {}", kind.name()))?
                .clone();
            emitters.push(WeaponEmitter::from_tuning(kind, tuning)?);
        }
        Ok(Self { emitters })
    }

    pub fn emitter(&self, kind: WeaponKind) -> Option<&WeaponEmitter> {
        self.emitters.iter().find(|e| e.kind == kind)
    }

    pub fn emitter_mut(&mut self, kind: WeaponKind) -> Option<&mut WeaponEmitter> {
        self.emitters.iter_mut().find(|e| e.kind == kind)
    }
}

// ============================================================================
// RON-backed tuning definitions
// ============================================================================

/// Root structure of the weapons.ron file
#[derive(Debug, Serialize, Deserialize)]
pub struct WeaponsConfig {
    pub weapons: HashMap<WeaponKind, WeaponTuning>,
}

/// Resource containing the base tuning for every weapon kind.
///
/// Loaded from `assets/config/weapons.ron` at startup; access via
/// `Res<WeaponDefinitions>` in systems.
#[derive(Resource)]
pub struct WeaponDefinitions {
    definitions: HashMap<WeaponKind, WeaponTuning>,
}

impl Default for WeaponDefinitions {
    /// Load definitions from the default config file.
    /// Panics if the file cannot be loaded - use for tests only.
    fn default() -> Self {
        load_weapon_definitions().expect("Failed to load weapon definitions in Default impl")
    }
}

impl WeaponDefinitions {
    pub fn new(config: WeaponsConfig) -> Self {
        Self {
            definitions: config.weapons,
        }
    }

    pub fn get(&self, kind: &WeaponKind) -> Option<&WeaponTuning> {
        self.definitions.get(kind)
    }

    /// Check that every weapon kind is defined and its tuning is valid.
    pub fn validate(&self) -> Result<(), String> {
        for kind in WeaponKind::ALL {
            let tuning = self
                .definitions
                .get(&kind)
                .ok_or_else(|| format!("Missing tuning for {}", kind.name()))?;
            tuning.validate(kind)?;
        }
        Ok(())
    }
}

/// Load weapon definitions from `assets/config/weapons.ron`.
pub fn load_weapon_definitions() -> Result<WeaponDefinitions, String> {
    load_weapon_definitions_from(Path::new("assets/config/weapons.ron"))
}

/// Load weapon definitions from an arbitrary path.
pub fn load_weapon_definitions_from(path: &Path) -> Result<WeaponDefinitions, String> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read weapon config {}: {}", path.display(), e))?;

    let config: WeaponsConfig =
        ron::from_str(&contents).map_err(|e| format!("Failed to parse weapon config: {}", e))?;

    let definitions = WeaponDefinitions::new(config);
    definitions.validate()?;
    Ok(definitions)
}

/// Bevy plugin that loads and validates weapon tuning at startup
pub struct WeaponConfigPlugin;

impl Plugin for WeaponConfigPlugin {
    fn build(&self, app: &mut App) {
        match load_weapon_definitions() {
            Ok(definitions) => {
                app.insert_resource(definitions);
            }
            Err(e) => {
                panic!("Failed to load weapon definitions: {}", e);
            }
        }
    }
}
