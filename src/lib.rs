//! survsim - Survivors-Style Combat Simulation Core
//!
//! A frame-driven combat core for a 2D action game: a player actor with
//! health, independently-timed weapon emitters, timed pickup effects, and an
//! orbiting projectile cohort with analytically derived positions.
//!
//! This library exposes the core modules for testing and reuse.

pub mod cli;
pub mod combat;
pub mod headless;

// Re-export commonly used types
pub use combat::components::{CombatActor, CooldownTimer, EffectKind};
pub use combat::log::{CombatLog, CombatLogEventType};
pub use combat::weapons::{WeaponDefinitions, WeaponKind};
pub use combat::{CombatPlugin, SimulationSpeed};
pub use headless::ScenarioConfig;
