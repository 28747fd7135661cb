//! Combat simulation core
//!
//! Implements the frame-driven timing and state-transition logic:
//! - Actor health, mitigation and movement modifiers
//! - Independently-timed weapon emitters (forward shot, ranged bolt,
//!   orbital cluster) behind one shared state machine
//! - Timed status effects with exactly-once reversal
//! - Orbiting projectile cohorts with analytically derived positions
//! - Typed command/notification events and combat logging

use bevy::prelude::*;

pub mod components;
pub mod events;
pub mod log;
pub mod systems;
pub mod weapons;

use events::*;
use systems::*;

/// Plugin wiring the whole simulation step into the host's `Update` schedule.
///
/// The host drives the schedule once per tick; `Time` supplies the delta.
/// Collaborators interact exclusively through the typed events in
/// [`events`].
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app
            // Inbound commands
            .add_event::<DamageCommand>()
            .add_event::<HealCommand>()
            .add_event::<ApplyEffectCommand>()
            .add_event::<UpgradeWeaponCommand>()
            .add_event::<OverlapNotification>()
            // Outbound notifications
            .add_event::<DamageTakenEvent>()
            .add_event::<HealedEvent>()
            .add_event::<ActorDiedEvent>()
            .add_event::<DeathConfirmedEvent>()
            .add_event::<EffectAppliedEvent>()
            .add_event::<EffectExpiredEvent>()
            .add_event::<SpawnRequestEvent>()
            .add_event::<WeaponUpgradedEvent>()
            // Resources
            .init_resource::<log::CombatLog>()
            .init_resource::<SimulationSpeed>()
            // Phase ordering for one simulation step
            .configure_sets(
                Update,
                (
                    CombatSet::Effects,
                    CombatSet::Weapons,
                    CombatSet::Projectiles,
                    CombatSet::Resolution,
                    CombatSet::Cleanup,
                )
                    .chain(),
            )
            // Systems
            .add_systems(Update, tick_status_effects.in_set(CombatSet::Effects))
            .add_systems(
                Update,
                (apply_weapon_upgrades, step_weapon_emitters)
                    .chain()
                    .in_set(CombatSet::Weapons),
            )
            .add_systems(
                Update,
                (update_orbiting_projectiles, process_overlap_notifications)
                    .chain()
                    .in_set(CombatSet::Projectiles),
            )
            .add_systems(
                Update,
                (
                    process_damage_commands,
                    process_heal_commands,
                    apply_effect_commands,
                )
                    .chain()
                    .in_set(CombatSet::Resolution),
            )
            .add_systems(
                Update,
                (tick_death_sequences, record_combat_log)
                    .chain()
                    .in_set(CombatSet::Cleanup),
            );
    }
}

/// Controls the speed of the combat simulation.
///
/// `0.0` is the host's pause gate: every time-driven system is a complete
/// no-op while paused. Inbound command events carry no delta time and still
/// resolve, so commands delivered during a pause are not lost.
#[derive(Resource)]
pub struct SimulationSpeed {
    /// Speed multiplier (0.0 = paused, 1.0 = normal)
    pub multiplier: f32,
}

impl Default for SimulationSpeed {
    fn default() -> Self {
        Self { multiplier: 1.0 }
    }
}

impl SimulationSpeed {
    pub fn pause(&mut self) {
        self.multiplier = 0.0;
    }

    pub fn resume(&mut self) {
        self.multiplier = 1.0;
    }

    pub fn is_paused(&self) -> bool {
        self.multiplier == 0.0
    }
}
