//! Combat events
//!
//! Typed events that flow through the simulation each tick. Inbound command
//! events are issued by the host (input mapping, pickup collision, progression
//! system); outbound notification events are consumed by UI/audio/animation
//! collaborators and by the combat log.

use bevy::prelude::*;

use super::components::EffectKind;
use super::weapons::WeaponKind;

// ============================================================================
// Inbound commands (host -> core)
// ============================================================================

/// Command to deal raw damage to an actor. Mitigation is applied by the core.
#[derive(Event)]
pub struct DamageCommand {
    /// Actor receiving the damage
    pub target: Entity,
    /// Raw damage before mitigation
    pub amount: i32,
}

/// Command to heal an actor. Clamped to the actor's maximum health.
#[derive(Event)]
pub struct HealCommand {
    /// Actor receiving the heal
    pub target: Entity,
    /// Heal amount
    pub amount: i32,
}

/// Command to apply a timed status effect (a pickup) to an actor.
///
/// Re-applying an effect of the same kind replaces the previous application
/// rather than stacking.
#[derive(Event)]
pub struct ApplyEffectCommand {
    /// Actor receiving the effect
    pub target: Entity,
    /// Effect category
    pub kind: EffectKind,
    /// New move rate for SpeedBoost, reduction fraction for DamageMitigation
    pub magnitude: f32,
    /// Effect duration in seconds
    pub duration: f32,
}

/// Command from the progression system to upgrade one of an actor's weapons.
///
/// Levels apply cumulatively and are not reversible.
#[derive(Event)]
pub struct UpgradeWeaponCommand {
    /// Actor whose loadout is upgraded
    pub target: Entity,
    /// Which weapon to upgrade
    pub weapon: WeaponKind,
    /// Level being granted
    pub level: u8,
}

/// Overlap notification from the external collision collaborator.
///
/// A notification referencing an already-despawned instance is silently
/// ignored (an expiry/collision race is expected, not an error).
#[derive(Event)]
pub struct OverlapNotification {
    /// The orbiting projectile instance that overlapped something
    pub instance: Entity,
    /// The actor it overlapped
    pub target: Entity,
}

// ============================================================================
// Outbound notifications (core -> collaborators)
// ============================================================================

/// Event fired when an actor takes a non-lethal hit
#[derive(Event)]
pub struct DamageTakenEvent {
    /// Actor that was hit
    pub actor: Entity,
    /// Damage after mitigation
    pub amount: i32,
}

/// Event fired when an actor is healed
#[derive(Event)]
pub struct HealedEvent {
    /// Actor that was healed
    pub actor: Entity,
    /// Amount requested (display value; health itself is clamped)
    pub amount: i32,
}

/// Event fired exactly once when an actor's health reaches zero
#[derive(Event)]
pub struct ActorDiedEvent {
    /// Actor that died
    pub actor: Entity,
}

/// Event fired once the post-death delay has elapsed (death animation window)
#[derive(Event)]
pub struct DeathConfirmedEvent {
    /// Actor whose death sequence completed
    pub actor: Entity,
}

/// Event fired when a status effect is applied or refreshed
#[derive(Event)]
pub struct EffectAppliedEvent {
    /// Actor the effect is on
    pub actor: Entity,
    /// Effect category
    pub kind: EffectKind,
    /// Display magnitude: speed as a multiple of the actor's base rate,
    /// mitigation as the applied fraction
    pub magnitude: f32,
}

/// Event fired when a weapon upgrade has been applied to an actor's loadout
#[derive(Event)]
pub struct WeaponUpgradedEvent {
    /// Actor whose loadout changed
    pub actor: Entity,
    /// Which weapon was upgraded
    pub weapon: WeaponKind,
    /// Level granted
    pub level: u8,
}

/// Event fired exactly once when a status effect expires and is reversed
#[derive(Event)]
pub struct EffectExpiredEvent {
    /// Actor the effect was on
    pub actor: Entity,
    /// Effect category
    pub kind: EffectKind,
}

/// Spawn request for the external instantiation collaborator.
///
/// The collaborator creates the visual/physics representation and routes
/// later overlap notifications back with the instance entity id.
#[derive(Event)]
pub struct SpawnRequestEvent {
    /// Which weapon fired
    pub weapon: WeaponKind,
    /// Actor that owns the weapon
    pub owner: Entity,
    /// Owner position at the moment of firing
    pub origin: Vec3,
    /// Number of projectile instances in this discharge
    pub count: u32,
}
