//! Component definitions for the combat core
//!
//! Rich data types with the pure state-transition logic of the simulation:
//! actor health and modifiers, the shared cooldown timer, timed status
//! effects, orbiting projectile instances, and the death-confirmation delay.
//! ECS systems in `systems.rs` drive these once per tick.

use bevy::prelude::*;
use smallvec::SmallVec;
use serde::{Deserialize, Serialize};

/// Default duration of a time-based pickup effect, in simulated seconds.
pub const DEFAULT_EFFECT_DURATION_SECS: f32 = 10.0;

/// Delay between an actor's death and the death-confirmation notification,
/// giving the animation collaborator time to play the death animation.
pub const DEATH_CONFIRM_DELAY_SECS: f32 = 1.2;

/// How close to ready a cooldown is pre-armed when a weapon unlocks, so the
/// first discharge happens almost immediately rather than after a full cycle.
pub const PREARM_LEAD_SECS: f32 = 1.0;

/// Minimum simulated time between two hits from the same orbiting instance
/// on the same target. Sustained contact still damages repeatedly, but a
/// per-frame overlap stream cannot multi-hit within this window.
pub const ORBIT_HIT_COOLDOWN_SECS: f32 = 0.5;

// ============================================================================
// CombatActor
// ============================================================================

/// Outcome of applying raw damage to an actor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// The actor is already dead; nothing happened
    Ignored,
    /// The actor survived the hit (effective amount after mitigation)
    Damaged(i32),
    /// The hit reduced health to zero (effective amount after mitigation)
    Killed(i32),
}

/// Health, movement and mitigation state for one combat actor.
///
/// Used for the player and for any damageable target of the orbiting weapon,
/// so multiple actors can be simulated independently. All mutation goes
/// through the methods here so movement and damage systems always read
/// consistent modifier values within a tick.
#[derive(Component, Debug, Clone)]
pub struct CombatActor {
    /// Current hit points, always in `[0, max_health]`
    pub health: i32,
    /// Maximum hit points, always positive
    pub max_health: i32,
    /// Unmodified movement rate
    pub base_move_rate: f32,
    /// Movement rate after speed effects; reset to base on expiry
    pub current_move_rate: f32,
    /// Fraction of incoming damage removed, in `[0, 1]`
    pub damage_reduction: f32,
    alive: bool,
}

impl CombatActor {
    /// Create an actor at full health. Fails fast on non-positive max health.
    pub fn new(max_health: i32, base_move_rate: f32) -> Result<Self, String> {
        if max_health <= 0 {
            return Err(format!("max_health must be positive, got {max_health}"));
        }
        if base_move_rate <= 0.0 {
            return Err(format!(
                "base_move_rate must be positive, got {base_move_rate}"
            ));
        }
        Ok(Self {
            health: max_health,
            max_health,
            base_move_rate,
            current_move_rate: base_move_rate,
            damage_reduction: 0.0,
            alive: true,
        })
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Current health as a fraction of maximum, for health-bar collaborators.
    pub fn health_fraction(&self) -> f32 {
        self.health as f32 / self.max_health as f32
    }

    /// Apply raw damage. The effective amount is the raw amount scaled by the
    /// current mitigation fraction, truncated toward zero, and health never
    /// goes below zero. Death is terminal: once health reaches zero the actor
    /// is marked dead and later calls are ignored.
    pub fn apply_damage(&mut self, raw: i32) -> DamageOutcome {
        if !self.alive {
            return DamageOutcome::Ignored;
        }
        let effective = (raw.max(0) as f32 * (1.0 - self.damage_reduction)) as i32;
        self.health = (self.health - effective).max(0);
        if self.health == 0 {
            self.alive = false;
            DamageOutcome::Killed(effective)
        } else {
            DamageOutcome::Damaged(effective)
        }
    }

    /// Heal up to max health. Returns the heal amount for notification, or
    /// `None` if the actor is dead (healing the dead is a no-op, not an error).
    pub fn apply_heal(&mut self, amount: i32) -> Option<i32> {
        if !self.alive {
            return None;
        }
        self.health = (self.health + amount.max(0)).min(self.max_health);
        Some(amount.max(0))
    }
}

// ============================================================================
// CooldownTimer
// ============================================================================

/// Accumulate-and-fire timer shared by every weapon emitter.
///
/// Fires at most once per `accumulate` call: a delta that overshoots the
/// threshold by several periods still yields a single fire with no backlog.
#[derive(Debug, Clone)]
pub struct CooldownTimer {
    elapsed: f32,
    threshold: f32,
}

impl CooldownTimer {
    /// Create a timer. A non-positive threshold is a configuration error.
    pub fn new(threshold: f32) -> Result<Self, String> {
        if threshold <= 0.0 {
            return Err(format!(
                "cooldown threshold must be positive, got {threshold}"
            ));
        }
        Ok(Self {
            elapsed: 0.0,
            threshold,
        })
    }

    /// Advance the timer. Returns true exactly once per threshold crossing
    /// and resets the accumulator; excess time is discarded.
    pub fn accumulate(&mut self, dt: f32) -> bool {
        self.elapsed += dt;
        if self.elapsed >= self.threshold {
            self.elapsed = 0.0;
            true
        } else {
            false
        }
    }

    /// Change the threshold (e.g. a cooldown upgrade). Takes effect on the
    /// next accumulation, never retroactively.
    ///
    /// Panics on a non-positive threshold; upgrade tables only scale positive
    /// values so this is a programmer error, not a runtime condition.
    pub fn set_threshold(&mut self, threshold: f32) {
        assert!(threshold > 0.0, "cooldown threshold must be positive");
        self.threshold = threshold;
    }

    /// Pre-set the accumulator close to the threshold so the next cycle fires
    /// within [`PREARM_LEAD_SECS`]. Used when a weapon is first unlocked.
    pub fn arm_nearly_ready(&mut self) {
        self.elapsed = (self.threshold - PREARM_LEAD_SECS).max(0.0);
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.0;
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }
}

// ============================================================================
// Status effects
// ============================================================================

/// Category of a timed status effect. At most one effect per kind is active
/// on an actor at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    /// Sets the actor's current move rate to the effect magnitude
    SpeedBoost,
    /// Sets the actor's damage reduction fraction to the effect magnitude
    DamageMitigation,
}

impl EffectKind {
    pub fn name(&self) -> &'static str {
        match self {
            EffectKind::SpeedBoost => "SpeedBoost",
            EffectKind::DamageMitigation => "DamageMitigation",
        }
    }
}

/// One active timed modifier on an actor
#[derive(Debug, Clone)]
pub struct StatusEffect {
    pub kind: EffectKind,
    pub magnitude: f32,
    pub elapsed: f32,
    pub duration: f32,
}

/// The set of active status effects on an actor.
#[derive(Component, Debug, Default)]
pub struct ActiveEffects {
    pub effects: SmallVec<[StatusEffect; 2]>,
}

impl ActiveEffects {
    /// Apply an effect, replacing any existing effect of the same kind
    /// (elapsed time resets, magnitude and duration are updated).
    pub fn apply(&mut self, kind: EffectKind, magnitude: f32, duration: f32) {
        if let Some(existing) = self.effects.iter_mut().find(|e| e.kind == kind) {
            existing.magnitude = magnitude;
            existing.duration = duration;
            existing.elapsed = 0.0;
        } else {
            self.effects.push(StatusEffect {
                kind,
                magnitude,
                elapsed: 0.0,
                duration,
            });
        }
    }

    pub fn get(&self, kind: EffectKind) -> Option<&StatusEffect> {
        self.effects.iter().find(|e| e.kind == kind)
    }
}

/// Advance all effects on an actor by `dt`, reversing and removing any that
/// expired. Returns the expired kinds so the caller can publish expiry events.
///
/// The reversal is applied exactly once per expiry: speed effects restore the
/// base move rate, mitigation effects reset the reduction fraction to zero.
pub fn advance_effects(
    actor: &mut CombatActor,
    effects: &mut ActiveEffects,
    dt: f32,
) -> SmallVec<[EffectKind; 2]> {
    let mut expired = SmallVec::new();
    for effect in effects.effects.iter_mut() {
        effect.elapsed += dt;
        if effect.elapsed > effect.duration {
            match effect.kind {
                EffectKind::SpeedBoost => actor.current_move_rate = actor.base_move_rate,
                EffectKind::DamageMitigation => actor.damage_reduction = 0.0,
            }
            expired.push(effect.kind);
        }
    }
    effects.effects.retain(|e| e.elapsed <= e.duration);
    expired
}

// ============================================================================
// Orbiting projectiles
// ============================================================================

/// One instance of an orbiting projectile cohort.
///
/// Position is derived analytically from elapsed time and a fixed angular
/// rate rather than integrated from a mutable angle, so the instances of a
/// cohort never drift out of phase with each other.
#[derive(Component, Debug)]
pub struct OrbitingProjectile {
    /// Owning actor (back-reference; the instance never outlives the actor's
    /// simulation, it only reads the actor's position)
    pub owner: Entity,
    /// Fixed phase offset within the cohort, degrees
    pub angle_offset_deg: f32,
    /// Time this instance has been active, seconds
    pub elapsed: f32,
    /// Lifetime of the instance, seconds
    pub duration: f32,
    /// Damage dealt per registered hit
    pub damage: i32,
    /// Orbit radius around the owner
    pub radius: f32,
    /// Angular velocity, degrees per second
    pub rotation_deg_per_sec: f32,
    recent_hits: SmallVec<[(Entity, f32); 4]>,
}

impl OrbitingProjectile {
    pub fn new(
        owner: Entity,
        angle_offset_deg: f32,
        duration: f32,
        damage: i32,
        radius: f32,
        rotation_deg_per_sec: f32,
    ) -> Self {
        Self {
            owner,
            angle_offset_deg,
            elapsed: 0.0,
            duration,
            damage,
            radius,
            rotation_deg_per_sec,
            recent_hits: SmallVec::new(),
        }
    }

    /// Position of this instance for the current elapsed time, in the plane
    /// of the 2D simulation.
    pub fn position(&self, owner_pos: Vec3) -> Vec3 {
        let angle =
            (self.rotation_deg_per_sec * self.elapsed + self.angle_offset_deg).to_radians();
        owner_pos + Vec3::new(angle.cos(), angle.sin(), 0.0) * self.radius
    }

    pub fn is_expired(&self) -> bool {
        self.elapsed > self.duration
    }

    /// Register an overlap with `target`. Returns true if the hit should deal
    /// damage, false if it falls inside the per-target hit cooldown window.
    pub fn try_register_hit(&mut self, target: Entity) -> bool {
        if let Some((_, last)) = self.recent_hits.iter_mut().find(|(e, _)| *e == target) {
            if self.elapsed - *last < ORBIT_HIT_COOLDOWN_SECS {
                return false;
            }
            *last = self.elapsed;
            true
        } else {
            self.recent_hits.push((target, self.elapsed));
            true
        }
    }
}

// ============================================================================
// Death sequencing
// ============================================================================

/// Cross-tick state for the post-death confirmation delay.
///
/// Inserted when an actor dies; no other mutation happens to the actor while
/// this counts down (damage and heals are already no-ops on a dead actor).
#[derive(Component, Debug)]
pub struct DeathSequence {
    /// Seconds remaining until the death-confirmed notification
    pub remaining: f32,
}

impl Default for DeathSequence {
    fn default() -> Self {
        Self {
            remaining: DEATH_CONFIRM_DELAY_SECS,
        }
    }
}
