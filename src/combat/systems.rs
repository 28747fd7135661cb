//! Combat systems
//!
//! ECS systems that advance the simulation once per tick. Ordering is
//! explicit: status effects expire before weapons step, projectiles move and
//! report overlaps before damage resolves, and the log records last so it
//! sees every event published in the tick.
//!
//! The pause gate stops the time-driven systems only. Inbound command events
//! carry no delta time and resolve even while paused; deferring them would
//! lose commands once the event buffers cycle.

use bevy::prelude::*;
use std::collections::HashMap;

use super::components::*;
use super::events::*;
use super::log::{CombatLog, CombatLogEventType};
use super::weapons::{WeaponKind, WeaponLoadout};
use super::SimulationSpeed;

/// Explicit phases of one simulation step, chained in declaration order.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CombatSet {
    /// Status-effect timers and expiry reversal
    Effects,
    /// Weapon upgrades and emitter stepping
    Weapons,
    /// Orbit updates and overlap dispatch
    Projectiles,
    /// Damage/heal/effect command resolution
    Resolution,
    /// Death sequencing and log recording
    Cleanup,
}

/// Delta time for this tick after the pause/speed gate.
fn scaled_delta(time: &Time, speed: &SimulationSpeed) -> f32 {
    time.delta_secs() * speed.multiplier
}

/// Advance status-effect timers and reverse expired effects.
///
/// Reversal happens exactly once per expiry, even if the effect was refreshed
/// before expiring: a refresh resets the timer instead of queueing a second
/// reversal.
pub fn tick_status_effects(
    time: Res<Time>,
    speed: Res<SimulationSpeed>,
    mut actors: Query<(Entity, &mut CombatActor, &mut ActiveEffects)>,
    mut expired_events: EventWriter<EffectExpiredEvent>,
) {
    if speed.is_paused() {
        return;
    }
    let dt = scaled_delta(&time, &speed);

    for (entity, mut actor, mut effects) in actors.iter_mut() {
        for kind in advance_effects(&mut actor, &mut effects, dt) {
            expired_events.send(EffectExpiredEvent {
                actor: entity,
                kind,
            });
        }
    }
}

/// Apply weapon upgrade commands from the progression system.
pub fn apply_weapon_upgrades(
    mut upgrades: EventReader<UpgradeWeaponCommand>,
    mut loadouts: Query<&mut WeaponLoadout>,
    mut upgraded_events: EventWriter<WeaponUpgradedEvent>,
) {
    for upgrade in upgrades.read() {
        let Ok(mut loadout) = loadouts.get_mut(upgrade.target) else {
            continue;
        };
        if let Some(emitter) = loadout.emitter_mut(upgrade.weapon) {
            emitter.apply_upgrade(upgrade.level);
            upgraded_events.send(WeaponUpgradedEvent {
                actor: upgrade.target,
                weapon: upgrade.weapon,
                level: upgrade.level,
            });
        }
    }
}

/// Step every emitter of every living actor. A ready emitter publishes a
/// spawn request for the external instantiation collaborator; the orbital
/// cluster also spawns its cohort entities here, since the core owns their
/// timing and positions.
pub fn step_weapon_emitters(
    time: Res<Time>,
    speed: Res<SimulationSpeed>,
    mut commands: Commands,
    mut actors: Query<(Entity, &Transform, &CombatActor, &mut WeaponLoadout)>,
    mut spawn_events: EventWriter<SpawnRequestEvent>,
) {
    if speed.is_paused() {
        return;
    }
    let dt = scaled_delta(&time, &speed);

    for (entity, transform, actor, mut loadout) in actors.iter_mut() {
        if !actor.is_alive() {
            continue;
        }

        for emitter in loadout.emitters.iter_mut() {
            let Some(request) = emitter.step(dt) else {
                continue;
            };

            spawn_events.send(SpawnRequestEvent {
                weapon: request.kind,
                owner: entity,
                origin: transform.translation,
                count: request.count,
            });

            match request.kind {
                // Instantaneous discharge: back to Idle within the same step
                WeaponKind::ForwardShot | WeaponKind::RangedBolt => {
                    emitter.notify_discharge_complete();
                }
                // The cohort keeps the emitter in Firing until every
                // instance has expired
                WeaponKind::OrbitalCluster => {
                    let damage = emitter.damage();
                    let step_deg = 360.0 / request.count as f32;
                    for i in 0..request.count {
                        let instance = OrbitingProjectile::new(
                            entity,
                            i as f32 * step_deg,
                            emitter.tuning.duration,
                            damage,
                            emitter.tuning.orbit_radius,
                            emitter.tuning.rotation_deg_per_sec,
                        );
                        let position = instance.position(transform.translation);
                        commands.spawn((instance, Transform::from_translation(position)));
                    }
                }
            }
        }
    }
}

/// Advance orbiting projectiles: accumulate lifetimes, derive positions
/// analytically from elapsed time, despawn expired instances, and re-arm the
/// owning emitter once the last instance of a cohort is gone.
pub fn update_orbiting_projectiles(
    time: Res<Time>,
    speed: Res<SimulationSpeed>,
    mut commands: Commands,
    owners: Query<&Transform, With<CombatActor>>,
    mut instances: Query<(Entity, &mut OrbitingProjectile, &mut Transform), Without<CombatActor>>,
    mut loadouts: Query<&mut WeaponLoadout>,
) {
    if speed.is_paused() {
        return;
    }
    let dt = scaled_delta(&time, &speed);

    // Per owner: (instances still alive, any instance expired this tick)
    let mut cohorts: HashMap<Entity, (u32, bool)> = HashMap::new();

    for (entity, mut instance, mut transform) in instances.iter_mut() {
        instance.elapsed += dt;
        let entry = cohorts.entry(instance.owner).or_insert((0, false));

        if instance.is_expired() {
            entry.1 = true;
            commands.entity(entity).despawn();
            continue;
        }

        match owners.get(instance.owner) {
            Ok(owner_transform) => {
                transform.translation = instance.position(owner_transform.translation);
                entry.0 += 1;
            }
            // Owner gone: the instance has nothing to orbit
            Err(_) => {
                entry.1 = true;
                commands.entity(entity).despawn();
            }
        }
    }

    for (owner, (alive, any_expired)) in cohorts {
        if any_expired && alive == 0 {
            if let Ok(mut loadout) = loadouts.get_mut(owner) {
                if let Some(emitter) = loadout.emitter_mut(WeaponKind::OrbitalCluster) {
                    emitter.notify_discharge_complete();
                }
            }
        }
    }
}

/// Dispatch overlap notifications from the collision collaborator to the
/// matching orbiting instance. Unknown instance ids (already expired) are
/// silently ignored; hits inside the per-target cooldown window are dropped.
pub fn process_overlap_notifications(
    mut notifications: EventReader<OverlapNotification>,
    mut instances: Query<&mut OrbitingProjectile>,
    mut damage_commands: EventWriter<DamageCommand>,
) {
    for notification in notifications.read() {
        let Ok(mut instance) = instances.get_mut(notification.instance) else {
            continue;
        };
        if instance.try_register_hit(notification.target) {
            damage_commands.send(DamageCommand {
                target: notification.target,
                amount: instance.damage,
            });
        }
    }
}

/// Resolve damage commands: apply mitigation, clamp health at zero, and fire
/// the terminal death transition exactly once.
pub fn process_damage_commands(
    mut commands: Commands,
    mut damage_commands: EventReader<DamageCommand>,
    mut actors: Query<&mut CombatActor>,
    mut taken_events: EventWriter<DamageTakenEvent>,
    mut died_events: EventWriter<ActorDiedEvent>,
) {
    for command in damage_commands.read() {
        let Ok(mut actor) = actors.get_mut(command.target) else {
            continue;
        };
        match actor.apply_damage(command.amount) {
            DamageOutcome::Ignored => {}
            DamageOutcome::Damaged(amount) => {
                taken_events.send(DamageTakenEvent {
                    actor: command.target,
                    amount,
                });
            }
            DamageOutcome::Killed(_) => {
                died_events.send(ActorDiedEvent {
                    actor: command.target,
                });
                commands.entity(command.target).insert(DeathSequence::default());
            }
        }
    }
}

/// Resolve heal commands. Healing a dead actor is a no-op.
pub fn process_heal_commands(
    mut heal_commands: EventReader<HealCommand>,
    mut actors: Query<&mut CombatActor>,
    mut healed_events: EventWriter<HealedEvent>,
) {
    for command in heal_commands.read() {
        let Ok(mut actor) = actors.get_mut(command.target) else {
            continue;
        };
        if let Some(amount) = actor.apply_heal(command.amount) {
            healed_events.send(HealedEvent {
                actor: command.target,
                amount,
            });
        }
    }
}

/// Apply pickup effects: the modifier takes hold immediately and the timed
/// entry replaces any existing effect of the same kind.
///
/// The published magnitude is the display value: speed as a multiple of the
/// base rate ("2x speed"), mitigation as the applied fraction.
pub fn apply_effect_commands(
    mut effect_commands: EventReader<ApplyEffectCommand>,
    mut actors: Query<(&mut CombatActor, &mut ActiveEffects)>,
    mut applied_events: EventWriter<EffectAppliedEvent>,
) {
    for command in effect_commands.read() {
        if command.duration <= 0.0 {
            warn!(
                "Ignoring {} effect with non-positive duration {}",
                command.kind.name(),
                command.duration
            );
            continue;
        }
        let Ok((mut actor, mut effects)) = actors.get_mut(command.target) else {
            continue;
        };
        if !actor.is_alive() {
            continue;
        }

        let notified = match command.kind {
            EffectKind::SpeedBoost => {
                actor.current_move_rate = command.magnitude;
                effects.apply(command.kind, command.magnitude, command.duration);
                command.magnitude / actor.base_move_rate
            }
            EffectKind::DamageMitigation => {
                let clamped = command.magnitude.clamp(0.0, 1.0);
                actor.damage_reduction = clamped;
                effects.apply(command.kind, clamped, command.duration);
                clamped
            }
        };

        applied_events.send(EffectAppliedEvent {
            actor: command.target,
            kind: command.kind,
            magnitude: notified,
        });
    }
}

/// Count down the post-death delay and publish the confirmation exactly once.
pub fn tick_death_sequences(
    time: Res<Time>,
    speed: Res<SimulationSpeed>,
    mut commands: Commands,
    mut sequences: Query<(Entity, &mut DeathSequence)>,
    mut confirmed_events: EventWriter<DeathConfirmedEvent>,
) {
    if speed.is_paused() {
        return;
    }
    let dt = scaled_delta(&time, &speed);

    for (entity, mut sequence) in sequences.iter_mut() {
        sequence.remaining -= dt;
        if sequence.remaining <= 0.0 {
            confirmed_events.send(DeathConfirmedEvent { actor: entity });
            commands.entity(entity).remove::<DeathSequence>();
        }
    }
}

/// Record every outbound event published this tick into the combat log.
#[allow(clippy::too_many_arguments)]
pub fn record_combat_log(
    time: Res<Time>,
    speed: Res<SimulationSpeed>,
    mut combat_log: ResMut<CombatLog>,
    mut damage_events: EventReader<DamageTakenEvent>,
    mut healed_events: EventReader<HealedEvent>,
    mut died_events: EventReader<ActorDiedEvent>,
    mut confirmed_events: EventReader<DeathConfirmedEvent>,
    mut applied_events: EventReader<EffectAppliedEvent>,
    mut expired_events: EventReader<EffectExpiredEvent>,
    mut spawn_events: EventReader<SpawnRequestEvent>,
    mut upgraded_events: EventReader<WeaponUpgradedEvent>,
) {
    combat_log.sim_time += scaled_delta(&time, &speed);

    for event in damage_events.read() {
        combat_log.log(
            CombatLogEventType::Damage,
            format!("{:?} takes {} damage", event.actor, event.amount),
        );
    }
    for event in healed_events.read() {
        combat_log.log(
            CombatLogEventType::Healing,
            format!("{:?} healed for {}", event.actor, event.amount),
        );
    }
    for event in died_events.read() {
        combat_log.log(
            CombatLogEventType::Death,
            format!("{:?} has died", event.actor),
        );
    }
    for event in confirmed_events.read() {
        combat_log.log(
            CombatLogEventType::DeathConfirmed,
            format!("{:?} death confirmed", event.actor),
        );
    }
    for event in applied_events.read() {
        combat_log.log(
            CombatLogEventType::EffectApplied,
            format!(
                "{:?} gains {} ({:.2})",
                event.actor,
                event.kind.name(),
                event.magnitude
            ),
        );
    }
    for event in expired_events.read() {
        combat_log.log(
            CombatLogEventType::EffectExpired,
            format!("{:?} loses {}", event.actor, event.kind.name()),
        );
    }
    for event in spawn_events.read() {
        combat_log.log(
            CombatLogEventType::WeaponFired,
            format!(
                "{:?} fires {} ({} instance(s))",
                event.owner,
                event.weapon.name(),
                event.count
            ),
        );
    }
    for event in upgraded_events.read() {
        combat_log.log(
            CombatLogEventType::Upgrade,
            format!(
                "{:?} upgrades {} to level {}",
                event.actor,
                event.weapon.name(),
                event.level
            ),
        );
    }
}
