//! App-driven tests for the full simulation pipeline
//!
//! These tests run the combat plugin inside a real app with a manually
//! advanced clock and verify that:
//! - Inbound commands resolve even while the simulation is paused
//! - Pausing freezes every time-driven system without losing state
//! - The death sequence publishes its confirmation exactly once, after 1.2 s
//! - An orbital cohort re-arms its emitter once the last instance expires
//! - Overlap notifications dispatch debounced damage to the target

use std::time::Duration;

use bevy::prelude::*;
use survsim::combat::components::{
    ActiveEffects, CombatActor, DeathSequence, EffectKind, OrbitingProjectile,
};
use survsim::combat::events::{
    ApplyEffectCommand, DamageCommand, HealCommand, OverlapNotification, UpgradeWeaponCommand,
};
use survsim::combat::log::{CombatLog, CombatLogEventType};
use survsim::combat::weapons::{
    EmitterState, WeaponEmitter, WeaponKind, WeaponLoadout, WeaponTuning,
};
use survsim::combat::{CombatPlugin, SimulationSpeed};

fn create_app() -> App {
    let mut app = App::new();
    app.add_plugins(CombatPlugin);
    // The clock is driven by hand so each test controls its deltas exactly
    app.init_resource::<Time>();
    app
}

fn advance(app: &mut App, secs: f32) {
    app.world_mut()
        .resource_mut::<Time>()
        .advance_by(Duration::from_secs_f32(secs));
    app.update();
}

fn spawn_actor(app: &mut App) -> Entity {
    let actor = CombatActor::new(100, 2.5).expect("Valid actor config");
    app.world_mut()
        .spawn((Transform::default(), actor, ActiveEffects::default()))
        .id()
}

fn orbital_tuning(starts_enabled: bool) -> WeaponTuning {
    WeaponTuning {
        cooldown: 5.0,
        base_damage: 10,
        damage_pct: 0.9,
        count: 4,
        duration: 5.0,
        rotation_deg_per_sec: 180.0,
        orbit_radius: 2.0,
        starts_enabled,
    }
}

fn spawn_actor_with_orbital(app: &mut App, starts_enabled: bool) -> Entity {
    let actor = CombatActor::new(100, 2.5).expect("Valid actor config");
    let emitter =
        WeaponEmitter::from_tuning(WeaponKind::OrbitalCluster, orbital_tuning(starts_enabled))
            .expect("Valid orbital tuning");
    app.world_mut()
        .spawn((
            Transform::default(),
            actor,
            ActiveEffects::default(),
            WeaponLoadout {
                emitters: vec![emitter],
            },
        ))
        .id()
}

fn health(app: &App, entity: Entity) -> i32 {
    app.world().get::<CombatActor>(entity).expect("Actor exists").health
}

fn orbiter_count(app: &mut App) -> usize {
    app.world_mut()
        .query::<&OrbitingProjectile>()
        .iter(app.world())
        .count()
}

fn orbital_state(app: &App, entity: Entity) -> EmitterState {
    app.world()
        .get::<WeaponLoadout>(entity)
        .expect("Loadout exists")
        .emitter(WeaponKind::OrbitalCluster)
        .expect("Orbital emitter exists")
        .state()
}

fn log_count(app: &App, event_type: CombatLogEventType) -> usize {
    app.world()
        .resource::<CombatLog>()
        .filter_by_type(event_type)
        .len()
}

// =============================================================================
// Commands During Pause Tests
// =============================================================================

#[test]
fn test_damage_command_resolves_while_paused() {
    let mut app = create_app();
    let entity = spawn_actor(&mut app);

    app.world_mut().resource_mut::<SimulationSpeed>().pause();
    app.world_mut().send_event(DamageCommand {
        target: entity,
        amount: 30,
    });

    // Enough frames for the event buffers to cycle several times
    for _ in 0..10 {
        advance(&mut app, 0.05);
    }
    assert_eq!(health(&app, entity), 70, "Damage must resolve even while paused");

    app.world_mut().resource_mut::<SimulationSpeed>().resume();
    for _ in 0..5 {
        advance(&mut app, 0.05);
    }
    assert_eq!(health(&app, entity), 70, "No re-application after resume");
}

#[test]
fn test_heal_and_upgrade_commands_resolve_while_paused() {
    let mut app = create_app();
    let entity = spawn_actor_with_orbital(&mut app, false);

    app.world_mut().send_event(DamageCommand {
        target: entity,
        amount: 40,
    });
    advance(&mut app, 0.05);
    assert_eq!(health(&app, entity), 60);

    app.world_mut().resource_mut::<SimulationSpeed>().pause();
    app.world_mut().send_event(HealCommand {
        target: entity,
        amount: 20,
    });
    app.world_mut().send_event(UpgradeWeaponCommand {
        target: entity,
        weapon: WeaponKind::OrbitalCluster,
        level: 1,
    });
    for _ in 0..10 {
        advance(&mut app, 0.05);
    }

    assert_eq!(health(&app, entity), 80, "Heal must resolve even while paused");
    assert_eq!(
        orbital_state(&app, entity),
        EmitterState::Idle,
        "Upgrade must unlock the weapon even while paused"
    );
    assert_eq!(
        log_count(&app, CombatLogEventType::Upgrade),
        1,
        "Applied upgrades are recorded in the combat log"
    );
}

// =============================================================================
// Pause Gate Tests
// =============================================================================

#[test]
fn test_pause_freezes_effect_and_weapon_timers() {
    let mut app = create_app();
    let entity = spawn_actor_with_orbital(&mut app, true);

    app.world_mut().send_event(ApplyEffectCommand {
        target: entity,
        kind: EffectKind::SpeedBoost,
        magnitude: 5.0,
        duration: 10.0,
    });
    advance(&mut app, 0.1);

    app.world_mut().resource_mut::<SimulationSpeed>().pause();
    for _ in 0..5 {
        advance(&mut app, 60.0);
    }

    // Far past both the effect duration and the weapon cooldown, yet frozen
    let actor = app.world().get::<CombatActor>(entity).expect("Actor exists");
    assert_eq!(actor.current_move_rate, 5.0, "Effect must not expire while paused");
    assert_eq!(orbiter_count(&mut app), 0, "Weapon must not fire while paused");
    assert_eq!(orbital_state(&app, entity), EmitterState::Idle);

    app.world_mut().resource_mut::<SimulationSpeed>().resume();
    advance(&mut app, 1.0);
    assert_eq!(orbiter_count(&mut app), 4, "Pre-armed weapon fires after resume");
    let actor = app.world().get::<CombatActor>(entity).expect("Actor exists");
    assert_eq!(actor.current_move_rate, 5.0, "Effect clock resumes where it stopped");
}

// =============================================================================
// Effect Notification Tests
// =============================================================================

#[test]
fn test_speed_pickup_is_reported_relative_to_base_rate() {
    let mut app = create_app();
    let entity = spawn_actor(&mut app);

    // Base rate 2.5, boosted to 5.0: reported as a 2x multiplier
    app.world_mut().send_event(ApplyEffectCommand {
        target: entity,
        kind: EffectKind::SpeedBoost,
        magnitude: 5.0,
        duration: 10.0,
    });
    advance(&mut app, 0.05);

    let log = app.world().resource::<CombatLog>();
    let applied = log.filter_by_type(CombatLogEventType::EffectApplied);
    assert_eq!(applied.len(), 1);
    assert!(
        applied[0].message.contains("(2.00)"),
        "Speed is reported as a multiple of the base rate, got: {}",
        applied[0].message
    );

    let actor = app.world().get::<CombatActor>(entity).expect("Actor exists");
    assert_eq!(actor.current_move_rate, 5.0, "The applied rate itself stays absolute");
}

// =============================================================================
// Death Sequencing Tests
// =============================================================================

#[test]
fn test_death_confirmation_fires_once_after_delay() {
    let mut app = create_app();
    let entity = spawn_actor(&mut app);

    app.world_mut().send_event(DamageCommand {
        target: entity,
        amount: 1000,
    });
    advance(&mut app, 0.05);

    assert_eq!(health(&app, entity), 0);
    assert!(
        app.world().get::<DeathSequence>(entity).is_some(),
        "Death starts the confirmation countdown"
    );
    assert_eq!(log_count(&app, CombatLogEventType::Death), 1);
    assert_eq!(log_count(&app, CombatLogEventType::DeathConfirmed), 0);

    // 1.05 s of the 1.2 s delay elapsed: not confirmed yet
    advance(&mut app, 1.0);
    assert_eq!(
        log_count(&app, CombatLogEventType::DeathConfirmed),
        0,
        "Confirmation must wait out the full delay"
    );

    advance(&mut app, 0.3);
    assert_eq!(log_count(&app, CombatLogEventType::DeathConfirmed), 1);
    assert!(
        app.world().get::<DeathSequence>(entity).is_none(),
        "The countdown is removed on confirmation"
    );

    for _ in 0..5 {
        advance(&mut app, 1.0);
    }
    assert_eq!(
        log_count(&app, CombatLogEventType::DeathConfirmed),
        1,
        "Confirmation is published exactly once"
    );
}

// =============================================================================
// Orbital Cohort Lifecycle Tests
// =============================================================================

#[test]
fn test_cohort_expiry_rearms_the_orbital_emitter() {
    let mut app = create_app();
    let entity = spawn_actor_with_orbital(&mut app, true);

    // Pre-armed cooldown (elapsed 4.0 of 5.0) crosses within the first second
    advance(&mut app, 1.0);
    assert_eq!(orbiter_count(&mut app), 4, "A full cohort spawns on fire");
    assert_eq!(orbital_state(&app, entity), EmitterState::Firing);

    advance(&mut app, 2.0);
    assert_eq!(orbiter_count(&mut app), 4, "Cohort lives out its duration");
    assert_eq!(
        orbital_state(&app, entity),
        EmitterState::Firing,
        "No cooldown accumulation while the cohort is live"
    );

    // Past the 5 s lifetime: every instance despawns and the emitter re-arms
    advance(&mut app, 3.1);
    assert_eq!(orbiter_count(&mut app), 0, "Expired cohort despawns");
    assert_eq!(orbital_state(&app, entity), EmitterState::Idle);

    // The next full cooldown elapses before the second discharge
    advance(&mut app, 4.9);
    assert_eq!(orbiter_count(&mut app), 0, "No fire before the cooldown crosses");
    advance(&mut app, 0.2);
    assert_eq!(orbiter_count(&mut app), 4, "Second discharge after a full cooldown");
    assert_eq!(orbital_state(&app, entity), EmitterState::Firing);
}

// =============================================================================
// Overlap Dispatch Tests
// =============================================================================

#[test]
fn test_overlap_notifications_deal_debounced_damage() {
    let mut app = create_app();
    spawn_actor_with_orbital(&mut app, true);
    let target = spawn_actor(&mut app);

    advance(&mut app, 1.0);
    let instance = app
        .world_mut()
        .query_filtered::<Entity, With<OrbitingProjectile>>()
        .iter(app.world())
        .next()
        .expect("Cohort spawned");

    // First overlap deals floor(10 * 0.9) = 9
    app.world_mut().send_event(OverlapNotification { instance, target });
    advance(&mut app, 0.1);
    assert_eq!(health(&app, target), 91);

    // Re-overlap inside the hit window is dropped
    app.world_mut().send_event(OverlapNotification { instance, target });
    advance(&mut app, 0.1);
    assert_eq!(health(&app, target), 91, "Hit inside the window must not damage");

    // Past the window, sustained contact damages again
    advance(&mut app, 0.5);
    app.world_mut().send_event(OverlapNotification { instance, target });
    advance(&mut app, 0.1);
    assert_eq!(health(&app, target), 82);
}

#[test]
fn test_overlap_for_unknown_instance_is_ignored() {
    let mut app = create_app();
    let target = spawn_actor(&mut app);

    // An instance id that never existed (e.g. expired before the
    // notification arrived) is silently dropped
    app.world_mut().send_event(OverlapNotification {
        instance: Entity::from_raw(9999),
        target,
    });
    advance(&mut app, 0.1);
    assert_eq!(health(&app, target), 100);
}
