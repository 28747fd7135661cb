//! Headless scenario execution
//!
//! Runs a scenario against the combat core without any graphical output,
//! suitable for automated testing and balance analysis. The app steps at a
//! fixed 60 Hz and exits once the actor's death is confirmed or the scenario
//! times out.

use bevy::app::ScheduleRunnerPlugin;
use bevy::prelude::*;
use std::path::Path;
use std::time::Duration;

use crate::combat::components::{ActiveEffects, CombatActor};
use crate::combat::events::{
    ApplyEffectCommand, DamageCommand, DeathConfirmedEvent, HealCommand, SpawnRequestEvent,
    UpgradeWeaponCommand,
};
use crate::combat::log::{CombatLog, CombatLogEventType};
use crate::combat::systems::CombatSet;
use crate::combat::weapons::{WeaponConfigPlugin, WeaponDefinitions, WeaponLoadout};
use crate::combat::{CombatPlugin, SimulationSpeed};

use super::config::{HostAction, ScenarioConfig};

/// Result of a completed headless scenario
///
/// Provides programmatic access to the outcome for testing and analysis.
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    /// Whether the actor was still alive at scenario end
    pub survived: bool,
    /// Health remaining at scenario end (0 if dead)
    pub final_health: i32,
    /// The actor's maximum health
    pub max_health: i32,
    /// Scenario time elapsed, seconds
    pub elapsed: f32,
    /// Number of weapon discharges requested during the run
    pub shots_fired: u32,
    /// Number of combat log entries recorded
    pub log_entries: usize,
}

/// Resource tracking headless scenario state
#[derive(Resource)]
pub struct ScenarioState {
    /// Elapsed scenario time (host time, unaffected by pause)
    pub elapsed: f32,
    /// Index of the next unsent script action
    pub cursor: usize,
    /// Run length before the scenario stops on its own
    pub max_duration: f32,
    /// Custom output path for the combat log
    pub output_path: Option<String>,
    /// Whether the scenario has completed
    pub complete: bool,
    /// Whether the actor's death sequence finished
    pub death_confirmed: bool,
    /// Spawn requests observed so far
    pub shots_fired: u32,
    /// Scenario result (populated on completion)
    pub result: Option<ScenarioResult>,
}

/// The entity being simulated by this scenario
#[derive(Resource)]
pub struct ScenarioActor {
    pub entity: Entity,
}

/// Plugin for headless scenario execution
pub struct ScenarioPlugin {
    pub config: ScenarioConfig,
}

impl Plugin for ScenarioPlugin {
    fn build(&self, app: &mut App) {
        self.config
            .validate()
            .expect("Invalid scenario configuration");

        app.insert_resource(self.config.clone())
            .insert_resource(ScenarioState {
                elapsed: 0.0,
                cursor: 0,
                max_duration: self.config.max_duration_secs,
                output_path: self.config.output_path.clone(),
                complete: false,
                death_confirmed: false,
                shots_fired: 0,
                result: None,
            })
            .add_systems(Startup, scenario_setup)
            .add_systems(Update, scenario_drive.before(CombatSet::Effects))
            .add_systems(
                Update,
                (scenario_track, scenario_check_end)
                    .chain()
                    .after(CombatSet::Cleanup),
            )
            .add_systems(PostUpdate, scenario_exit_on_complete);
    }
}

/// Spawn the scenario actor with its full weapon loadout.
fn scenario_setup(
    mut commands: Commands,
    config: Res<ScenarioConfig>,
    definitions: Res<WeaponDefinitions>,
    mut combat_log: ResMut<CombatLog>,
) {
    combat_log.clear();
    combat_log.log(
        CombatLogEventType::SimEvent,
        "Scenario started (headless mode)".to_string(),
    );

    // Config was validated in plugin build; these cannot fail here
    let actor = CombatActor::new(config.actor.max_health, config.actor.base_move_rate)
        .expect("Invalid actor configuration");
    let loadout =
        WeaponLoadout::from_definitions(&definitions).expect("Invalid weapon definitions");

    let entity = commands
        .spawn((
            Transform::default(),
            actor,
            ActiveEffects::default(),
            loadout,
        ))
        .id();
    commands.insert_resource(ScenarioActor { entity });

    info!(
        "Scenario setup complete: {} hp, {} scripted action(s)",
        config.actor.max_health,
        config.script.len()
    );
}

/// Advance scenario time and replay due script actions as command events.
///
/// Scenario time is host time: it keeps advancing while the simulation is
/// paused so a scripted `resume` can fire.
#[allow(clippy::too_many_arguments)]
fn scenario_drive(
    time: Res<Time>,
    config: Res<ScenarioConfig>,
    actor: Res<ScenarioActor>,
    mut state: ResMut<ScenarioState>,
    mut speed: ResMut<SimulationSpeed>,
    mut damage_commands: EventWriter<DamageCommand>,
    mut heal_commands: EventWriter<HealCommand>,
    mut effect_commands: EventWriter<ApplyEffectCommand>,
    mut upgrade_commands: EventWriter<UpgradeWeaponCommand>,
) {
    if state.complete {
        return;
    }
    state.elapsed += time.delta_secs();

    while state.cursor < config.script.len() && config.script[state.cursor].at <= state.elapsed {
        let entry = &config.script[state.cursor];
        state.cursor += 1;

        match &entry.action {
            HostAction::Damage { amount } => {
                damage_commands.send(DamageCommand {
                    target: actor.entity,
                    amount: *amount,
                });
            }
            HostAction::Heal { amount } => {
                heal_commands.send(HealCommand {
                    target: actor.entity,
                    amount: *amount,
                });
            }
            HostAction::Pickup {
                effect,
                magnitude,
                duration,
            } => {
                effect_commands.send(ApplyEffectCommand {
                    target: actor.entity,
                    kind: *effect,
                    magnitude: *magnitude,
                    duration: *duration,
                });
            }
            HostAction::Upgrade { weapon, level } => {
                upgrade_commands.send(UpgradeWeaponCommand {
                    target: actor.entity,
                    weapon: *weapon,
                    level: *level,
                });
            }
            HostAction::Pause => speed.pause(),
            HostAction::Resume => speed.resume(),
        }
    }
}

/// Fold this tick's outbound events into the scenario state.
fn scenario_track(
    mut state: ResMut<ScenarioState>,
    mut spawn_events: EventReader<SpawnRequestEvent>,
    mut confirmed_events: EventReader<DeathConfirmedEvent>,
) {
    state.shots_fired += spawn_events.read().count() as u32;
    if confirmed_events.read().next().is_some() {
        state.death_confirmed = true;
    }
}

/// End the scenario on confirmed death or timeout.
fn scenario_check_end(
    actors: Query<&CombatActor>,
    actor: Res<ScenarioActor>,
    combat_log: Res<CombatLog>,
    mut state: ResMut<ScenarioState>,
) {
    if state.complete {
        return;
    }

    let timed_out = state.elapsed >= state.max_duration;
    if !state.death_confirmed && !timed_out {
        return;
    }

    if timed_out {
        info!("Scenario timed out after {:.1}s", state.elapsed);
    } else {
        info!("Actor death confirmed after {:.1}s", state.elapsed);
    }

    let (survived, final_health, max_health) = match actors.get(actor.entity) {
        Ok(actor) => (actor.is_alive(), actor.health, actor.max_health),
        Err(_) => (false, 0, 0),
    };

    state.result = Some(ScenarioResult {
        survived,
        final_health,
        max_health,
        elapsed: state.elapsed,
        shots_fired: state.shots_fired,
        log_entries: combat_log.entries.len(),
    });

    if let Some(path) = state.output_path.clone() {
        match combat_log.save_to_file(Path::new(&path)) {
            Ok(()) => println!("Scenario complete. Log saved to: {}", path),
            Err(e) => eprintln!("Failed to save combat log: {}", e),
        }
    }

    state.complete = true;
}

/// Exit the app when the scenario is complete
fn scenario_exit_on_complete(state: Res<ScenarioState>, mut exit: EventWriter<AppExit>) {
    if state.complete {
        exit.send(AppExit::Success);
    }
}

/// Run a headless scenario with the given configuration
pub fn run_scenario(config: ScenarioConfig) -> Result<(), String> {
    config.validate()?;

    println!("Starting headless scenario...");
    println!("  Actor: {} hp", config.actor.max_health);
    println!("  Scripted actions: {}", config.script.len());
    println!("  Max duration: {:.0}s", config.max_duration_secs);

    App::new()
        // Minimal plugins - no window, no rendering
        .add_plugins(
            MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
                1.0 / 60.0,
            ))),
        )
        // Transform plugin needed for actor/projectile positions
        .add_plugins(TransformPlugin)
        // Weapon tuning definitions from config
        .add_plugins(WeaponConfigPlugin)
        // The simulation core
        .add_plugins(CombatPlugin)
        // Our scenario driver
        .add_plugins(ScenarioPlugin { config })
        .run();

    Ok(())
}
