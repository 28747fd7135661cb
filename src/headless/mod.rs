//! Headless scenario mode
//!
//! Runs the combat core without any graphical output: a JSON scenario file
//! describes the actor and a timed script of host actions, and the runner
//! replays it at a fixed step, producing a [`runner::ScenarioResult`] and an
//! optional combat log file.

pub mod config;
pub mod runner;

pub use config::{ActorConfig, HostAction, ScenarioConfig, ScriptedAction};
pub use runner::{run_scenario, ScenarioResult, ScenarioState};
