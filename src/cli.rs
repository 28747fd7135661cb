//! Command-line interface for survsim
//!
//! The binary runs headless scenarios only; rendering, input and audio are
//! external collaborators of the core.

use clap::Parser;
use std::path::PathBuf;

/// Survivors-style combat simulation core
#[derive(Parser, Debug)]
#[command(name = "survsim")]
#[command(about = "Survivors-style combat simulation core")]
#[command(version)]
pub struct Args {
    /// JSON scenario file to run
    pub scenario: PathBuf,

    /// Output path for the combat log (overrides the scenario file)
    #[arg(long, value_name = "OUTPUT_PATH")]
    pub output: Option<PathBuf>,

    /// Maximum scenario duration in seconds (overrides the scenario file)
    #[arg(long)]
    pub max_duration: Option<f32>,
}

pub fn parse_args() -> Args {
    Args::parse()
}
