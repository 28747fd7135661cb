//! survsim - Survivors-Style Combat Simulation Core
//!
//! Loads a JSON scenario and runs it headlessly against the combat core.

use survsim::cli;
use survsim::headless::{run_scenario, ScenarioConfig};

fn main() {
    let args = cli::parse_args();

    let mut config = match ScenarioConfig::load_from_file(&args.scenario) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading scenario: {}", e);
            std::process::exit(1);
        }
    };

    if let Some(output) = args.output {
        config.output_path = Some(output.to_string_lossy().into_owned());
    }
    if let Some(max_duration) = args.max_duration {
        config.max_duration_secs = max_duration;
    }

    if let Err(e) = run_scenario(config) {
        eprintln!("Error running scenario: {}", e);
        std::process::exit(1);
    }
}
