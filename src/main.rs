//! Headless prey/predator run
//!
//! Usage: `steering-engine [config.ron|config.json] [ticks]`

use std::process::ExitCode;

use steering_engine::prelude::*;

/// Fixed simulation step
const STEP: f32 = 1.0 / 60.0;
/// Ticks run when none are given
const DEFAULT_TICKS: u64 = 600;
/// Ticks between progress reports
const REPORT_INTERVAL: u64 = 60;

fn main() -> ExitCode {
    env_logger::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);

    let config = match args.next() {
        Some(path) => {
            log::info!("Loading config from {path}");
            SimulationConfig::load(&path)?
        }
        None => SimulationConfig::default(),
    };
    let ticks = match args.next() {
        Some(ticks) => ticks.parse::<u64>()?,
        None => DEFAULT_TICKS,
    };

    let mut simulation = Simulation::new(config)?;

    for tick in 1..=ticks {
        simulation.step(STEP);

        if tick % REPORT_INTERVAL == 0 {
            log::info!(
                "{} | fleeing: {} | chasing: {}",
                simulation.debug.tick_stats.format_stats(),
                simulation.fleeing_count(),
                simulation.chasing_count()
            );
        }
    }

    log::info!("Finished after {ticks} ticks");
    Ok(())
}
