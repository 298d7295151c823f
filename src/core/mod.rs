//! Core simulation module
//!
//! Contains the simulation driver, its configuration, and diagnostics

mod config;
mod debug;
mod simulation;

pub use config::{ConfigError, SimulationConfig};
pub use debug::{DebugInfo, DebugLine, TickStats};
pub use simulation::{Simulation, SimulationError};
