//! Autonomous-agent steering simulation
//!
//! This crate provides:
//! - Steering forces (seek, flee, evade, wander) over glam vectors
//! - Vehicle force accumulation and integration
//! - Threat-aware prey and hunting predators
//! - A headless simulation driver built on the hecs ECS

pub mod ai;
pub mod core;
pub mod ecs;
pub mod physics;

// Re-exports for convenience
pub use glam;
pub use hecs;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::ai::{
        BehaviorParams, Predator, Prey, SteeringContext, SteeringForceSource, SteeringMode,
        SteeringParams, ThreatQuery, Vehicle, VehicleConfig,
    };
    pub use crate::core::{DebugInfo, Simulation, SimulationConfig, SimulationError};
    pub use crate::ecs::{Name, Transform, World};
    pub use crate::physics::{Containment, CubePlane, ObstacleAvoidance, ObstacleField};
    pub use glam::Vec3;
}
