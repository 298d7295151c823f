//! AI and steering module
//!
//! Provides the steering force library, vehicle integration, threat queries,
//! and the prey/predator force sources built on top of them.

mod predator;
mod prey;
mod steering;
mod threat;
mod vehicle;

pub use predator::Predator;
pub use prey::Prey;
pub use steering::{
    BehaviorParams, SteeringMode, SteeringParams, WANDER_FORWARD_OFFSET, compute_force,
    desired_velocity_to_force, evade_force, flee_force, seek_force, wander_force, wander_target,
};
pub use threat::{DEFAULT_CELL_SIZE, SpatialGrid, ThreatQuery, ThreatSet};
pub use vehicle::{
    BlendedSteering, SteeringContext, SteeringForceSource, Vehicle, VehicleConfig,
};
