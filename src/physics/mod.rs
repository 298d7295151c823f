//! Physical collaborators of the steering core
//!
//! Play-area bounds, spawn-point sampling, and obstacles

mod bounds;
mod obstacles;

pub use bounds::{Containment, CubePlane, MAX_SAMPLE_ATTEMPTS, SamplingError};
pub use obstacles::{Obstacle, ObstacleAvoidance, ObstacleField};
